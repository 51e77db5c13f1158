//! Configuration section definitions.
//!
//! | Section       | Purpose                                   |
//! |---------------|-------------------------------------------|
//! | `[sync]`      | Sync command, mock mode, debounce window  |
//! | `[[project]]` | Watched projects                          |

mod project;
mod sync;

pub use project::ProjectSection;
pub use sync::SyncSection;
