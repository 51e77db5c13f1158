//! Process-level state shared across commands.

mod state;

pub use state::{register_shutdown, setup_shutdown_handler};
