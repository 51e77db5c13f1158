//! Command-line interface module.

mod args;
pub mod check;
pub mod sync;
pub mod watch;

pub use args::{Cli, CommandArgs, Commands};
