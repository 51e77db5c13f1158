//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization and unix-style conversion

pub mod fs;

pub use fs::{from_local_path, normalize_path, resolve_path, to_local_path, to_unix_style};
