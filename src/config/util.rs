//! Configuration utility functions.

use std::path::{Path, PathBuf};

use crate::utils::path::resolve_path;

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/work/app/src/     ← cwd
/// /home/user/work/syncwatch.toml  ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    find_config_file_from(&cwd, config_name)
}

fn find_config_file_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Resolve the sync command to a concrete executable path.
///
/// - blank stays blank (rejected later when a dispatcher is built)
/// - anything that looks like a path is `~`-expanded and made absolute
/// - a bare program name is looked up on `PATH`, falling back to the name
pub fn resolve_command(raw: &str, root: &Path) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    let looks_like_path = raw.starts_with('~') || raw.contains('/') || raw.contains('\\');
    if looks_like_path {
        return resolve_path(raw, root).display().to_string();
    }

    match which::which(raw) {
        Ok(found) => found.display().to_string(),
        Err(_) => raw.to_string(),
    }
}

// ============================================================================
// tests
// ============================================================================
