//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `resolve_path` - resolve config paths (`~` expansion, relative to a base)
//! - `to_local_path` - unix-style normalized paths to native form
//! - `from_local_path` - native absolute paths to unix-style form
//! - `to_unix_style` - native paths to forward-slash form for ignore rules

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from path conversion.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("path is not absolute: `{0}`")]
    NotAbsolute(String),

    #[error("path has no drive segment: `{0}`")]
    NoDrive(String),
}

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve a path from configuration.
///
/// Expands a leading `~`, then joins relative results onto `base`.
/// Always returns an absolute path when `base` is absolute.
pub fn resolve_path(raw: &str, base: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    let path = Path::new(expanded.as_ref());
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Convert an absolute unix-style normalized path (`/c/Users/me`) into a
/// path for the local file system.
///
/// On Unix the input is returned unchanged. On Windows the leading drive
/// segment is turned into a drive letter: `/c/Users/me` -> `c:\Users\me`.
pub fn to_local_path(unix_style: &str) -> Result<String, PathError> {
    if !unix_style.starts_with('/') {
        return Err(PathError::NotAbsolute(unix_style.to_string()));
    }

    if cfg!(windows) {
        windows_from_unix_style(unix_style)
    } else {
        Ok(unix_style.to_string())
    }
}

fn windows_from_unix_style(unix_style: &str) -> Result<String, PathError> {
    let rest = &unix_style[1..];
    let (drive, tail) = rest.split_once('/').unwrap_or((rest, ""));

    let mut chars = drive.chars();
    let letter = match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => c,
        _ => return Err(PathError::NoDrive(unix_style.to_string())),
    };

    Ok(format!("{letter}:\\{}", tail.replace('/', "\\")))
}

/// Inverse of [`to_local_path`]: absolute local path to unix-style form.
///
/// `C:\Users\me` becomes `/c/Users/me` on Windows; Unix paths pass through.
pub fn from_local_path(local: &Path) -> String {
    let raw = local.to_string_lossy();
    if !cfg!(windows) {
        return raw.into_owned();
    }
    windows_to_unix_style(&raw)
}

fn windows_to_unix_style(raw: &str) -> String {
    let slashed = raw.replace('\\', "/");
    match slashed.split_once(':') {
        Some((drive, rest)) if drive.len() == 1 => {
            format!("/{}{}", drive.to_ascii_lowercase(), rest)
        }
        _ => slashed,
    }
}

/// Forward-slash form of `path` relative to `root`, without a leading slash.
///
/// Returns `None` if `path` is not inside `root`.
pub fn to_unix_style(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}
