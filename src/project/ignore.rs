//! Ignore rules for project watch events.
//!
//! - `ignored_filenames` match any path component; `*` is allowed as a
//!   leading and/or trailing wildcard (`*.swp`, `.git*`, `*cache*`).
//! - `ignored_paths` are rooted at the project (`/target`) and match the
//!   path itself and everything under it; a trailing `*` makes it a plain
//!   prefix match.

use std::path::Path;

use super::ProjectToWatch;
use crate::utils::path::to_unix_style;

/// Should a change at `path` be ignored for `project` rooted at `root`?
///
/// Paths outside `root` are never ignored by path rules, only by name.
pub fn is_ignored(path: &Path, root: &Path, project: &ProjectToWatch) -> bool {
    let relative = to_unix_style(path, root);

    let names: Vec<String> = match &relative {
        Some(rel) => rel.split('/').map(str::to_string).collect(),
        None => path
            .file_name()
            .map(|n| vec![n.to_string_lossy().into_owned()])
            .unwrap_or_default(),
    };

    let name_hit = names.iter().any(|name| {
        project
            .ignored_filenames
            .iter()
            .any(|pattern| matches_name(pattern, name))
    });
    if name_hit {
        return true;
    }

    let Some(rel) = relative else {
        return false;
    };
    let rooted = format!("/{rel}");
    project
        .ignored_paths
        .iter()
        .any(|pattern| matches_rooted(pattern, &rooted))
}

fn matches_name(pattern: &str, name: &str) -> bool {
    match (pattern.strip_prefix('*'), pattern.strip_suffix('*')) {
        (Some(_), Some(_)) if pattern.len() >= 2 => name.contains(&pattern[1..pattern.len() - 1]),
        // Also covers a lone "*"
        (Some(suffix), _) => name.ends_with(suffix),
        (None, Some(prefix)) => name.starts_with(prefix),
        (None, None) => name == pattern,
    }
}

fn matches_rooted(pattern: &str, rooted: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix('*') {
        return rooted.starts_with(prefix);
    }
    let pattern = pattern.trim_end_matches('/');
    rooted == pattern
        || rooted
            .strip_prefix(pattern)
            .is_some_and(|rest| rest.starts_with('/'))
}
