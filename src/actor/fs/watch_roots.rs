use std::path::PathBuf;

use notify::{RecursiveMode, Watcher};

/// Directories a project wants watched, and whether each is attached.
///
/// Roots that do not exist yet (or were deleted and recreated) are picked
/// up by a later [`WatchRoots::attach`].
pub(super) struct WatchRoots {
    roots: Vec<(PathBuf, bool)>,
}

impl WatchRoots {
    pub(super) fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            roots: paths.into_iter().map(|p| (p, false)).collect(),
        }
    }

    /// Attach every existing root not yet watched. Returns how many were added.
    pub(super) fn attach<W: Watcher>(&mut self, watcher: &mut W) -> notify::Result<usize> {
        let mut added = 0;
        for (path, attached) in &mut self.roots {
            if *attached && !path.exists() {
                // Gone; the old watch died with the directory
                *attached = false;
                let _ = watcher.unwatch(path);
            }
            if *attached || !path.exists() {
                continue;
            }

            watcher.watch(path, RecursiveMode::Recursive)?;
            *attached = true;
            added += 1;
            crate::debug!("watch"; "watching {}", path.display());
        }
        Ok(added)
    }

    pub(super) fn attached(&self) -> usize {
        self.roots.iter().filter(|(_, a)| *a).count()
    }

    pub(super) fn missing(&self) -> impl Iterator<Item = &PathBuf> {
        self.roots.iter().filter(|(_, a)| !*a).map(|(p, _)| p)
    }
}
