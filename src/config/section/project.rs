//! `[[project]]` entries.
//!
//! One entry per watched project. Each project gets its own dispatcher, so
//! sync invocations for different projects may overlap while invocations
//! for the same project never do.
//!
//! # Example
//!
//! ```toml
//! [[project]]
//! id = "b1a78500-eaa5-11e9-b0c1-97c28a7e77c7"
//! path = "~/workspace/app"            # Passed to the sync command as `-p`
//! watch = ["src", "/shared/protos"]   # Default: the project path
//! ignored_filenames = ["*.swp", ".git"]
//! ignored_paths = ["/target"]
//! creation_time = 1571944337000       # Seeds the watermark (ms), 0 = unknown
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::project::{ProjectToWatch, RefPath};
use crate::utils::path::{from_local_path, resolve_path};

/// A single watched project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSection {
    /// Project identifier passed as `-i`.
    pub id: String,

    /// Project root passed as `-p`.
    pub path: String,

    /// Paths to watch, relative to the project root or absolute.
    pub watch: Vec<String>,

    /// File names (or `*` patterns) whose changes are ignored.
    pub ignored_filenames: Vec<String>,

    /// Project-rooted paths whose changes are ignored.
    pub ignored_paths: Vec<String>,

    /// Project creation time in ms since the epoch; `0` if unknown.
    pub creation_time: i64,
}

impl ProjectSection {
    /// Resolve `path` against the config root and `watch` against `path`.
    pub(crate) fn normalize_paths(&mut self, config_root: &Path) {
        if self.path.trim().is_empty() {
            return;
        }
        let root = resolve_path(&self.path, config_root);
        self.path = root.display().to_string();

        if self.watch.is_empty() {
            self.watch.push(self.path.clone());
        } else {
            for entry in &mut self.watch {
                *entry = resolve_path(entry, &root).display().to_string();
            }
        }
    }

    pub fn root(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }

    pub fn watch_paths(&self) -> Vec<PathBuf> {
        self.watch.iter().map(PathBuf::from).collect()
    }

    /// Snapshot handed to the dispatcher with each change event.
    pub fn to_watch(&self) -> ProjectToWatch {
        ProjectToWatch {
            project_id: self.id.clone(),
            path_to_monitor: from_local_path(Path::new(&self.path)),
            ref_paths: self
                .watch
                .iter()
                .map(|w| RefPath {
                    from: from_local_path(Path::new(w)),
                })
                .collect(),
            ignored_filenames: self.ignored_filenames.clone(),
            ignored_paths: self.ignored_paths.clone(),
        }
    }
}
