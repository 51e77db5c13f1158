//! Watch configuration of a single project.
//!
//! A [`ProjectToWatch`] is the snapshot handed along with change events. In
//! normal mode the sync command reads project state itself and the snapshot
//! is only kept for logging; in mock mode it is serialized into the command
//! line (see [`SimplifiedProject::encode`]).

mod ignore;

pub use ignore::is_ignored;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::log;
use crate::utils::path::to_local_path;

/// A watched path, in absolute unix-style normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefPath {
    pub from: String,
}

/// Watch configuration snapshot for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectToWatch {
    pub project_id: String,
    pub path_to_monitor: String,
    #[serde(default)]
    pub ref_paths: Vec<RefPath>,
    #[serde(default)]
    pub ignored_filenames: Vec<String>,
    #[serde(default)]
    pub ignored_paths: Vec<String>,
}

/// Reduced project shape accepted by the mock sync command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedProject {
    pub files_to_watch: Vec<String>,
    pub ignored_filenames: Vec<String>,
    pub ignored_paths: Vec<String>,
}

impl ProjectToWatch {
    /// Build the mock-command view of this project.
    ///
    /// Watched paths are converted to local absolute paths; a path that
    /// cannot be converted is logged and left out.
    pub fn simplified(&self) -> SimplifiedProject {
        let files_to_watch = self
            .ref_paths
            .iter()
            .filter_map(|r| match to_local_path(&r.from) {
                Ok(local) => Some(local),
                Err(e) => {
                    log!("error"; "unable to convert file path `{}`: {}", r.from, e);
                    None
                }
            })
            .collect();

        SimplifiedProject {
            files_to_watch,
            ignored_filenames: self.ignored_filenames.clone(),
            ignored_paths: self.ignored_paths.clone(),
        }
    }
}

impl SimplifiedProject {
    /// JSON, then standard base64. Falls back to encoding `{}`.
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_else(|e| {
            log!("error"; "unable to marshal project JSON: {}", e);
            b"{}".to_vec()
        });
        STANDARD.encode(json)
    }
}
