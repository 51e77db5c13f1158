use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::utils::path::normalize_path;

/// Sleep used while nothing is pending.
const IDLE: Duration = Duration::from_secs(86400);

/// Collects raw notify events until the project has been quiet for `window`.
pub(super) struct Debouncer {
    window: Duration,
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new(window: Duration) -> Self {
        Self {
            window,
            changes: FxHashMap::default(),
            last_event: None,
        }
    }

    pub(super) fn add_event(&mut self, event: &notify::Event) {
        let Some(kind) = ChangeKind::from_event(&event.kind) else {
            return;
        };

        for path in event.paths.iter().filter(|p| !is_temp_file(p)) {
            let path = normalize_path(path);

            let merged = match self.changes.get(&path) {
                Some(&existing) => existing.then(kind),
                None => Some(kind),
            };

            match merged {
                Some(kind) => {
                    crate::debug!("watch"; "{}: {}", kind.label(), path.display());
                    self.changes.insert(path, kind);
                }
                None => {
                    crate::debug!("watch"; "created and removed: {}", path.display());
                    self.changes.remove(&path);
                }
            }
            self.last_event = Some(Instant::now());
        }
    }

    /// Drain the pending burst once the quiet window has passed.
    ///
    /// A window whose events cancelled out closes without a burst.
    pub(super) fn take_if_ready(&mut self) -> Option<Vec<(PathBuf, ChangeKind)>> {
        let last = self.last_event?;
        if last.elapsed() < self.window {
            return None;
        }

        self.last_event = None;
        let changes: Vec<_> = self.changes.drain().collect();
        (!changes.is_empty()).then_some(changes)
    }

    /// Time left until the window closes.
    pub(super) fn sleep_duration(&self) -> Duration {
        match self.last_event {
            Some(last) => self
                .window
                .saturating_sub(last.elapsed())
                .max(Duration::from_millis(1)),
            None => IDLE,
        }
    }
}

/// Editor swap and backup files.
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "swp" | "swo" | "swx" | "tmp" | "bak" | "bck")
        || name.ends_with('~')
        || (name.starts_with(".#") && name.len() > 2)
}
