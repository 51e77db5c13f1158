//! Dispatcher decision logic.
//!
//! Pure state machine: no channels, no tasks. The actor loop feeds every
//! mailbox message to [`DispatcherState::handle`] and starts a worker for
//! each [`Launch`] it gets back.

use std::sync::Arc;

use crate::actor::messages::{ChangeEvent, DispatchMsg, InvocationResult};
use crate::project::ProjectToWatch;
use crate::utils::date::timestamp_to_string;
use crate::{debug, log};

/// Order to start exactly one invocation.
#[derive(Debug, Clone)]
pub struct Launch {
    pub watermark: i64,
    pub snapshot: Option<Arc<ProjectToWatch>>,
}

/// Coordination state of one project.
///
/// Invariants:
/// - at most one invocation in flight
/// - `last_watermark` never decreases
/// - a change seen while busy is folded into the next launch, never dropped
#[derive(Debug, Default)]
pub struct DispatcherState {
    project_id: Arc<str>,
    /// Start time of the last successful invocation, `0` = unset.
    last_watermark: i64,
    in_flight: bool,
    queued: bool,
    latest_snapshot: Option<Arc<ProjectToWatch>>,
}

impl DispatcherState {
    pub fn new(project_id: Arc<str>) -> Self {
        Self {
            project_id,
            ..Default::default()
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub const fn last_watermark(&self) -> i64 {
        self.last_watermark
    }

    #[cfg(test)]
    pub const fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    #[cfg(test)]
    pub const fn is_queued(&self) -> bool {
        self.queued
    }

    /// Apply one mailbox message and decide whether to launch.
    pub fn handle(&mut self, msg: DispatchMsg) -> Option<Launch> {
        match msg {
            DispatchMsg::Change(event) => self.on_change(event),
            DispatchMsg::Completed(result) => self.on_completed(&result),
        }

        self.next_launch()
    }

    fn on_change(&mut self, event: ChangeEvent) {
        if event.timestamp != 0 && self.last_watermark == 0 {
            log!(
                "sync";
                "[{}] timestamp updated from {} to {} from project creation time",
                self.project_id,
                timestamp_to_string(self.last_watermark),
                timestamp_to_string(event.timestamp)
            );
            self.last_watermark = event.timestamp;
        }

        if let Some(snapshot) = event.snapshot {
            self.latest_snapshot = Some(snapshot);
        }

        if self.in_flight && !self.queued {
            debug!("sync"; "[{}] change queued behind running sync", self.project_id);
        }
        self.queued = true;
    }

    fn on_completed(&mut self, result: &InvocationResult) {
        self.in_flight = false;

        if result.is_success() {
            // Anchor the next sync at the moment this one started
            self.last_watermark = self.last_watermark.max(result.spawn_time);
            log!(
                "sync";
                "[{}] updating timestamp to latest: {}",
                self.project_id,
                self.last_watermark
            );
        } else {
            log!(
                "error";
                "[{}] non-zero exit code {} from sync command: {}",
                self.project_id,
                result.exit_code,
                result.output.trim_end()
            );
        }
    }

    fn next_launch(&mut self) -> Option<Launch> {
        if self.in_flight || !self.queued {
            return None;
        }

        self.queued = false;
        self.in_flight = true;

        Some(Launch {
            watermark: self.last_watermark,
            snapshot: self.latest_snapshot.clone(),
        })
    }
}
