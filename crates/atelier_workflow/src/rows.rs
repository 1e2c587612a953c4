//! Per-row status and the concurrent mutation guard.
//!
//! Rows are ideas, generation batches and individual creatives. A row is
//! `Idle`, `Busy` with a named activity, or `Error` after its last action
//! failed. While a row is busy every mutating action on it is refused,
//! so two requests never race on the same idea or batch.

use atelier_core::{BatchKey, CreativeId, IdeaId};
use atelier_error::{WorkflowError, WorkflowErrorKind};
use derive_getters::Getters;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Identity of a row that can be busy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
pub enum RowKey {
    /// An idea card
    #[display("idea {}", _0)]
    Idea(IdeaId),
    /// A generation batch row in the approval queue
    #[display("batch {}", _0)]
    Batch(BatchKey),
    /// A single creative card
    #[display("creative {}", _0)]
    Creative(CreativeId),
}

/// What a busy row is doing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum RowActivity {
    /// Idea regenerate, or batch row regenerate
    Regenerating,
    /// Duplicate-and-generate
    Duplicating,
    /// Creative generation for an idea
    Generating,
    /// Delete in flight
    Deleting,
    /// Approval or deploy in flight
    Approving,
}

/// Displayed state of a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub enum RowStatus {
    /// No request in flight
    #[default]
    Idle,
    /// A request is in flight
    Busy(RowActivity),
    /// The last request failed
    Error(String),
}

impl RowStatus {
    /// A request is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

/// Row-level controls of a batch row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Getters)]
pub struct RowActions {
    /// Regenerate shown (hidden while the duplicate mark is set)
    regenerate_visible: bool,
    /// Regenerate enabled
    regenerate: bool,
    /// Duplicate toggle enabled
    duplicate: bool,
    /// Duplicate mark set
    duplicate_active: bool,
    /// Delete enabled
    delete: bool,
}

#[derive(Debug, Default)]
struct RowState {
    status: HashMap<RowKey, RowStatus>,
    duplicate_marks: HashSet<IdeaId>,
}

/// Shared map of row statuses.
#[derive(Debug, Clone, Default)]
pub struct RowRegistry {
    inner: Arc<Mutex<RowState>>,
}

impl RowRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status of a row.
    pub fn status(&self, key: &RowKey) -> RowStatus {
        self.inner
            .lock()
            .status
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether a request is in flight for the row.
    pub fn is_busy(&self, key: &RowKey) -> bool {
        self.status(key).is_busy()
    }

    /// Mark every key busy, or none if any is already busy.
    pub fn try_begin(
        &self,
        keys: Vec<RowKey>,
        activity: RowActivity,
    ) -> Result<RowGuard, WorkflowError> {
        let mut state = self.inner.lock();
        if let Some(busy) = keys
            .iter()
            .find(|key| state.status.get(*key).is_some_and(RowStatus::is_busy))
        {
            warn!(row = %busy, "Row busy, refusing action");
            return Err(WorkflowError::new(WorkflowErrorKind::RowBusy(
                busy.to_string(),
            )));
        }
        for key in &keys {
            state.status.insert(key.clone(), RowStatus::Busy(activity));
        }
        debug!(rows = keys.len(), activity = %activity, "Rows busy");
        Ok(RowGuard {
            registry: self.clone(),
            keys,
            settled: false,
        })
    }

    /// Whether the duplicate mark is set for an idea.
    pub fn duplicate_active(&self, idea_id: &IdeaId) -> bool {
        self.inner.lock().duplicate_marks.contains(idea_id)
    }

    /// Set or clear the duplicate mark; returns the previous value.
    pub fn set_duplicate_mark(&self, idea_id: &IdeaId, active: bool) -> bool {
        let mut state = self.inner.lock();
        if active {
            !state.duplicate_marks.insert(idea_id.clone())
        } else {
            state.duplicate_marks.remove(idea_id)
        }
    }

    /// Controls of a batch row.
    ///
    /// Everything is disabled while the batch or its idea is busy.
    pub fn row_actions(&self, batch: &BatchKey) -> RowActions {
        let state = self.inner.lock();
        let busy = [RowKey::Batch(batch.clone()), RowKey::Idea(batch.idea_id.clone())]
            .iter()
            .any(|key| state.status.get(key).is_some_and(RowStatus::is_busy));
        let duplicate_active = state.duplicate_marks.contains(&batch.idea_id);
        RowActions {
            regenerate_visible: !duplicate_active,
            regenerate: !busy && !duplicate_active,
            duplicate: !busy,
            duplicate_active,
            delete: !busy,
        }
    }

    fn settle(&self, keys: &[RowKey], status: RowStatus) {
        let mut state = self.inner.lock();
        for key in keys {
            match &status {
                RowStatus::Idle => {
                    state.status.remove(key);
                }
                other => {
                    state.status.insert(key.clone(), other.clone());
                }
            }
        }
    }
}

/// Holds rows busy until settled or dropped.
///
/// Dropping an unsettled guard returns its rows to idle.
#[derive(Debug)]
pub struct RowGuard {
    registry: RowRegistry,
    keys: Vec<RowKey>,
    settled: bool,
}

impl RowGuard {
    /// Rows held by this guard.
    pub fn keys(&self) -> &[RowKey] {
        &self.keys
    }

    /// Release the rows as idle, or in error with the failure message.
    pub fn finish<T, E: std::fmt::Display>(mut self, outcome: &Result<T, E>) {
        let status = match outcome {
            Ok(_) => RowStatus::Idle,
            Err(e) => RowStatus::Error(e.to_string()),
        };
        self.registry.settle(&self.keys, status);
        self.settled = true;
    }
}

impl Drop for RowGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.registry.settle(&self.keys, RowStatus::Idle);
        }
    }
}
