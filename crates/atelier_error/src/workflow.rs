//! Workflow controller errors.

/// Specific error conditions for row-level workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum WorkflowErrorKind {
    /// Another mutation is in flight for the same row.
    #[display("Row {} is busy", _0)]
    RowBusy(String),

    /// Phase one of duplicate-and-generate failed; phase two was not attempted.
    #[display("Failed to duplicate idea {}: {}", idea_id, reason)]
    DuplicateFailed {
        /// Source idea
        idea_id: String,
        /// Backend message
        reason: String,
    },

    /// Batch generation failed after the target idea was resolved.
    #[display("Failed to generate creatives for idea {}: {}", idea_id, reason)]
    GenerationFailed {
        /// Target idea
        idea_id: String,
        /// Backend message
        reason: String,
    },

    /// Some deletions of a grouped delete were rejected.
    #[display("Failed to delete {} of {} creatives in batch {}", failed, total, batch)]
    PartialDelete {
        /// Batch key
        batch: String,
        /// Number of failed deletions
        failed: usize,
        /// Number of attempted deletions
        total: usize,
    },

    /// Brief execution stopped before all targets were attempted.
    #[display("Brief {} failed: {}", brief_id, reason)]
    BriefFailed {
        /// Executed brief
        brief_id: String,
        /// Backend message
        reason: String,
    },

    /// The row is not in a state that allows the action.
    #[display("Action not available for {}: {}", row, reason)]
    Unavailable {
        /// Row identifier
        row: String,
        /// Why the action is disabled
        reason: String,
    },
}

/// Workflow error with location tracking.
///
/// # Examples
///
/// ```
/// use atelier_error::{WorkflowError, WorkflowErrorKind};
///
/// let err = WorkflowError::new(WorkflowErrorKind::RowBusy("7_gen1".into()));
/// assert!(format!("{}", err).contains("busy"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Workflow Error: {} at line {} in {}", kind, line, file)]
pub struct WorkflowError {
    /// The specific error condition
    pub kind: WorkflowErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl WorkflowError {
    /// Create a new WorkflowError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: WorkflowErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
