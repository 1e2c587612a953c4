//! Typed events emitted by the workflow controller.

use atelier_client::{BatchSummary, Progress};
use atelier_core::{Approval, Creative, CreativeId, Idea, IdeaId, Platform, Region};
use serde::Serialize;

/// Blocking notification shown when an action fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserNotice {
    /// Action that failed, e.g. "regenerate idea"
    pub action: String,
    /// Message for the user
    pub message: String,
}

impl UserNotice {
    /// New notice.
    pub fn new(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for UserNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to {}: {}", self.action, self.message)
    }
}

/// A confirmed change to the idea and creative collections.
///
/// [`crate::Dashboard::apply`] is the single place these are folded into
/// state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DashboardEvent {
    /// Replace the creative collection with a fresh listing
    CreativesLoaded(Vec<Creative>),
    /// A creative arrived from a batch stream
    CreativeAdded(Box<Creative>),
    /// A creative was re-rendered; the fresh record takes the old one's slot
    CreativeReplaced {
        /// Id the card had before regeneration
        old: CreativeId,
        /// Fresh record, possibly under a new id
        creative: Box<Creative>,
    },
    /// A creative was deleted
    CreativeDeleted(CreativeId),
    /// Server-confirmed approval for a creative
    ApprovalChanged {
        /// Creative the record belongs to
        creative_id: CreativeId,
        /// Latest record
        approval: Approval,
    },
    /// A creative was published
    Deployed {
        /// Published creative
        creative_id: CreativeId,
        /// Target chosen for display
        platform: Platform,
    },
    /// A new idea row, confirmed or placeholder
    IdeaAdded(Box<Idea>),
    /// An idea generated by a brief, replacing its placeholder
    IdeaArrived(Box<Idea>),
    /// An idea's content changed
    IdeaUpdated(Box<Idea>),
    /// Generation failed for one brief target
    IdeaFailed {
        /// Target region
        region: Region,
        /// Target demographic
        demographic: String,
        /// Backend message
        error: String,
    },
    /// An idea and its creatives were deleted
    IdeaDeleted(IdeaId),
    /// Batch rendering progress for an idea
    BatchProgress {
        /// Idea being rendered
        idea_id: IdeaId,
        /// Latest progress report
        progress: Progress,
    },
    /// A batch stream finished
    BatchCompleted {
        /// Idea that was rendered
        idea_id: IdeaId,
        /// Outcome
        summary: BatchSummary,
    },
    /// An action failed
    Notice(UserNotice),
}
