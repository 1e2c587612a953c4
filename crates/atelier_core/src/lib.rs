//! Core data types for Atelier.
//!
//! This crate holds the records exchanged with the creative backend (ideas,
//! creatives, approvals), the pure batch grouping function that turns a flat
//! creative collection into generation batches, and the approval gate that
//! decides which actions a creative card may offer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod approval;
mod aspect_ratio;
mod batch;
mod creative;
mod id;
mod idea;
mod platform;
mod region;
mod settings;
mod timestamp;

pub use approval::{
    ActionSet, ApprovalAction, ApprovalStage, can_deploy, check_action, invariant_holds,
};
pub use aspect_ratio::AspectRatio;
pub use batch::{BatchKey, GenerationBatch, Grouping, GroupingStatus, group_creatives};
pub use creative::{Approval, Creative};
pub use id::{BriefId, CreativeId, IdeaId};
pub use idea::Idea;
pub use platform::Platform;
pub use region::Region;
pub use settings::{
    ImageProvider, ImageSettings, LlmProvider, LlmSettings, PlatformCredentials, ProviderSettings,
};
