//! The seam between the workflow controller and the creative backend.

use crate::{BatchUpdate, IdeaStreamEvent};
use async_trait::async_trait;
use atelier_core::{Approval, BriefId, Creative, CreativeId, Idea, IdeaId};
use atelier_error::ClientError;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::pin::Pin;

/// Result type for backend calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Lazy sequence of batch generation updates.
pub type BatchStream = Pin<Box<dyn Stream<Item = ClientResult<BatchUpdate>> + Send>>;

/// Lazy sequence of brief execution events.
pub type IdeaStream = Pin<Box<dyn Stream<Item = ClientResult<IdeaStreamEvent>> + Send>>;

/// Approval filter for listing creatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreativeStatus {
    /// Not yet deployed and missing at least one sign-off
    Pending,
    /// Signed off but not deployed
    Approved,
    /// Published
    Deployed,
}

impl CreativeStatus {
    /// Query-string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Deployed => "deployed",
        }
    }
}

/// Paging and filtering for [`CreativeBackend::list_creatives`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeQuery {
    /// Optional approval filter
    pub status: Option<CreativeStatus>,
    /// Records to skip
    pub skip: usize,
    /// Page size
    pub limit: usize,
}

impl Default for CreativeQuery {
    fn default() -> Self {
        Self {
            status: None,
            skip: 0,
            limit: 100,
        }
    }
}

impl CreativeQuery {
    /// Restrict to one approval status.
    pub fn with_status(mut self, status: CreativeStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Operations the creative backend offers.
///
/// Implemented over HTTP by [`crate::AtelierClient`]; tests substitute
/// scripted implementations.
#[async_trait]
pub trait CreativeBackend: Send + Sync {
    /// Replace an idea's content; generation count is unchanged.
    async fn regenerate_idea(&self, idea_id: &IdeaId) -> ClientResult<Idea>;

    /// Copy an idea into a new row with its own generation lineage.
    async fn duplicate_idea(&self, idea_id: &IdeaId) -> ClientResult<Idea>;

    /// Delete an idea.
    async fn delete_idea(&self, idea_id: &IdeaId) -> ClientResult<()>;

    /// Start one batch generation for an idea.
    async fn generate_creatives(&self, idea_id: &IdeaId) -> ClientResult<BatchStream>;

    /// Re-render one creative in place; the returned record has a draft approval.
    async fn regenerate_creative(&self, creative_id: &CreativeId) -> ClientResult<Creative>;

    /// Toggle creative sign-off.
    async fn approve_creative(&self, creative_id: &CreativeId) -> ClientResult<Approval>;

    /// Toggle regional sign-off.
    async fn approve_regional(&self, creative_id: &CreativeId) -> ClientResult<Approval>;

    /// Publish a creative.
    async fn deploy(&self, creative_id: &CreativeId) -> ClientResult<Approval>;

    /// Delete one creative.
    async fn delete_creative(&self, creative_id: &CreativeId) -> ClientResult<()>;

    /// Delete every creative of an idea.
    async fn delete_creatives_for_idea(&self, idea_id: &IdeaId) -> ClientResult<()>;

    /// List creatives with approval state and idea-derived labels.
    async fn list_creatives(&self, query: &CreativeQuery) -> ClientResult<Vec<Creative>>;

    /// Run a brief, streaming one idea per target.
    async fn execute_brief(&self, brief_id: &BriefId) -> ClientResult<IdeaStream>;

    /// Stored settings as a flat key-value map.
    async fn get_settings(&self) -> ClientResult<BTreeMap<String, String>>;

    /// Merge settings and return the stored map.
    async fn save_settings(
        &self,
        settings: &BTreeMap<String, String>,
    ) -> ClientResult<BTreeMap<String, String>>;
}
