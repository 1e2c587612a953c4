//! Campaign ideas.

use crate::{BriefId, IdeaId, Region, timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn first_generation() -> u32 {
    1
}

/// A region/demographic-targeted campaign concept.
///
/// Ideas arriving from the backend always carry content. Locally created
/// placeholders (`is_placeholder`) stand in for ideas that are still being
/// generated and are never sent back to the backend.
///
/// # Examples
///
/// ```
/// use atelier_core::Idea;
///
/// let idea: Idea = serde_json::from_str(
///     r#"{"id": 7, "region": "DE", "demographic": "Gen Z", "content": "Night run", "generation_count": 1}"#,
/// ).unwrap();
/// assert_eq!(idea.id.as_str(), "7");
/// assert!(idea.is_actionable());
///
/// let pending = Idea::placeholder("JP", "Millennials");
/// assert!(pending.content.is_none());
/// assert!(!pending.is_actionable());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    /// Backend identifier (or a local `pending-*` id for placeholders)
    pub id: IdeaId,
    /// Brief this idea was generated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brief_id: Option<BriefId>,
    /// Target region
    pub region: Region,
    /// Target demographic
    pub demographic: String,
    /// Idea text; `None` while pending
    #[serde(default)]
    pub content: Option<String>,
    /// Language the creative text should use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    /// Version counter, starts at 1
    #[serde(default = "first_generation")]
    pub generation_count: u32,
    /// Creation time
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Optimistic row not yet confirmed by the backend
    #[serde(default, skip_serializing)]
    pub is_placeholder: bool,
    /// Generation of this row failed
    #[serde(default, skip_serializing)]
    pub has_error: bool,
}

impl Idea {
    /// Pending row shown while the backend generates the idea.
    pub fn placeholder(region: impl Into<Region>, demographic: impl Into<String>) -> Self {
        Self {
            id: IdeaId::new(format!("pending-{}", uuid::Uuid::new_v4())),
            brief_id: None,
            region: region.into(),
            demographic: demographic.into(),
            content: None,
            language_code: None,
            generation_count: 1,
            created_at: None,
            updated_at: None,
            is_placeholder: true,
            has_error: false,
        }
    }

    /// Mark this row as failed, keeping the failure text as its content.
    pub fn into_failed(mut self, message: impl Into<String>) -> Self {
        self.is_placeholder = false;
        self.has_error = true;
        self.content = Some(message.into());
        self
    }

    /// True while the row is a pending placeholder.
    pub fn is_pending(&self) -> bool {
        self.is_placeholder && self.content.is_none()
    }

    /// Whether regenerate / generate / delete may be offered for this row.
    pub fn is_actionable(&self) -> bool {
        !self.is_placeholder && !self.has_error
    }

    /// Whether this idea fills the given region/demographic slot.
    pub fn targets(&self, region: &Region, demographic: &str) -> bool {
        &self.region == region && self.demographic == demographic
    }
}
