//! Creatives and their approval records.

use crate::{AspectRatio, BatchKey, CreativeId, Idea, IdeaId, Region, timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Three-flag sign-off record gating deployment.
///
/// A creative received without an approval record is a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    /// Backend identifier of the approval row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Creative this record belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative_id: Option<CreativeId>,
    /// Creative sign-off
    #[serde(default)]
    pub creative_approved: bool,
    /// When creative sign-off was granted
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub creative_approved_at: Option<DateTime<Utc>>,
    /// Regional sign-off
    #[serde(default)]
    pub regional_approved: bool,
    /// When regional sign-off was granted
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub regional_approved_at: Option<DateTime<Utc>>,
    /// Published; terminal
    #[serde(default)]
    pub deployed: bool,
    /// When the creative was deployed
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub deployed_at: Option<DateTime<Utc>>,
}

impl Approval {
    /// A record with every flag cleared.
    pub fn draft() -> Self {
        Self::default()
    }

    /// Convenience constructor for the three flags.
    pub fn with_flags(creative_approved: bool, regional_approved: bool, deployed: bool) -> Self {
        Self {
            creative_approved,
            regional_approved,
            deployed,
            ..Self::default()
        }
    }
}

/// One rendered ad asset at a specific aspect ratio.
///
/// # Examples
///
/// ```
/// use atelier_core::{AspectRatio, Creative};
///
/// let creative: Creative = serde_json::from_str(
///     r#"{"id": 101, "idea_id": 7, "aspect_ratio": "16:9", "generation_count": 1,
///         "file_path": "uploads/creatives/101.png"}"#,
/// ).unwrap();
/// assert_eq!(creative.aspect_ratio, AspectRatio::Landscape);
/// assert_eq!(creative.batch_key().unwrap().to_string(), "7_gen1");
/// assert!(!creative.approval.creative_approved);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creative {
    /// Backend identifier
    pub id: CreativeId,
    /// Owning idea; records without one cannot be grouped
    #[serde(default)]
    pub idea_id: Option<IdeaId>,
    /// Output format
    pub aspect_ratio: AspectRatio,
    /// Generation the creative belongs to; absent means 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_count: Option<u32>,
    /// Region inherited from the idea
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    /// Demographic inherited from the idea
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demographic: Option<String>,
    /// Brand label from the brief
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Product label from the brief
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Path of the rendered file relative to the backend root
    #[serde(default)]
    pub file_path: String,
    /// MIME type of the rendered file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Size of the rendered file in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    /// Image generator job reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firefly_job_id: Option<String>,
    /// Creation time
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Latest server-confirmed approval record
    #[serde(default)]
    pub approval: Approval,
}

impl Creative {
    /// Generation count, defaulting to 1 for records that predate the field.
    pub fn generation(&self) -> u32 {
        self.generation_count.unwrap_or(1)
    }

    /// Key of the batch this creative belongs to, if it names its idea.
    pub fn batch_key(&self) -> Option<BatchKey> {
        self.idea_id
            .as_ref()
            .map(|idea_id| BatchKey::new(idea_id.clone(), self.generation()))
    }

    /// Whether deployment needs regional sign-off.
    ///
    /// A creative that does not know its region is treated as non-exempt.
    pub fn requires_regional_approval(&self) -> bool {
        self.region
            .as_ref()
            .is_none_or(Region::requires_regional_approval)
    }

    /// Fill idea-derived labels the generation endpoint leaves out.
    pub fn inherit_from(mut self, idea: &Idea) -> Self {
        if self.idea_id.is_none() {
            self.idea_id = Some(idea.id.clone());
        }
        if self.generation_count.is_none() {
            self.generation_count = Some(idea.generation_count);
        }
        if self.region.is_none() {
            self.region = Some(idea.region.clone());
        }
        if self.demographic.is_none() {
            self.demographic = Some(idea.demographic.clone());
        }
        self
    }

    /// Copy with a new server-confirmed approval record.
    pub fn with_approval(&self, approval: Approval) -> Self {
        Self {
            approval,
            ..self.clone()
        }
    }

    /// Replacement record after a regenerate.
    ///
    /// Labels the regenerate endpoint omits are carried over from `self`;
    /// the approval always starts over as a draft.
    pub fn replaced_by(&self, fresh: Creative) -> Self {
        Self {
            idea_id: fresh.idea_id.or_else(|| self.idea_id.clone()),
            region: fresh.region.or_else(|| self.region.clone()),
            demographic: fresh.demographic.or_else(|| self.demographic.clone()),
            brand: fresh.brand.or_else(|| self.brand.clone()),
            product_name: fresh.product_name.or_else(|| self.product_name.clone()),
            approval: Approval::draft(),
            ..fresh
        }
    }

    /// Absolute URL of the rendered asset.
    pub fn asset_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            self.file_path.trim_start_matches('/')
        )
    }
}
