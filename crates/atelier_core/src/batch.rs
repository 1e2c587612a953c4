//! Generation batch grouping.
//!
//! A generation batch is every creative sharing one `(idea_id,
//! generation_count)` pair. Batches are derived, never persisted, and are
//! recomputed from the full creative collection after every mutation, so
//! [`group_creatives`] must stay a pure function.

use crate::{AspectRatio, Creative, CreativeId, IdeaId};
use atelier_error::{GroupingError, GroupingErrorKind};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// Identity of a generation batch.
///
/// Displays as `{idea_id}_gen{generation}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display)]
#[display("{}_gen{}", idea_id, generation)]
pub struct BatchKey {
    /// Owning idea
    pub idea_id: IdeaId,
    /// Generation count shared by the batch
    pub generation: u32,
}

impl BatchKey {
    /// Build a key.
    pub fn new(idea_id: IdeaId, generation: u32) -> Self {
        Self {
            idea_id,
            generation,
        }
    }
}

/// Creatives sharing one idea and one generation count, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, derive_getters::Getters)]
pub struct GenerationBatch {
    /// Batch identity
    key: BatchKey,
    /// Members in the order they were first seen
    creatives: Vec<Creative>,
}

impl GenerationBatch {
    fn new(key: BatchKey) -> Self {
        Self {
            key,
            creatives: Vec::new(),
        }
    }

    /// Owning idea.
    pub fn idea_id(&self) -> &IdeaId {
        &self.key.idea_id
    }

    /// Shared generation count.
    pub fn generation(&self) -> u32 {
        self.key.generation
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.creatives.len()
    }

    /// True for a batch with no members (never produced by grouping).
    pub fn is_empty(&self) -> bool {
        self.creatives.is_empty()
    }

    /// Whether every expected ratio is present.
    ///
    /// Partial batches are normal while a stream is still delivering.
    pub fn is_complete(&self, expected: &[AspectRatio]) -> bool {
        self.missing(expected).is_empty()
    }

    /// Expected ratios with no member yet.
    pub fn missing(&self, expected: &[AspectRatio]) -> Vec<AspectRatio> {
        expected
            .iter()
            .copied()
            .filter(|ratio| !self.creatives.iter().any(|c| c.aspect_ratio == *ratio))
            .collect()
    }

    /// Member identifiers, used for grouped deletes.
    pub fn creative_ids(&self) -> Vec<CreativeId> {
        self.creatives.iter().map(|c| c.id.clone()).collect()
    }

    /// Brand label of the batch, taken from its first member.
    pub fn brand(&self) -> Option<&str> {
        self.creatives.first().and_then(|c| c.brand.as_deref())
    }

    /// Product label of the batch, taken from its first member.
    pub fn product_name(&self) -> Option<&str> {
        self.creatives.first().and_then(|c| c.product_name.as_deref())
    }
}

/// Whether grouping produced something to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupingStatus {
    /// No creatives at all
    Empty,
    /// Creatives exist but none could be grouped
    Ungroupable,
    /// At least one batch
    Grouped,
}

/// Ordered batch mapping produced by [`group_creatives`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Grouping {
    batches: Vec<GenerationBatch>,
    #[serde(skip)]
    index: HashMap<BatchKey, usize>,
    skipped: Vec<CreativeId>,
}

impl Grouping {
    /// Batches in first-seen order.
    pub fn batches(&self) -> &[GenerationBatch] {
        &self.batches
    }

    /// Look a batch up by key.
    pub fn get(&self, key: &BatchKey) -> Option<&GenerationBatch> {
        self.index.get(key).map(|&i| &self.batches[i])
    }

    /// Creatives excluded for lacking an idea identifier.
    pub fn skipped(&self) -> &[CreativeId] {
        &self.skipped
    }

    /// Number of batches.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// True when no batch was produced.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Distinguish "nothing yet" from "nothing groupable".
    pub fn status(&self) -> GroupingStatus {
        match (self.batches.is_empty(), self.skipped.is_empty()) {
            (false, _) => GroupingStatus::Grouped,
            (true, true) => GroupingStatus::Empty,
            (true, false) => GroupingStatus::Ungroupable,
        }
    }

    /// Fail when the input was non-empty but nothing could be grouped.
    pub fn into_result(self) -> Result<Self, GroupingError> {
        match self.status() {
            GroupingStatus::Ungroupable => Err(GroupingError::new(
                GroupingErrorKind::Ungroupable(self.skipped.len()),
            )),
            _ => Ok(self),
        }
    }

    /// Concatenate every batch back into a flat collection.
    pub fn flatten(&self) -> Vec<Creative> {
        self.batches
            .iter()
            .flat_map(|b| b.creatives.iter().cloned())
            .collect()
    }

    fn push(&mut self, key: BatchKey, creative: Creative) {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.batches.push(GenerationBatch::new(key.clone()));
                self.index.insert(key, self.batches.len() - 1);
                self.batches.len() - 1
            }
        };
        self.batches[slot].creatives.push(creative);
    }
}

/// Partition creatives into generation batches.
///
/// Batches appear in the order their first member appears, and members keep
/// their input order. Creatives without an idea identifier are left out of
/// every batch and listed in [`Grouping::skipped`].
///
/// # Examples
///
/// ```
/// use atelier_core::{Creative, GroupingStatus, group_creatives};
///
/// let creatives: Vec<Creative> = serde_json::from_str(r#"[
///     {"id": 101, "idea_id": 7, "aspect_ratio": "16:9", "generation_count": 1},
///     {"id": 102, "idea_id": 7, "aspect_ratio": "9:16", "generation_count": 1},
///     {"id": 103, "idea_id": 7, "aspect_ratio": "1:1", "generation_count": 1}
/// ]"#).unwrap();
///
/// let grouping = group_creatives(&creatives);
/// assert_eq!(grouping.status(), GroupingStatus::Grouped);
/// assert_eq!(grouping.batches()[0].key().to_string(), "7_gen1");
/// assert_eq!(grouping.batches()[0].len(), 3);
/// ```
pub fn group_creatives<'a, I>(creatives: I) -> Grouping
where
    I: IntoIterator<Item = &'a Creative>,
{
    let mut grouping = Grouping::default();
    for creative in creatives {
        match creative.batch_key() {
            Some(key) => grouping.push(key, creative.clone()),
            None => {
                warn!(creative_id = %creative.id, "Creative missing idea_id, excluded from grouping");
                grouping.skipped.push(creative.id.clone());
            }
        }
    }
    if grouping.status() == GroupingStatus::Ungroupable {
        warn!(
            skipped = grouping.skipped.len(),
            "No creatives could be grouped by idea_id"
        );
    }
    grouping
}
