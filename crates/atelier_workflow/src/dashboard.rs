//! Canonical idea and creative state.

use crate::{DashboardEvent, UserNotice};
use atelier_client::{BatchSummary, Progress};
use atelier_core::{
    Creative, CreativeId, GenerationBatch, GroupingStatus, Idea, IdeaId, Platform,
    group_creatives, invariant_holds,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// What the approval queue should render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum QueueView {
    /// No creatives at all
    Empty,
    /// Creatives exist but none could be grouped
    Ungroupable {
        /// Records without an idea
        skipped: usize,
    },
    /// Batches in first-seen order
    Batches(Vec<GenerationBatch>),
}

/// Single-writer state of the dashboard.
///
/// Every mutation arrives as a [`DashboardEvent`]; the queue is regrouped
/// from the full creative collection on every read. Busy and error
/// status of rows lives in [`crate::RowRegistry`], not here.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    ideas: Vec<Idea>,
    creatives: Vec<Creative>,
    progress: HashMap<IdeaId, Progress>,
    summaries: HashMap<IdeaId, BatchSummary>,
    deployments: HashMap<CreativeId, Platform>,
    notices: Vec<UserNotice>,
}

impl Dashboard {
    /// Empty dashboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Idea rows in display order.
    pub fn ideas(&self) -> &[Idea] {
        &self.ideas
    }

    /// Flat creative collection in arrival order.
    pub fn creatives(&self) -> &[Creative] {
        &self.creatives
    }

    /// Look up an idea.
    pub fn idea(&self, id: &IdeaId) -> Option<&Idea> {
        self.ideas.iter().find(|idea| &idea.id == id)
    }

    /// Look up a creative.
    pub fn creative(&self, id: &CreativeId) -> Option<&Creative> {
        self.creatives.iter().find(|creative| &creative.id == id)
    }

    /// Creatives whose confirmed record claims a deployment without the sign-off it needs.
    pub fn inconsistent(&self) -> impl Iterator<Item = &Creative> {
        self.creatives
            .iter()
            .filter(|c| !invariant_holds(&c.approval, c.requires_regional_approval()))
    }

    /// Latest progress of an idea's running batch.
    pub fn progress(&self, idea_id: &IdeaId) -> Option<&Progress> {
        self.progress.get(idea_id)
    }

    /// Outcome of an idea's last finished batch.
    pub fn summary(&self, idea_id: &IdeaId) -> Option<&BatchSummary> {
        self.summaries.get(idea_id)
    }

    /// Platform a creative was deployed to in this session.
    pub fn deployed_to(&self, creative_id: &CreativeId) -> Option<Platform> {
        self.deployments.get(creative_id).copied()
    }

    /// Notices not yet acknowledged.
    pub fn notices(&self) -> &[UserNotice] {
        &self.notices
    }

    /// Take and clear pending notices.
    pub fn drain_notices(&mut self) -> Vec<UserNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Group the current collection for the approval queue.
    pub fn queue(&self) -> QueueView {
        let grouping = group_creatives(&self.creatives);
        match grouping.status() {
            GroupingStatus::Empty => QueueView::Empty,
            GroupingStatus::Ungroupable => QueueView::Ungroupable {
                skipped: grouping.skipped().len(),
            },
            GroupingStatus::Grouped => QueueView::Batches(grouping.batches().to_vec()),
        }
    }

    /// Fold one event into the state.
    pub fn apply(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::CreativesLoaded(creatives) => {
                debug!(count = creatives.len(), "Creatives loaded");
                self.creatives = creatives;
            }
            DashboardEvent::CreativeAdded(creative) => {
                let creative = match self.idea_for(&creative) {
                    Some(idea) => (*creative).inherit_from(idea),
                    None => *creative,
                };
                self.upsert_creative(creative);
            }
            DashboardEvent::CreativeReplaced { old, creative } => {
                self.replace_creative(&old, *creative)
            }
            DashboardEvent::CreativeDeleted(id) => {
                self.creatives.retain(|creative| creative.id != id);
            }
            DashboardEvent::ApprovalChanged {
                creative_id,
                approval,
            } => match self.creatives.iter_mut().find(|c| c.id == creative_id) {
                Some(creative) => {
                    // The server stays authoritative; an inconsistent record is kept but flagged.
                    if !invariant_holds(&approval, creative.requires_regional_approval()) {
                        warn!(%creative_id, ?approval, "Deployed without required sign-off");
                    }
                    creative.approval = approval;
                }
                None => warn!(%creative_id, "Approval for unknown creative"),
            },
            DashboardEvent::Deployed {
                creative_id,
                platform,
            } => {
                self.deployments.insert(creative_id, platform);
            }
            DashboardEvent::IdeaAdded(idea) => self.upsert_idea(*idea),
            DashboardEvent::IdeaUpdated(idea) => self.upsert_idea(*idea),
            DashboardEvent::IdeaArrived(idea) => {
                let slot = self
                    .ideas
                    .iter()
                    .position(|row| row.is_pending() && row.targets(&idea.region, &idea.demographic));
                match slot {
                    Some(index) => self.ideas[index] = *idea,
                    None => self.upsert_idea(*idea),
                }
            }
            DashboardEvent::IdeaFailed {
                region,
                demographic,
                error,
            } => {
                let slot = self
                    .ideas
                    .iter()
                    .position(|row| row.is_pending() && row.targets(&region, &demographic));
                match slot {
                    Some(index) => {
                        let failed = self.ideas[index].clone().into_failed(error);
                        self.ideas[index] = failed;
                    }
                    None => self
                        .ideas
                        .push(Idea::placeholder(region, demographic).into_failed(error)),
                }
            }
            DashboardEvent::IdeaDeleted(id) => {
                self.ideas.retain(|idea| idea.id != id);
                self.creatives
                    .retain(|creative| creative.idea_id.as_ref() != Some(&id));
                self.progress.remove(&id);
            }
            DashboardEvent::BatchProgress { idea_id, progress } => {
                self.progress.insert(idea_id, progress);
            }
            DashboardEvent::BatchCompleted { idea_id, summary } => {
                self.progress.remove(&idea_id);
                self.summaries.insert(idea_id, summary);
            }
            DashboardEvent::Notice(notice) => self.notices.push(notice),
        }
    }

    fn idea_for(&self, creative: &Creative) -> Option<&Idea> {
        creative.idea_id.as_ref().and_then(|id| self.idea(id))
    }

    fn upsert_creative(&mut self, creative: Creative) {
        match self.creatives.iter_mut().find(|c| c.id == creative.id) {
            Some(existing) => *existing = creative,
            None => self.creatives.push(creative),
        }
    }

    fn replace_creative(&mut self, old: &CreativeId, creative: Creative) {
        // A listing may already carry the fresh record.
        if &creative.id != old {
            self.creatives.retain(|c| c.id != creative.id);
        }
        match self.creatives.iter_mut().find(|c| &c.id == old) {
            Some(existing) => *existing = creative,
            None => {
                debug!(%old, "Replaced creative not loaded");
                self.creatives.push(creative);
            }
        }
    }

    fn upsert_idea(&mut self, idea: Idea) {
        match self.ideas.iter_mut().find(|row| row.id == idea.id) {
            Some(existing) => *existing = idea,
            None => self.ideas.push(idea),
        }
    }
}
