//! Row workflows against a creative backend.
//!
//! Every operation follows the same shape: claim the affected rows in the
//! [`RowRegistry`], run the backend call (under a busy floor where the
//! row shows a spinner), settle the rows, then emit either the confirmed
//! change or a [`UserNotice`]. Nothing is emitted before the backend
//! confirms it, so a failure leaves the last confirmed state in place.

use crate::{
    DashboardEvent, RowActivity, RowGuard, RowKey, RowRegistry, UserNotice, WorkflowConfig,
    with_min_duration,
};
use atelier_client::{BatchSummary, BatchUpdate, CreativeBackend, CreativeQuery, IdeaStreamEvent};
use atelier_core::{
    ActionSet, Approval, ApprovalAction, BatchKey, BriefId, Creative, CreativeId,
    GenerationBatch, Idea, IdeaId, Platform, ProviderSettings, check_action,
};
use atelier_error::{AtelierError, AtelierResult, WorkflowError, WorkflowErrorKind};
use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Result of a successful duplicate-and-generate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Duplicated {
    /// The new idea row
    pub idea: Idea,
    /// Outcome of its first batch
    pub summary: BatchSummary,
}

/// Result of toggling the duplicate control of a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DuplicateToggle {
    /// First activation: a duplicate row was created
    Created(Duplicated),
    /// Second activation: the mark was cleared, nothing was sent
    Cleared,
}

/// Result of a deploy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deployment {
    /// Server-confirmed approval record
    pub approval: Approval,
    /// Target chosen for display
    pub platform: Platform,
}

/// Result of a brief execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BriefOutcome {
    /// Ideas persisted by the backend
    pub ideas: Vec<Idea>,
    /// Targets that failed
    pub failed: usize,
}

/// Card actions answered with a fresh approval record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignOff {
    Creative,
    Regional,
    Deploy,
}

impl From<SignOff> for ApprovalAction {
    fn from(sign_off: SignOff) -> Self {
        match sign_off {
            SignOff::Creative => ApprovalAction::ApproveCreative,
            SignOff::Regional => ApprovalAction::ApproveRegional,
            SignOff::Deploy => ApprovalAction::Deploy,
        }
    }
}

/// Workflow controller.
pub struct Workflow<B> {
    backend: Arc<B>,
    config: WorkflowConfig,
    rows: RowRegistry,
    events: mpsc::UnboundedSender<DashboardEvent>,
}

impl<B: CreativeBackend> Workflow<B> {
    /// Create a controller and the receiving end of its event channel.
    pub fn new(
        backend: Arc<B>,
        config: WorkflowConfig,
    ) -> (Self, mpsc::UnboundedReceiver<DashboardEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let workflow = Self {
            backend,
            config,
            rows: RowRegistry::new(),
            events,
        };
        (workflow, rx)
    }

    /// Backend in use.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Timing configuration.
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Row statuses.
    pub fn rows(&self) -> &RowRegistry {
        &self.rows
    }

    /// Controls a creative card should offer right now.
    pub fn actions_for(&self, creative: &Creative) -> ActionSet {
        let busy = self.rows.is_busy(&RowKey::Creative(creative.id.clone()));
        ActionSet::for_creative(creative, busy)
    }

    fn emit(&self, event: DashboardEvent) {
        if self.events.send(event).is_err() {
            debug!("Dashboard gone, dropping event");
        }
    }

    fn fail<T>(&self, action: &str, err: impl Into<AtelierError>) -> AtelierResult<T> {
        let err = err.into();
        error!(action, error = %err, "Action failed");
        self.emit(DashboardEvent::Notice(UserNotice::new(
            action,
            err.user_message(),
        )));
        Err(err)
    }

    fn begin(&self, keys: Vec<RowKey>, activity: RowActivity) -> AtelierResult<RowGuard> {
        Ok(self.rows.try_begin(keys, activity)?)
    }

    /// Replace an idea's content in place.
    #[instrument(skip(self), fields(idea_id = %idea_id))]
    pub async fn regenerate_idea(&self, idea_id: &IdeaId) -> AtelierResult<Idea> {
        let guard = self.begin(vec![RowKey::Idea(idea_id.clone())], RowActivity::Regenerating)?;
        let outcome = with_min_duration(
            self.config.row_busy_floor(),
            self.backend.regenerate_idea(idea_id),
        )
        .await;
        guard.finish(&outcome);

        match outcome {
            Ok(idea) => {
                info!(generation = idea.generation_count, "Idea regenerated");
                self.emit(DashboardEvent::IdeaUpdated(Box::new(idea.clone())));
                Ok(idea)
            }
            Err(e) => self.fail("regenerate idea", e),
        }
    }

    /// Duplicate an idea, then generate a batch for the copy.
    ///
    /// If duplication fails, generation is never attempted. If generation
    /// fails, the copy is kept and the error is returned.
    #[instrument(skip(self), fields(idea_id = %idea_id))]
    pub async fn duplicate_and_generate(&self, idea_id: &IdeaId) -> AtelierResult<Duplicated> {
        let guard = self.begin(vec![RowKey::Idea(idea_id.clone())], RowActivity::Duplicating)?;
        self.duplicate_row(guard, idea_id).await
    }

    /// Duplicate control of a batch row.
    ///
    /// The first activation sets the row's duplicate mark and runs
    /// duplicate-and-generate. Activating it again only clears the mark.
    /// The mark stays set when the duplicate fails.
    #[instrument(skip(self), fields(batch = %batch))]
    pub async fn toggle_duplicate(&self, batch: &BatchKey) -> AtelierResult<DuplicateToggle> {
        let idea_id = &batch.idea_id;
        if !self.rows.row_actions(batch).duplicate() {
            return Err(WorkflowError::new(WorkflowErrorKind::RowBusy(batch.to_string())).into());
        }
        if self.rows.duplicate_active(idea_id) {
            self.rows.set_duplicate_mark(idea_id, false);
            debug!("Duplicate mark cleared");
            return Ok(DuplicateToggle::Cleared);
        }

        let guard = self.begin(
            vec![RowKey::Batch(batch.clone()), RowKey::Idea(idea_id.clone())],
            RowActivity::Duplicating,
        )?;
        self.rows.set_duplicate_mark(idea_id, true);
        self.duplicate_row(guard, idea_id)
            .await
            .map(DuplicateToggle::Created)
    }

    async fn duplicate_row(&self, guard: RowGuard, idea_id: &IdeaId) -> AtelierResult<Duplicated> {
        let outcome = with_min_duration(
            self.config.row_busy_floor(),
            self.duplicate_then_generate(idea_id),
        )
        .await;
        guard.finish(&outcome);

        match outcome {
            Ok(duplicated) => {
                info!(new_idea_id = %duplicated.idea.id, received = duplicated.summary.received, "Duplicate row created");
                Ok(duplicated)
            }
            Err(e) => self.fail("create duplicate row", e),
        }
    }

    async fn duplicate_then_generate(&self, idea_id: &IdeaId) -> Result<Duplicated, WorkflowError> {
        let copy = self.backend.duplicate_idea(idea_id).await.map_err(|e| {
            WorkflowError::new(WorkflowErrorKind::DuplicateFailed {
                idea_id: idea_id.to_string(),
                reason: e.user_message(),
            })
        })?;
        debug!(new_idea_id = %copy.id, "Idea duplicated");
        self.emit(DashboardEvent::IdeaAdded(Box::new(copy.clone())));

        let copy_guard = self
            .rows
            .try_begin(vec![RowKey::Idea(copy.id.clone())], RowActivity::Generating)?;
        let outcome = self.run_batch(&copy.id).await;
        copy_guard.finish(&outcome);

        match outcome {
            Ok(summary) => Ok(Duplicated {
                idea: copy,
                summary,
            }),
            Err(e) => {
                warn!(orphan_idea_id = %copy.id, "Duplicate kept without creatives");
                Err(e)
            }
        }
    }

    /// Re-run batch generation for a row's idea.
    ///
    /// Hidden while the row's duplicate mark is set.
    #[instrument(skip(self), fields(batch = %batch))]
    pub async fn regenerate_row(&self, batch: &BatchKey) -> AtelierResult<BatchSummary> {
        if self.rows.duplicate_active(&batch.idea_id) {
            return Err(WorkflowError::new(WorkflowErrorKind::Unavailable {
                row: batch.to_string(),
                reason: "regenerate is hidden while the duplicate mark is set".to_string(),
            })
            .into());
        }
        let guard = self.begin(
            vec![RowKey::Batch(batch.clone()), RowKey::Idea(batch.idea_id.clone())],
            RowActivity::Regenerating,
        )?;
        let outcome = with_min_duration(
            self.config.row_busy_floor(),
            self.run_batch(&batch.idea_id),
        )
        .await;
        guard.finish(&outcome);
        outcome.or_else(|e| self.fail("regenerate creatives", e))
    }

    /// Generate a batch of creatives for an idea card.
    #[instrument(skip(self), fields(idea_id = %idea_id))]
    pub async fn generate_for_idea(&self, idea_id: &IdeaId) -> AtelierResult<BatchSummary> {
        let guard = self.begin(vec![RowKey::Idea(idea_id.clone())], RowActivity::Generating)?;
        let outcome =
            with_min_duration(self.config.idea_busy_floor(), self.run_batch(idea_id)).await;
        guard.finish(&outcome);
        outcome.or_else(|e| self.fail("generate creatives", e))
    }

    async fn run_batch(&self, idea_id: &IdeaId) -> Result<BatchSummary, WorkflowError> {
        let generation_failed = |reason: String| {
            WorkflowError::new(WorkflowErrorKind::GenerationFailed {
                idea_id: idea_id.to_string(),
                reason,
            })
        };

        let mut stream = self
            .backend
            .generate_creatives(idea_id)
            .await
            .map_err(|e| generation_failed(e.user_message()))?;

        let mut summary = BatchSummary::new(self.config.batch_size());
        while let Some(update) = stream.next().await {
            match update.map_err(|e| generation_failed(e.user_message()))? {
                BatchUpdate::Progress(progress) => self.emit(DashboardEvent::BatchProgress {
                    idea_id: idea_id.clone(),
                    progress,
                }),
                BatchUpdate::Creative(creative) => {
                    self.emit(DashboardEvent::CreativeAdded(creative));
                }
                BatchUpdate::Failed(failure) => {
                    debug!(aspect_ratio = ?failure.aspect_ratio, "Ratio failed, batch continues");
                }
                BatchUpdate::Completed(done) => summary = done,
            }
        }
        summary.expected = self.config.batch_size();

        if summary.is_partial() {
            warn!(received = summary.received, expected = summary.expected, "Partial batch");
        }
        self.emit(DashboardEvent::BatchCompleted {
            idea_id: idea_id.clone(),
            summary: summary.clone(),
        });
        Ok(summary)
    }

    /// Delete every creative of a batch.
    ///
    /// Deletions run concurrently. The operation succeeds only if all of
    /// them do; creatives that were deleted stay deleted either way.
    #[instrument(skip(self, batch), fields(batch = %batch.key()))]
    pub async fn delete_batch(&self, batch: &GenerationBatch) -> AtelierResult<()> {
        let key = batch.key();
        let guard = self.begin(
            vec![RowKey::Batch(key.clone()), RowKey::Idea(key.idea_id.clone())],
            RowActivity::Deleting,
        )?;

        let ids = batch.creative_ids();
        let results =
            futures::future::join_all(ids.iter().map(|id| self.backend.delete_creative(id))).await;

        let mut failed = 0;
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(()) => self.emit(DashboardEvent::CreativeDeleted(id.clone())),
                Err(e) => {
                    warn!(creative_id = %id, error = %e, "Delete failed");
                    failed += 1;
                }
            }
        }

        let outcome = if failed == 0 {
            Ok(())
        } else {
            Err(WorkflowError::new(WorkflowErrorKind::PartialDelete {
                batch: key.to_string(),
                failed,
                total: ids.len(),
            }))
        };
        guard.finish(&outcome);
        outcome.or_else(|e| self.fail("delete creatives", e))
    }

    /// Delete an idea; the backend removes its creatives too.
    #[instrument(skip(self), fields(idea_id = %idea_id))]
    pub async fn delete_idea(&self, idea_id: &IdeaId) -> AtelierResult<()> {
        let guard = self.begin(vec![RowKey::Idea(idea_id.clone())], RowActivity::Deleting)?;
        let outcome = self.backend.delete_idea(idea_id).await;
        guard.finish(&outcome);
        match outcome {
            Ok(()) => {
                self.emit(DashboardEvent::IdeaDeleted(idea_id.clone()));
                Ok(())
            }
            Err(e) => self.fail("delete idea", e),
        }
    }

    /// Delete a single creative.
    #[instrument(skip(self), fields(creative_id = %creative_id))]
    pub async fn delete_creative(&self, creative_id: &CreativeId) -> AtelierResult<()> {
        let guard = self.begin(
            vec![RowKey::Creative(creative_id.clone())],
            RowActivity::Deleting,
        )?;
        let outcome = self.backend.delete_creative(creative_id).await;
        guard.finish(&outcome);
        match outcome {
            Ok(()) => {
                self.emit(DashboardEvent::CreativeDeleted(creative_id.clone()));
                Ok(())
            }
            Err(e) => self.fail("delete creative", e),
        }
    }

    /// Re-render one creative; its approval starts over.
    #[instrument(skip(self, creative), fields(creative_id = %creative.id))]
    pub async fn regenerate_creative(&self, creative: &Creative) -> AtelierResult<Creative> {
        let guard = self.begin(
            vec![RowKey::Creative(creative.id.clone())],
            RowActivity::Regenerating,
        )?;
        let outcome = self.backend.regenerate_creative(&creative.id).await;
        guard.finish(&outcome);
        match outcome {
            Ok(fresh) => {
                let replaced = creative.replaced_by(fresh);
                info!("Creative regenerated, approval reset");
                self.emit(DashboardEvent::CreativeReplaced {
                    old: creative.id.clone(),
                    creative: Box::new(replaced.clone()),
                });
                Ok(replaced)
            }
            Err(e) => self.fail("regenerate creative", e),
        }
    }

    /// Toggle creative sign-off.
    #[instrument(skip(self, creative), fields(creative_id = %creative.id))]
    pub async fn approve_creative(&self, creative: &Creative) -> AtelierResult<Approval> {
        self.approval_action(creative, SignOff::Creative)
            .await
    }

    /// Toggle regional sign-off.
    #[instrument(skip(self, creative), fields(creative_id = %creative.id))]
    pub async fn approve_regional(&self, creative: &Creative) -> AtelierResult<Approval> {
        self.approval_action(creative, SignOff::Regional)
            .await
    }

    /// Publish a creative to the chosen platform.
    #[instrument(skip(self, creative), fields(creative_id = %creative.id, %platform))]
    pub async fn deploy(&self, creative: &Creative, platform: Platform) -> AtelierResult<Deployment> {
        let approval = self.approval_action(creative, SignOff::Deploy).await?;
        info!("Deployed");
        self.emit(DashboardEvent::Deployed {
            creative_id: creative.id.clone(),
            platform,
        });
        Ok(Deployment { approval, platform })
    }

    async fn approval_action(&self, creative: &Creative, sign_off: SignOff) -> AtelierResult<Approval> {
        let action = ApprovalAction::from(sign_off);
        if let Err(e) = check_action(creative, action) {
            return self.fail(action.as_ref(), e);
        }
        let guard = self.begin(
            vec![RowKey::Creative(creative.id.clone())],
            RowActivity::Approving,
        )?;
        let outcome = match sign_off {
            SignOff::Creative => self.backend.approve_creative(&creative.id).await,
            SignOff::Regional => self.backend.approve_regional(&creative.id).await,
            SignOff::Deploy => self.backend.deploy(&creative.id).await,
        };
        guard.finish(&outcome);

        match outcome {
            Ok(approval) => {
                debug!(
                    creative_approved = approval.creative_approved,
                    regional_approved = approval.regional_approved,
                    deployed = approval.deployed,
                    "Approval confirmed"
                );
                self.emit(DashboardEvent::ApprovalChanged {
                    creative_id: creative.id.clone(),
                    approval: approval.clone(),
                });
                Ok(approval)
            }
            Err(e) => self.fail(action.as_ref(), e),
        }
    }

    /// Run a brief, filling placeholder rows as ideas arrive.
    #[instrument(skip(self), fields(brief_id = %brief_id))]
    pub async fn execute_brief(&self, brief_id: &BriefId) -> AtelierResult<BriefOutcome> {
        let mut stream = match self.backend.execute_brief(brief_id).await {
            Ok(stream) => stream,
            Err(e) => return self.fail("execute brief", e),
        };

        let mut outcome = BriefOutcome::default();
        while let Some(event) = stream.next().await {
            let event = match event {
                Ok(event) => event,
                Err(e) => return self.fail("execute brief", e),
            };
            match event {
                IdeaStreamEvent::Init {
                    regions,
                    demographics,
                    total,
                } => {
                    info!(total, "Brief execution started");
                    for region in &regions {
                        for demographic in &demographics {
                            self.emit(DashboardEvent::IdeaAdded(Box::new(Idea::placeholder(
                                region.clone(),
                                demographic.clone(),
                            ))));
                        }
                    }
                }
                IdeaStreamEvent::Idea(idea) => {
                    debug!(idea_id = %idea.id, region = %idea.region, "Idea generated");
                    outcome.ideas.push((*idea).clone());
                    self.emit(DashboardEvent::IdeaArrived(idea));
                }
                IdeaStreamEvent::Error {
                    region,
                    demographic,
                    error,
                } => {
                    warn!(%region, %demographic, %error, "Idea generation failed");
                    outcome.failed += 1;
                    self.emit(DashboardEvent::IdeaFailed {
                        region,
                        demographic,
                        error,
                    });
                }
                IdeaStreamEvent::Complete => break,
                IdeaStreamEvent::FatalError { error } => {
                    return self.fail(
                        "execute brief",
                        WorkflowError::new(WorkflowErrorKind::BriefFailed {
                            brief_id: brief_id.to_string(),
                            reason: error,
                        }),
                    );
                }
            }
        }
        info!(ideas = outcome.ideas.len(), failed = outcome.failed, "Brief executed");
        Ok(outcome)
    }

    /// Reload the creative collection from the backend.
    #[instrument(skip(self))]
    pub async fn refresh(&self, query: &CreativeQuery) -> AtelierResult<Vec<Creative>> {
        match self.backend.list_creatives(query).await {
            Ok(creatives) => {
                self.emit(DashboardEvent::CreativesLoaded(creatives.clone()));
                Ok(creatives)
            }
            Err(e) => self.fail("load creatives", e),
        }
    }

    /// Stored provider settings.
    #[instrument(skip(self))]
    pub async fn load_settings(&self) -> AtelierResult<ProviderSettings> {
        let flat = match self.backend.get_settings().await {
            Ok(flat) => flat,
            Err(e) => return self.fail("load settings", e),
        };
        ProviderSettings::from_flat(&flat).or_else(|e| self.fail("load settings", e))
    }

    /// Save provider settings and return what the backend stored.
    #[instrument(skip(self, settings))]
    pub async fn save_settings(&self, settings: &ProviderSettings) -> AtelierResult<ProviderSettings> {
        let stored = match self.backend.save_settings(&settings.to_flat()).await {
            Ok(stored) => stored,
            Err(e) => return self.fail("save settings", e),
        };
        ProviderSettings::from_flat(&stored).or_else(|e| self.fail("save settings", e))
    }
}
