//! One CLI invocation's connection to the backend.

use atelier::{
    AtelierClient, AtelierConfig, AtelierResult, BatchKey, ClientError, ClientErrorKind, Creative,
    CreativeBackend, CreativeId, CreativeQuery, Dashboard, DashboardEvent, GenerationBatch,
    Workflow, WorkflowError, WorkflowErrorKind, group_creatives,
};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Page size used when scanning the creative collection.
const PAGE_SIZE: usize = 100;

/// Workflow controller plus a task reporting its events.
pub struct Session {
    workflow: Workflow<AtelierClient>,
    reporter: JoinHandle<Dashboard>,
    config: AtelierConfig,
}

impl Session {
    /// Connect using the loaded configuration.
    pub fn connect(config: AtelierConfig) -> AtelierResult<Self> {
        let client = AtelierClient::new(config.client_config()?);
        debug!(base_url = %client.config().base_url, "Connecting to backend");
        let (workflow, events) = Workflow::new(Arc::new(client), config.workflow.clone());
        let reporter = tokio::spawn(report(events));
        Ok(Self {
            workflow,
            reporter,
            config,
        })
    }

    /// Workflow controller.
    pub fn workflow(&self) -> &Workflow<AtelierClient> {
        &self.workflow
    }

    /// Loaded configuration.
    pub fn config(&self) -> &AtelierConfig {
        &self.config
    }

    /// Every creative the backend holds matching `query`'s status, page by page.
    pub async fn all_creatives(&self, query: CreativeQuery) -> AtelierResult<Vec<Creative>> {
        let mut creatives = Vec::new();
        let mut page = CreativeQuery {
            skip: 0,
            limit: PAGE_SIZE,
            ..query
        };
        loop {
            let batch = self.workflow.backend().list_creatives(&page).await?;
            let done = batch.len() < page.limit;
            creatives.extend(batch);
            if done {
                break;
            }
            page.skip += page.limit;
        }
        debug!(count = creatives.len(), "Creatives loaded");
        Ok(creatives)
    }

    /// Look up one creative so approval gating sees its current record.
    pub async fn find_creative(&self, id: &CreativeId) -> AtelierResult<Creative> {
        self.all_creatives(CreativeQuery::default())
            .await?
            .into_iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| {
                ClientError::new(ClientErrorKind::Api {
                    status: 404,
                    detail: format!("Creative {} not found", id),
                })
                .into()
            })
    }

    /// Look up one generation batch.
    pub async fn find_batch(&self, key: &BatchKey) -> AtelierResult<GenerationBatch> {
        let creatives = self.all_creatives(CreativeQuery::default()).await?;
        group_creatives(&creatives).get(key).cloned().ok_or_else(|| {
            WorkflowError::new(WorkflowErrorKind::Unavailable {
                row: key.to_string(),
                reason: "no creatives in this batch".to_string(),
            })
            .into()
        })
    }

    /// Close the event channel and return the state the events built.
    pub async fn finish(self) -> Dashboard {
        drop(self.workflow);
        match self.reporter.await {
            Ok(dashboard) => dashboard,
            Err(e) => {
                warn!(error = %e, "Event reporter stopped");
                Dashboard::new()
            }
        }
    }
}

async fn report(mut events: UnboundedReceiver<DashboardEvent>) -> Dashboard {
    let mut dashboard = Dashboard::new();
    while let Some(event) = events.recv().await {
        match &event {
            DashboardEvent::BatchProgress { idea_id, progress } => {
                info!(
                    %idea_id,
                    aspect_ratio = %progress.aspect_ratio,
                    "Generating {}/{}",
                    progress.index,
                    progress.total
                );
            }
            DashboardEvent::CreativeAdded(creative) => {
                info!(creative_id = %creative.id, aspect_ratio = %creative.aspect_ratio, "Creative ready");
            }
            DashboardEvent::IdeaArrived(idea) => {
                info!(idea_id = %idea.id, region = %idea.region, demographic = %idea.demographic, "Idea ready");
            }
            DashboardEvent::IdeaFailed {
                region,
                demographic,
                error,
            } => {
                warn!(%region, %demographic, "Idea failed: {}", error);
            }
            _ => {}
        }
        dashboard.apply(event);
    }
    dashboard
}
