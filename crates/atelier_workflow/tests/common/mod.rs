//! Scripted in-memory backend for workflow tests.

#![allow(dead_code)]

use async_trait::async_trait;
use atelier_client::{
    BatchStream, BatchSummary, BatchUpdate, ClientResult, CreativeBackend, CreativeQuery,
    IdeaStream, IdeaStreamEvent, Progress, RatioFailure,
};
use atelier_core::{
    Approval, AspectRatio, BriefId, Creative, CreativeId, Idea, IdeaId, Region,
};
use atelier_error::{ClientError, ClientErrorKind};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

pub fn rejected(detail: &str) -> ClientError {
    ClientError::new(ClientErrorKind::Api {
        status: 500,
        detail: detail.to_string(),
    })
}

pub fn idea(id: &str, region: &str) -> Idea {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "region": region,
        "demographic": "Gen Z",
        "content": "Morning run with friends",
        "generation_count": 1,
    }))
    .unwrap()
}

pub fn creative(id: &str, idea_id: &str, ratio: AspectRatio, region: &str) -> Creative {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "idea_id": idea_id,
        "aspect_ratio": ratio.to_string(),
        "generation_count": 1,
        "region": region,
        "file_path": format!("uploads/creatives/{}.png", id),
    }))
    .unwrap()
}

/// Backend whose answers are scripted per test.
#[derive(Default)]
pub struct ScriptedBackend {
    /// Delay before every answer
    pub latency: Duration,
    pub fail_regenerate: bool,
    pub fail_duplicate: bool,
    pub fail_generate: bool,
    /// Ratios that report an error event instead of a creative
    pub failing_ratios: HashSet<AspectRatio>,
    pub failing_deletes: HashSet<CreativeId>,
    pub brief_events: Vec<IdeaStreamEvent>,
    pub settings: Mutex<BTreeMap<String, String>>,
    pub calls: Mutex<HashMap<&'static str, usize>>,
    pub approvals: Mutex<HashMap<CreativeId, Approval>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls.lock().get(endpoint).copied().unwrap_or(0)
    }

    async fn hit(&self, endpoint: &'static str) {
        *self.calls.lock().entry(endpoint).or_insert(0) += 1;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn toggle(&self, id: &CreativeId, edit: impl FnOnce(&mut Approval)) -> ClientResult<Approval> {
        let mut approvals = self.approvals.lock();
        let approval = approvals.entry(id.clone()).or_default();
        if approval.deployed {
            return Err(ClientError::new(ClientErrorKind::Api {
                status: 400,
                detail: "Cannot modify approvals after deployment".to_string(),
            }));
        }
        edit(approval);
        Ok(approval.clone())
    }
}

#[async_trait]
impl CreativeBackend for ScriptedBackend {
    async fn regenerate_idea(&self, idea_id: &IdeaId) -> ClientResult<Idea> {
        self.hit("regenerate_idea").await;
        if self.fail_regenerate {
            return Err(rejected("LLM unavailable"));
        }
        let mut fresh = idea(idea_id.as_str(), "DE");
        fresh.content = Some("A brand new angle".to_string());
        Ok(fresh)
    }

    async fn duplicate_idea(&self, idea_id: &IdeaId) -> ClientResult<Idea> {
        self.hit("duplicate_idea").await;
        if self.fail_duplicate {
            return Err(rejected("Idea not found"));
        }
        Ok(idea(&format!("{}-copy", idea_id), "DE"))
    }

    async fn delete_idea(&self, _idea_id: &IdeaId) -> ClientResult<()> {
        self.hit("delete_idea").await;
        Ok(())
    }

    async fn generate_creatives(&self, idea_id: &IdeaId) -> ClientResult<BatchStream> {
        self.hit("generate_creatives").await;
        if self.fail_generate {
            return Err(rejected("Firefly generation failed"));
        }
        let total = AspectRatio::COUNT;
        let mut updates = Vec::new();
        let mut summary = BatchSummary::new(total);
        for (index, ratio) in AspectRatio::ALL.iter().enumerate() {
            updates.push(Ok(BatchUpdate::Progress(Progress {
                aspect_ratio: *ratio,
                index: index + 1,
                total,
            })));
            if self.failing_ratios.contains(ratio) {
                let failure = RatioFailure {
                    aspect_ratio: Some(*ratio),
                    message: "generator timeout".to_string(),
                };
                summary.failed.push(failure.clone());
                updates.push(Ok(BatchUpdate::Failed(failure)));
            } else {
                summary.received += 1;
                let id = format!("{}-{}", idea_id, index + 1);
                let mut generated = creative(&id, idea_id.as_str(), *ratio, "DE");
                generated.region = None;
                updates.push(Ok(BatchUpdate::Creative(Box::new(generated))));
            }
        }
        updates.push(Ok(BatchUpdate::Completed(summary)));
        Ok(Box::pin(futures::stream::iter(updates)))
    }

    async fn regenerate_creative(&self, creative_id: &CreativeId) -> ClientResult<Creative> {
        self.hit("regenerate_creative").await;
        self.approvals.lock().remove(creative_id);
        let mut fresh = creative(creative_id.as_str(), "7", AspectRatio::Square, "DE");
        fresh.region = None;
        fresh.file_path = format!("uploads/creatives/{}-v2.png", creative_id);
        fresh.approval = Approval::with_flags(true, true, false);
        Ok(fresh)
    }

    async fn approve_creative(&self, creative_id: &CreativeId) -> ClientResult<Approval> {
        self.hit("approve_creative").await;
        self.toggle(creative_id, |a| a.creative_approved = !a.creative_approved)
    }

    async fn approve_regional(&self, creative_id: &CreativeId) -> ClientResult<Approval> {
        self.hit("approve_regional").await;
        self.toggle(creative_id, |a| a.regional_approved = !a.regional_approved)
    }

    async fn deploy(&self, creative_id: &CreativeId) -> ClientResult<Approval> {
        self.hit("deploy").await;
        self.toggle(creative_id, |a| a.deployed = true)
    }

    async fn delete_creative(&self, creative_id: &CreativeId) -> ClientResult<()> {
        self.hit("delete_creative").await;
        if self.failing_deletes.contains(creative_id) {
            return Err(rejected("Creative not found"));
        }
        Ok(())
    }

    async fn delete_creatives_for_idea(&self, _idea_id: &IdeaId) -> ClientResult<()> {
        self.hit("delete_creatives_for_idea").await;
        Ok(())
    }

    async fn list_creatives(&self, _query: &CreativeQuery) -> ClientResult<Vec<Creative>> {
        self.hit("list_creatives").await;
        Ok(vec![
            creative("101", "7", AspectRatio::Landscape, "DE"),
            creative("102", "7", AspectRatio::Portrait, "DE"),
        ])
    }

    async fn execute_brief(&self, _brief_id: &BriefId) -> ClientResult<IdeaStream> {
        self.hit("execute_brief").await;
        let events: Vec<ClientResult<IdeaStreamEvent>> =
            self.brief_events.iter().cloned().map(Ok).collect();
        Ok(Box::pin(futures::stream::iter(events)))
    }

    async fn get_settings(&self) -> ClientResult<BTreeMap<String, String>> {
        self.hit("get_settings").await;
        Ok(self.settings.lock().clone())
    }

    async fn save_settings(
        &self,
        settings: &BTreeMap<String, String>,
    ) -> ClientResult<BTreeMap<String, String>> {
        self.hit("save_settings").await;
        let mut stored = self.settings.lock();
        stored.extend(settings.clone());
        Ok(stored.clone())
    }
}

pub fn brief_events() -> Vec<IdeaStreamEvent> {
    vec![
        IdeaStreamEvent::Init {
            regions: vec![Region::new("US"), Region::new("DE")],
            demographics: vec!["Gen Z".to_string()],
            total: 2,
        },
        IdeaStreamEvent::Idea(Box::new(idea("11", "US"))),
        IdeaStreamEvent::Error {
            region: Region::new("DE"),
            demographic: "Gen Z".to_string(),
            error: "rate limited".to_string(),
        },
        IdeaStreamEvent::Complete,
    ]
}
