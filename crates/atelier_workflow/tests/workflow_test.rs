//! Workflow controller tests against a scripted backend.

mod common;

use atelier_core::{Approval, AspectRatio, BatchKey, BriefId, CreativeId, IdeaId, Platform};
use atelier_error::{AtelierErrorKind, WorkflowErrorKind};
use atelier_workflow::{
    Dashboard, DashboardEvent, DuplicateToggle, QueueView, RowKey, RowStatus, Workflow,
    WorkflowConfig,
};
use common::{ScriptedBackend, brief_events, creative, idea};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

fn workflow(backend: ScriptedBackend) -> (Workflow<ScriptedBackend>, UnboundedReceiver<DashboardEvent>) {
    Workflow::new(Arc::new(backend), WorkflowConfig::default())
}

fn drain(rx: &mut UnboundedReceiver<DashboardEvent>) -> Vec<DashboardEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn workflow_kind(err: &atelier_error::AtelierError) -> &WorkflowErrorKind {
    match err.kind() {
        AtelierErrorKind::Workflow(e) => &e.kind,
        other => panic!("expected workflow error, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn fast_regenerate_waits_for_row_floor() {
    let (workflow, _rx) = workflow(ScriptedBackend::new().with_latency(Duration::from_millis(10)));
    let start = Instant::now();
    workflow.regenerate_idea(&IdeaId::from("7")).await.unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(3000), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(3100), "{:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn failed_regenerate_still_waits_for_floor() {
    let backend = ScriptedBackend {
        latency: Duration::from_millis(10),
        fail_regenerate: true,
        ..ScriptedBackend::new()
    };
    let (workflow, mut rx) = workflow(backend);
    let start = Instant::now();
    let err = workflow.regenerate_idea(&IdeaId::from("7")).await.unwrap_err();
    assert!(start.elapsed() >= Duration::from_millis(3000));
    assert_eq!(err.user_message(), "LLM unavailable");

    let events = drain(&mut rx);
    assert!(matches!(
        events.as_slice(),
        [DashboardEvent::Notice(notice)] if notice.message == "LLM unavailable"
    ));
    assert!(matches!(
        workflow.rows().status(&RowKey::Idea(IdeaId::from("7"))),
        RowStatus::Error(_)
    ));
}

#[tokio::test(start_paused = true)]
async fn slow_call_is_not_padded_beyond_its_own_duration() {
    let (workflow, _rx) = workflow(ScriptedBackend::new().with_latency(Duration::from_millis(5000)));
    let start = Instant::now();
    workflow.generate_for_idea(&IdeaId::from("7")).await.unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(5000));
    assert!(elapsed < Duration::from_millis(5100), "{:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn idea_generation_uses_shorter_floor() {
    let (workflow, mut rx) = workflow(ScriptedBackend::new().with_latency(Duration::from_millis(10)));
    let start = Instant::now();
    let summary = workflow.generate_for_idea(&IdeaId::from("7")).await.unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(2000));
    assert!(elapsed < Duration::from_millis(2100), "{:?}", elapsed);
    assert_eq!(summary.received, 3);

    let added = drain(&mut rx)
        .into_iter()
        .filter(|e| matches!(e, DashboardEvent::CreativeAdded(_)))
        .count();
    assert_eq!(added, 3);
}

#[tokio::test(start_paused = true)]
async fn fast_duplicate_waits_for_row_floor() {
    let (workflow, _rx) = workflow(ScriptedBackend::new().with_latency(Duration::from_millis(10)));
    let start = Instant::now();
    let duplicated = workflow
        .duplicate_and_generate(&IdeaId::from("7"))
        .await
        .unwrap();
    let elapsed = start.elapsed();
    assert_eq!(duplicated.summary.received, 3);
    assert!(elapsed >= Duration::from_millis(3000), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(3100), "{:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn failed_duplicate_still_waits_for_row_floor() {
    let backend = ScriptedBackend {
        latency: Duration::from_millis(10),
        fail_duplicate: true,
        ..ScriptedBackend::new()
    };
    let (workflow, _rx) = workflow(backend);
    let start = Instant::now();
    let err = workflow
        .duplicate_and_generate(&IdeaId::from("7"))
        .await
        .unwrap_err();
    assert!(start.elapsed() >= Duration::from_millis(3000), "{:?}", start.elapsed());
    assert!(matches!(workflow_kind(&err), WorkflowErrorKind::DuplicateFailed { .. }));
    assert_eq!(workflow.backend().calls("generate_creatives"), 0);
    assert!(matches!(
        workflow.rows().status(&RowKey::Idea(IdeaId::from("7"))),
        RowStatus::Error(_)
    ));
}

#[tokio::test(start_paused = true)]
async fn duplicate_toggle_waits_for_row_floor() {
    let (workflow, _rx) = workflow(ScriptedBackend::new().with_latency(Duration::from_millis(10)));
    let batch = BatchKey::new(IdeaId::from("7"), 1);

    let start = Instant::now();
    let first = workflow.toggle_duplicate(&batch).await.unwrap();
    assert!(matches!(first, DuplicateToggle::Created(_)));
    assert!(start.elapsed() >= Duration::from_millis(3000), "{:?}", start.elapsed());

    // Clearing the mark makes no backend call and is not padded.
    let start = Instant::now();
    assert_eq!(
        workflow.toggle_duplicate(&batch).await.unwrap(),
        DuplicateToggle::Cleared
    );
    assert!(start.elapsed() < Duration::from_millis(100), "{:?}", start.elapsed());
}

#[tokio::test(start_paused = true)]
async fn fast_row_regenerate_waits_for_row_floor() {
    let (workflow, _rx) = workflow(ScriptedBackend::new().with_latency(Duration::from_millis(10)));
    let batch = BatchKey::new(IdeaId::from("7"), 1);
    let start = Instant::now();
    let summary = workflow.regenerate_row(&batch).await.unwrap();
    let elapsed = start.elapsed();
    assert_eq!(summary.received, 3);
    assert!(elapsed >= Duration::from_millis(3000), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(3100), "{:?}", elapsed);
}

#[tokio::test]
async fn failed_duplicate_never_generates() {
    let backend = ScriptedBackend {
        fail_duplicate: true,
        ..ScriptedBackend::new()
    };
    let (workflow, mut rx) = Workflow::new(
        Arc::new(backend),
        WorkflowConfig::default().without_floors(),
    );
    let err = workflow
        .duplicate_and_generate(&IdeaId::from("7"))
        .await
        .unwrap_err();

    assert!(matches!(
        workflow_kind(&err),
        WorkflowErrorKind::DuplicateFailed { reason, .. } if reason == "Idea not found"
    ));
    assert_eq!(workflow.backend().calls("duplicate_idea"), 1);
    assert_eq!(workflow.backend().calls("generate_creatives"), 0);
    assert!(
        drain(&mut rx)
            .iter()
            .all(|e| matches!(e, DashboardEvent::Notice(_)))
    );
}

#[tokio::test]
async fn failed_generation_keeps_the_duplicate() {
    let backend = ScriptedBackend {
        fail_generate: true,
        ..ScriptedBackend::new()
    };
    let (workflow, mut rx) = Workflow::new(
        Arc::new(backend),
        WorkflowConfig::default().without_floors(),
    );
    let err = workflow
        .duplicate_and_generate(&IdeaId::from("7"))
        .await
        .unwrap_err();

    assert!(matches!(
        workflow_kind(&err),
        WorkflowErrorKind::GenerationFailed { idea_id, .. } if idea_id == "7-copy"
    ));
    assert_eq!(workflow.backend().calls("generate_creatives"), 1);
    assert_eq!(workflow.backend().calls("delete_idea"), 0);

    let mut dashboard = Dashboard::new();
    for event in drain(&mut rx) {
        dashboard.apply(event);
    }
    assert!(dashboard.idea(&IdeaId::from("7-copy")).is_some());
    assert_eq!(dashboard.notices().len(), 1);
    assert_eq!(
        workflow.rows().status(&RowKey::Idea(IdeaId::from("7-copy"))),
        RowStatus::Error(err_text(&err))
    );
}

fn err_text(err: &atelier_error::AtelierError) -> String {
    match err.kind() {
        AtelierErrorKind::Workflow(e) => e.to_string(),
        other => other.to_string(),
    }
}

#[tokio::test]
async fn duplicate_creates_a_new_batch_row() {
    let (workflow, mut rx) = Workflow::new(
        Arc::new(ScriptedBackend::new()),
        WorkflowConfig::default().without_floors(),
    );
    let mut dashboard = Dashboard::new();
    dashboard.apply(DashboardEvent::IdeaAdded(Box::new(idea("7", "DE"))));

    let duplicated = workflow
        .duplicate_and_generate(&IdeaId::from("7"))
        .await
        .unwrap();
    assert_eq!(duplicated.idea.id.as_str(), "7-copy");
    assert_eq!(duplicated.summary.received, 3);

    for event in drain(&mut rx) {
        dashboard.apply(event);
    }
    match dashboard.queue() {
        QueueView::Batches(batches) => {
            assert_eq!(batches.len(), 1);
            assert_eq!(batches[0].key().to_string(), "7-copy_gen1");
            assert!(batches[0].is_complete(&AspectRatio::ALL));
            // Region inherited from the idea row.
            assert!(
                batches[0]
                    .creatives()
                    .iter()
                    .all(|c| c.region.as_ref().map(|r| r.as_str()) == Some("DE"))
            );
        }
        other => panic!("expected batches, got {:?}", other),
    }
}

#[tokio::test]
async fn second_duplicate_click_only_clears_mark() {
    let (workflow, _rx) = Workflow::new(
        Arc::new(ScriptedBackend::new()),
        WorkflowConfig::default().without_floors(),
    );
    let batch = BatchKey::new(IdeaId::from("7"), 1);

    let first = workflow.toggle_duplicate(&batch).await.unwrap();
    assert!(matches!(first, DuplicateToggle::Created(_)));
    assert!(workflow.rows().row_actions(&batch).duplicate_active());
    assert!(!workflow.rows().row_actions(&batch).regenerate_visible());

    let err = workflow.regenerate_row(&batch).await.unwrap_err();
    assert!(matches!(workflow_kind(&err), WorkflowErrorKind::Unavailable { .. }));

    let second = workflow.toggle_duplicate(&batch).await.unwrap();
    assert_eq!(second, DuplicateToggle::Cleared);
    assert_eq!(workflow.backend().calls("duplicate_idea"), 1);
    assert!(workflow.rows().row_actions(&batch).regenerate());
}

#[tokio::test(start_paused = true)]
async fn busy_row_refuses_overlapping_mutations() {
    let (workflow, _rx) = workflow(ScriptedBackend::new().with_latency(Duration::from_millis(50)));
    let batch_key = BatchKey::new(IdeaId::from("7"), 1);
    let mut dashboard = Dashboard::new();
    dashboard.apply(DashboardEvent::CreativesLoaded(vec![
        creative("101", "7", AspectRatio::Landscape, "DE"),
        creative("102", "7", AspectRatio::Portrait, "DE"),
    ]));
    let batch = match dashboard.queue() {
        QueueView::Batches(batches) => batches[0].clone(),
        other => panic!("expected batches, got {:?}", other),
    };

    let (regenerated, deleted, duplicated) = tokio::join!(
        workflow.regenerate_row(&batch_key),
        workflow.delete_batch(&batch),
        workflow.toggle_duplicate(&batch_key),
    );

    assert!(regenerated.is_ok());
    for err in [deleted.unwrap_err(), duplicated.unwrap_err()] {
        assert!(matches!(workflow_kind(&err), WorkflowErrorKind::RowBusy(_)));
    }
    assert_eq!(workflow.backend().calls("delete_creative"), 0);
    assert_eq!(workflow.backend().calls("duplicate_idea"), 0);
    assert!(workflow.rows().row_actions(&batch_key).delete());
}

#[tokio::test]
async fn grouped_delete_reports_partial_failure() {
    let backend = ScriptedBackend {
        failing_deletes: [CreativeId::from("102")].into_iter().collect(),
        ..ScriptedBackend::new()
    };
    let (workflow, mut rx) = workflow(backend);
    let mut dashboard = Dashboard::new();
    dashboard.apply(DashboardEvent::CreativesLoaded(vec![
        creative("101", "7", AspectRatio::Landscape, "DE"),
        creative("102", "7", AspectRatio::Portrait, "DE"),
        creative("103", "7", AspectRatio::Square, "DE"),
    ]));
    let batch = match dashboard.queue() {
        QueueView::Batches(batches) => batches[0].clone(),
        other => panic!("expected batches, got {:?}", other),
    };

    let err = workflow.delete_batch(&batch).await.unwrap_err();
    assert!(matches!(
        workflow_kind(&err),
        WorkflowErrorKind::PartialDelete { failed: 1, total: 3, .. }
    ));
    assert_eq!(workflow.backend().calls("delete_creative"), 3);

    for event in drain(&mut rx) {
        dashboard.apply(event);
    }
    let remaining: Vec<_> = dashboard.creatives().iter().map(|c| c.id.to_string()).collect();
    assert_eq!(remaining, vec!["102"]);
    assert_eq!(dashboard.drain_notices().len(), 1);
}

#[tokio::test]
async fn single_creative_delete_removes_only_that_card() {
    let backend = ScriptedBackend {
        failing_deletes: [CreativeId::from("103")].into_iter().collect(),
        ..ScriptedBackend::new()
    };
    let (workflow, mut rx) = workflow(backend);
    let mut dashboard = Dashboard::new();
    dashboard.apply(DashboardEvent::CreativesLoaded(vec![
        creative("101", "7", AspectRatio::Landscape, "DE"),
        creative("103", "7", AspectRatio::Square, "DE"),
    ]));

    workflow.delete_creative(&CreativeId::from("101")).await.unwrap();
    assert!(workflow.delete_creative(&CreativeId::from("103")).await.is_err());
    assert_eq!(
        workflow.rows().status(&RowKey::Creative(CreativeId::from("101"))),
        RowStatus::Idle
    );

    for event in drain(&mut rx) {
        dashboard.apply(event);
    }
    let remaining: Vec<_> = dashboard.creatives().iter().map(|c| c.id.to_string()).collect();
    assert_eq!(remaining, vec!["103"]);
    assert_eq!(dashboard.drain_notices().len(), 1);
}

#[tokio::test]
async fn us_creative_deploys_after_creative_approval() {
    let (workflow, mut rx) = workflow(ScriptedBackend::new());
    let mut dashboard = Dashboard::new();
    let mut card = creative("101", "7", AspectRatio::Landscape, "US");
    dashboard.apply(DashboardEvent::CreativesLoaded(vec![card.clone()]));

    assert!(!workflow.actions_for(&card).regional_visible());
    let approval = workflow.approve_creative(&card).await.unwrap();
    assert!(approval.creative_approved);
    card = card.with_approval(approval);
    assert!(workflow.actions_for(&card).deploy());

    let deployment = workflow.deploy(&card, Platform::TikTok).await.unwrap();
    assert!(deployment.approval.deployed);
    assert_eq!(deployment.platform, Platform::TikTok);

    for event in drain(&mut rx) {
        dashboard.apply(event);
    }
    let stored = dashboard.creative(&CreativeId::from("101")).unwrap();
    assert!(stored.approval.deployed);
    assert_eq!(dashboard.deployed_to(&stored.id), Some(Platform::TikTok));
    assert!(!workflow.actions_for(stored).approve_creative());
}

#[tokio::test]
async fn non_us_deploy_is_refused_without_a_request() {
    let (workflow, mut rx) = workflow(ScriptedBackend::new());
    let card = creative("101", "7", AspectRatio::Landscape, "DE")
        .with_approval(Approval::with_flags(true, false, false));

    let err = workflow.deploy(&card, Platform::Instagram).await.unwrap_err();
    assert!(matches!(err.kind(), AtelierErrorKind::Approval(_)));
    assert_eq!(workflow.backend().calls("deploy"), 0);
    assert!(matches!(
        drain(&mut rx).as_slice(),
        [DashboardEvent::Notice(notice)] if notice.action == "deploy"
    ));

    let regional = workflow.approve_regional(&card).await.unwrap();
    assert!(regional.regional_approved);
}

#[tokio::test]
async fn regional_approval_is_refused_for_us() {
    let (workflow, _rx) = workflow(ScriptedBackend::new());
    let card = creative("101", "7", AspectRatio::Landscape, "US");
    assert!(workflow.approve_regional(&card).await.is_err());
    assert_eq!(workflow.backend().calls("approve_regional"), 0);
}

#[tokio::test]
async fn sign_offs_call_only_their_own_route() {
    let (workflow, mut rx) = workflow(ScriptedBackend::new());
    let card = creative("101", "7", AspectRatio::Landscape, "DE");

    workflow.approve_creative(&card).await.unwrap();
    let approval = workflow.approve_regional(&card).await.unwrap();
    let signed = card.with_approval(approval);
    workflow.deploy(&signed, Platform::Instagram).await.unwrap();

    for route in ["approve_creative", "approve_regional", "deploy"] {
        assert_eq!(workflow.backend().calls(route), 1, "{}", route);
    }
    assert_eq!(workflow.backend().calls("regenerate_creative"), 0);
    assert!(
        drain(&mut rx)
            .iter()
            .all(|e| !matches!(e, DashboardEvent::CreativeReplaced { .. }))
    );
}

#[tokio::test]
async fn regenerated_creative_starts_as_draft() {
    let (workflow, mut rx) = workflow(ScriptedBackend::new());
    let card = creative("103", "7", AspectRatio::Square, "DE")
        .with_approval(Approval::with_flags(true, true, true));

    let replaced = workflow.regenerate_creative(&card).await.unwrap();
    assert_eq!(replaced.approval, Approval::draft());
    assert_eq!(replaced.region.as_ref().map(|r| r.as_str()), Some("DE"));
    assert!(replaced.file_path.ends_with("103-v2.png"));

    let events = drain(&mut rx);
    assert!(matches!(
        events.as_slice(),
        [DashboardEvent::CreativeReplaced { old, creative }]
            if old == &card.id && creative.approval == Approval::draft()
    ));
}

#[tokio::test]
async fn brief_execution_fills_placeholders() {
    let backend = ScriptedBackend {
        brief_events: brief_events(),
        ..ScriptedBackend::new()
    };
    let (workflow, mut rx) = workflow(backend);
    let outcome = workflow.execute_brief(&BriefId::from("b1")).await.unwrap();
    assert_eq!(outcome.ideas.len(), 1);
    assert_eq!(outcome.failed, 1);

    let mut dashboard = Dashboard::new();
    for event in drain(&mut rx) {
        dashboard.apply(event);
    }
    let rows = dashboard.ideas();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id.as_str(), "11");
    assert!(rows[0].is_actionable());
    assert!(rows[1].has_error);
    assert!(!rows[1].is_actionable());
    assert_eq!(rows[1].content.as_deref(), Some("rate limited"));
}

#[tokio::test]
async fn settings_round_trip_through_backend() {
    let (workflow, _rx) = workflow(ScriptedBackend::new());
    let mut settings = workflow.load_settings().await.unwrap();
    settings.llm.api_key = Some("sk-test".to_string());
    let stored = workflow.save_settings(&settings).await.unwrap();
    assert_eq!(stored, settings);
    assert_eq!(workflow.backend().calls("save_settings"), 1);
}

#[tokio::test]
async fn late_events_after_dashboard_is_gone_are_dropped() {
    let (workflow, rx) = Workflow::new(
        Arc::new(ScriptedBackend::new()),
        WorkflowConfig::default().without_floors(),
    );
    drop(rx);
    let summary = workflow.generate_for_idea(&IdeaId::from("7")).await.unwrap();
    assert_eq!(summary.received, 3);
}

#[tokio::test]
async fn partial_batch_still_completes() {
    let backend = ScriptedBackend {
        failing_ratios: [AspectRatio::Portrait].into_iter().collect(),
        ..ScriptedBackend::new()
    };
    let (workflow, mut rx) = Workflow::new(
        Arc::new(backend),
        WorkflowConfig::default().without_floors(),
    );
    let summary = workflow.generate_for_idea(&IdeaId::from("7")).await.unwrap();
    assert_eq!(summary.received, 2);
    assert!(summary.is_partial());

    let mut dashboard = Dashboard::new();
    for event in drain(&mut rx) {
        dashboard.apply(event);
    }
    assert_eq!(
        dashboard.summary(&IdeaId::from("7")).map(|s| s.failed.len()),
        Some(1)
    );
    match dashboard.queue() {
        QueueView::Batches(batches) => {
            assert_eq!(batches[0].missing(&AspectRatio::ALL), vec![AspectRatio::Portrait]);
        }
        other => panic!("expected batches, got {:?}", other),
    }
}
