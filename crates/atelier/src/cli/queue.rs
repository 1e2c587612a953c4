//! Approval queue listing.

use super::Session;
use super::commands::StatusFilter;
use atelier::{
    ActionSet, ApprovalAction, ApprovalStage, AtelierResult, Creative, CreativeQuery, Dashboard,
    DashboardEvent, GenerationBatch, JsonError, QueueView,
};
use tracing::warn;

/// Print the grouped approval queue.
pub async fn show_queue(
    session: &Session,
    status: Option<StatusFilter>,
    json: bool,
) -> AtelierResult<()> {
    let mut query = CreativeQuery::default();
    if let Some(status) = status {
        query = query.with_status(status.into());
    }
    let creatives = session.all_creatives(query).await?;

    let mut dashboard = Dashboard::new();
    dashboard.apply(DashboardEvent::CreativesLoaded(creatives));
    let view = dashboard.queue();
    for creative in dashboard.inconsistent() {
        warn!(creative_id = %creative.id, "Deployed without required sign-off");
    }

    if json {
        let text =
            serde_json::to_string_pretty(&view).map_err(|e| JsonError::new(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    match view {
        QueueView::Empty => {
            println!("No creatives yet. Generate ideas and create creatives to see them here.");
        }
        QueueView::Ungroupable { skipped } => {
            println!("Unable to display {} creatives: none names its idea.", skipped);
        }
        QueueView::Batches(batches) => {
            for batch in &batches {
                print_batch(session, batch);
            }
            println!("Total: {} batches", batches.len());
        }
    }
    Ok(())
}

fn print_batch(session: &Session, batch: &GenerationBatch) {
    let expected = session.workflow().config().aspect_ratios();
    println!("{:-<80}", "");
    print!("{}", batch.key());
    if let Some(brand) = batch.brand() {
        print!("  Brand: {}", brand);
    }
    if let Some(product) = batch.product_name() {
        print!("  Product: {}", product);
    }
    if batch.generation() > 1 {
        print!("  Generation: {}", batch.generation());
    }
    println!("  ({}/{})", batch.len(), expected.len());

    for creative in batch.creatives() {
        print_creative(session, creative);
    }
    let missing = batch.missing(expected);
    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
        println!("  missing: {}", names.join(", "));
    }
}

fn print_creative(session: &Session, creative: &Creative) {
    let stage = ApprovalStage::of(&creative.approval, creative.requires_regional_approval());
    let actions = session.workflow().actions_for(creative);
    let region = creative
        .region
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {:<8} {:<5} {:<4} {:<16} {}",
        creative.id,
        creative.aspect_ratio,
        region,
        stage,
        enabled_actions(&actions).join(", ")
    );
}

fn enabled_actions(actions: &ActionSet) -> Vec<&'static str> {
    [
        (ApprovalAction::ApproveCreative, "approve"),
        (ApprovalAction::ApproveRegional, "approve-regional"),
        (ApprovalAction::Deploy, "deploy"),
        (ApprovalAction::Regenerate, "regenerate"),
    ]
    .into_iter()
    .filter(|(action, _)| actions.allows(*action))
    .map(|(_, name)| name)
    .collect()
}
