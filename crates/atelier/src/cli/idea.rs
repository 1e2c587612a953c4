//! Idea row command handlers.

use super::Session;
use super::commands::IdeaCommands;
use atelier::{AtelierResult, BatchSummary, IdeaId};

/// Handle idea row commands.
pub async fn handle_idea_command(session: &Session, cmd: IdeaCommands) -> AtelierResult<()> {
    let workflow = session.workflow();
    match cmd {
        IdeaCommands::Regenerate { id } => {
            let idea = workflow.regenerate_idea(&IdeaId::from(id)).await?;
            println!(
                "Idea {} regenerated (generation {})",
                idea.id, idea.generation_count
            );
            if let Some(content) = &idea.content {
                println!("{}", content);
            }
        }

        IdeaCommands::Duplicate { id } => {
            let duplicated = workflow.duplicate_and_generate(&IdeaId::from(id)).await?;
            println!("Duplicate idea {} created", duplicated.idea.id);
            print_summary(&duplicated.summary);
        }

        IdeaCommands::Generate { id } => {
            let summary = workflow.generate_for_idea(&IdeaId::from(id)).await?;
            print_summary(&summary);
        }

        IdeaCommands::Delete { id } => {
            let id = IdeaId::from(id);
            workflow.delete_idea(&id).await?;
            println!("Idea {} deleted", id);
        }
    }
    Ok(())
}

/// Print the outcome of a generation batch.
pub fn print_summary(summary: &BatchSummary) {
    println!(
        "Generated {} of {} creatives",
        summary.received, summary.expected
    );
    for failure in &summary.failed {
        match &failure.aspect_ratio {
            Some(ratio) => println!("  {} failed: {}", ratio, failure.message),
            None => println!("  failed: {}", failure.message),
        }
    }
}
