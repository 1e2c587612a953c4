//! Brief command handlers.

use super::Session;
use super::commands::BriefCommands;
use atelier::{AtelierResult, BriefId};

/// Handle brief commands.
pub async fn handle_brief_command(session: &Session, cmd: BriefCommands) -> AtelierResult<()> {
    match cmd {
        BriefCommands::Execute { brief_id } => {
            let outcome = session
                .workflow()
                .execute_brief(&BriefId::from(brief_id))
                .await?;
            for idea in &outcome.ideas {
                println!(
                    "{:<8} {:<4} {:<20} {}",
                    idea.id,
                    idea.region,
                    idea.demographic,
                    idea.content.as_deref().unwrap_or_default()
                );
            }
            println!(
                "Generated {} ideas, {} failed",
                outcome.ideas.len(),
                outcome.failed
            );
        }
    }
    Ok(())
}
