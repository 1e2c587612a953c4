//! Generation batch command handlers.

use super::Session;
use super::commands::BatchCommands;
use super::idea::print_summary;
use atelier::{AtelierResult, BatchKey, IdeaId};

/// Handle generation batch commands.
pub async fn handle_batch_command(session: &Session, cmd: BatchCommands) -> AtelierResult<()> {
    match cmd {
        BatchCommands::Delete {
            idea_id,
            generation,
        } => {
            let key = BatchKey::new(IdeaId::from(idea_id), generation);
            let batch = session.find_batch(&key).await?;
            session.workflow().delete_batch(&batch).await?;
            println!("Deleted {} creatives of {}", batch.len(), key);
        }

        BatchCommands::Regenerate {
            idea_id,
            generation,
        } => {
            let key = BatchKey::new(IdeaId::from(idea_id), generation);
            let summary = session.workflow().regenerate_row(&key).await?;
            print_summary(&summary);
        }
    }
    Ok(())
}
