//! Creative card command handlers.

use super::Session;
use super::commands::CreativeCommands;
use atelier::{Approval, ApprovalStage, AtelierResult, Creative, CreativeId};

/// Handle creative card commands.
///
/// The creative is fetched first so the approval gate checks its current
/// record before any request is sent.
pub async fn handle_creative_command(session: &Session, cmd: CreativeCommands) -> AtelierResult<()> {
    let workflow = session.workflow();
    match cmd {
        CreativeCommands::Approve { id } => {
            let creative = session.find_creative(&CreativeId::from(id)).await?;
            let approval = workflow.approve_creative(&creative).await?;
            print_stage(&creative, &approval);
        }

        CreativeCommands::ApproveRegional { id } => {
            let creative = session.find_creative(&CreativeId::from(id)).await?;
            let approval = workflow.approve_regional(&creative).await?;
            print_stage(&creative, &approval);
        }

        CreativeCommands::Deploy { id, platform } => {
            let creative = session.find_creative(&CreativeId::from(id)).await?;
            let platform = platform.unwrap_or(session.config().deploy.platform);
            let deployment = workflow.deploy(&creative, platform).await?;
            println!("Creative {} DEPLOYED to {}", creative.id, deployment.platform);
        }

        CreativeCommands::Regenerate { id } => {
            let creative = session.find_creative(&CreativeId::from(id)).await?;
            let replaced = workflow.regenerate_creative(&creative).await?;
            println!(
                "Creative {} regenerated: {}",
                replaced.id,
                replaced.asset_url(&session.config().backend.base_url)
            );
        }

        CreativeCommands::Delete { id } => {
            let id = CreativeId::from(id);
            workflow.delete_creative(&id).await?;
            println!("Creative {} deleted", id);
        }
    }
    Ok(())
}

fn print_stage(creative: &Creative, approval: &Approval) {
    let stage = ApprovalStage::of(approval, creative.requires_regional_approval());
    println!("Creative {}: {}", creative.id, stage);
}
