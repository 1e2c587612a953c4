//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the atelier binary.

mod batch;
mod brief;
mod commands;
mod creative;
mod idea;
mod queue;
mod session;
mod settings;

pub use batch::handle_batch_command;
pub use brief::handle_brief_command;
pub use commands::{Cli, Commands};
pub use creative::handle_creative_command;
pub use idea::handle_idea_command;
pub use queue::show_queue;
pub use session::Session;
pub use settings::handle_settings_command;

use atelier::AtelierResult;

/// Run one command against an open session.
pub async fn dispatch(session: &Session, command: Commands) -> AtelierResult<()> {
    match command {
        Commands::Queue { status, json } => show_queue(session, status, json).await,
        Commands::Idea(cmd) => handle_idea_command(session, cmd).await,
        Commands::Creative(cmd) => handle_creative_command(session, cmd).await,
        Commands::Batch(cmd) => handle_batch_command(session, cmd).await,
        Commands::Brief(cmd) => handle_brief_command(session, cmd).await,
        Commands::Settings(cmd) => handle_settings_command(session, cmd).await,
    }
}
