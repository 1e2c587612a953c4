//! Atelier CLI binary.
//!
//! This binary provides command-line access to the creative backend:
//! - Show the approval queue grouped into generation batches
//! - Regenerate, duplicate, generate and delete idea rows
//! - Approve, deploy and regenerate creatives
//! - Execute briefs and inspect provider settings

use atelier::{AtelierConfig, init_logging};
use clap::Parser;
use tracing::debug;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Session, dispatch};

    // Load environment variables from .env file
    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = AtelierConfig::load()?;
    init_logging(&config.logging, cli.verbose)?;

    let session = Session::connect(config)?;
    let outcome = dispatch(&session, cli.command).await;

    // Failed actions surface as notices; print them once the channel drains
    let mut dashboard = session.finish().await;
    let notices = dashboard.drain_notices();
    for notice in &notices {
        eprintln!("{}", notice);
    }

    if let Err(e) = outcome {
        debug!(error = %e, "Command failed");
        if notices.is_empty() {
            eprintln!("Error: {}", e.user_message());
        }
        std::process::exit(1);
    }

    Ok(())
}
