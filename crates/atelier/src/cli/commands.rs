//! CLI command definitions.

use atelier_client::CreativeStatus;
use atelier_core::Platform;
use clap::{Parser, Subcommand, ValueEnum};

/// Atelier - creative generation and approval orchestration
#[derive(Parser, Debug)]
#[command(name = "atelier")]
#[command(about = "Generate, review and deploy ad creatives against an Atelier backend", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the approval queue grouped into generation batches
    Queue {
        /// Only show creatives with this status
        #[arg(long)]
        status: Option<StatusFilter>,

        /// Print the grouped queue as JSON
        #[arg(long)]
        json: bool,
    },

    /// Idea row commands
    #[command(subcommand)]
    Idea(IdeaCommands),

    /// Creative card commands
    #[command(subcommand)]
    Creative(CreativeCommands),

    /// Generation batch commands
    #[command(subcommand)]
    Batch(BatchCommands),

    /// Brief commands
    #[command(subcommand)]
    Brief(BriefCommands),

    /// Provider settings commands
    #[command(subcommand)]
    Settings(SettingsCommands),
}

/// Approval status filter for the queue
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Missing at least one sign-off
    Pending,
    /// Signed off, not deployed
    Approved,
    /// Published
    Deployed,
}

impl From<StatusFilter> for CreativeStatus {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Pending => CreativeStatus::Pending,
            StatusFilter::Approved => CreativeStatus::Approved,
            StatusFilter::Deployed => CreativeStatus::Deployed,
        }
    }
}

/// Idea row subcommands
#[derive(Subcommand, Debug)]
pub enum IdeaCommands {
    /// Replace the idea text in place
    Regenerate {
        /// Idea ID
        id: String,
    },

    /// Copy the idea and generate a batch of creatives for the copy
    Duplicate {
        /// Idea ID
        id: String,
    },

    /// Generate a batch of creatives for the idea
    Generate {
        /// Idea ID
        id: String,
    },

    /// Delete the idea and its creatives
    Delete {
        /// Idea ID
        id: String,
    },
}

/// Creative card subcommands
#[derive(Subcommand, Debug)]
pub enum CreativeCommands {
    /// Toggle creative sign-off
    Approve {
        /// Creative ID
        id: String,
    },

    /// Toggle regional sign-off (not applicable to US creatives)
    ApproveRegional {
        /// Creative ID
        id: String,
    },

    /// Publish an approved creative
    Deploy {
        /// Creative ID
        id: String,

        /// Target platform (defaults to deploy.platform from the configuration)
        #[arg(long)]
        platform: Option<Platform>,
    },

    /// Re-render the creative; approval starts over
    Regenerate {
        /// Creative ID
        id: String,
    },

    /// Delete the creative
    Delete {
        /// Creative ID
        id: String,
    },
}

/// Generation batch subcommands
#[derive(Subcommand, Debug)]
pub enum BatchCommands {
    /// Delete every creative of a batch
    Delete {
        /// Idea ID of the batch
        idea_id: String,

        /// Generation count of the batch
        generation: u32,
    },

    /// Generate a fresh batch for the batch's idea
    Regenerate {
        /// Idea ID of the batch
        idea_id: String,

        /// Generation count of the batch
        generation: u32,
    },
}

/// Brief subcommands
#[derive(Subcommand, Debug)]
pub enum BriefCommands {
    /// Generate one idea per region and demographic of the brief
    Execute {
        /// Brief ID
        brief_id: String,
    },
}

/// Provider settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Print stored provider settings with secrets masked
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_batch_key_arguments() {
        let cli = Cli::try_parse_from(["atelier", "batch", "delete", "7", "2"]).unwrap();
        match cli.command {
            Commands::Batch(BatchCommands::Delete {
                idea_id,
                generation,
            }) => {
                assert_eq!(idea_id, "7");
                assert_eq!(generation, 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn deploy_platform_is_case_insensitive() {
        let cli = Cli::try_parse_from([
            "atelier", "creative", "deploy", "101", "--platform", "tiktok",
        ])
        .unwrap();
        match cli.command {
            Commands::Creative(CreativeCommands::Deploy { id, platform }) => {
                assert_eq!(id, "101");
                assert_eq!(platform, Some(Platform::TikTok));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["atelier", "queue", "--json", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Queue { json: true, .. }));
    }

    #[test]
    fn queue_status_filter_maps_to_query_status() {
        let cli = Cli::try_parse_from(["atelier", "queue", "--status", "approved"]).unwrap();
        match cli.command {
            Commands::Queue { status, json } => {
                assert!(!json);
                assert_eq!(status.map(CreativeStatus::from), Some(CreativeStatus::Approved));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn unknown_platform_is_rejected() {
        assert!(
            Cli::try_parse_from(["atelier", "creative", "deploy", "101", "--platform", "myspace"])
                .is_err()
        );
    }
}
