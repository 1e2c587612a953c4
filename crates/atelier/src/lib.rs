//! Atelier - creative generation and approval orchestration.
//!
//! Atelier drives a creative backend that turns campaign briefs into ideas
//! and ideas into batches of rendered ad creatives (one per aspect ratio).
//! It groups creatives into generation batches for the approval queue,
//! gates deployment behind creative and regional sign-off (US creatives are
//! exempt from the regional step), and runs row-level regenerate, duplicate
//! and delete workflows with minimum busy durations.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use atelier::{AtelierClient, AtelierConfig, Workflow};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AtelierConfig::load()?;
//!     let client = AtelierClient::new(config.client_config()?);
//!     let (workflow, _events) = Workflow::new(Arc::new(client), config.workflow.clone());
//!
//!     let summary = workflow.generate_for_idea(&"7".into()).await?;
//!     println!("{} of {} creatives", summary.received, summary.expected);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `atelier_error` - Error types
//! - `atelier_core` - Ideas, creatives, batch grouping, approval gate
//! - `atelier_client` - Backend HTTP client and streamed response decoding
//! - `atelier_workflow` - Row workflows, busy floors, dashboard state
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod observability;

pub use atelier_client::*;
pub use atelier_core::*;
pub use atelier_error::*;
pub use atelier_workflow::*;

pub use config::{AtelierConfig, BackendSection, DeploySection, LoggingSection};
pub use observability::{init_logging, log_filter};
