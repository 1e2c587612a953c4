//! Workflow controller for the Atelier dashboard.
//!
//! Drives row-level operations (regenerate in place, duplicate and
//! generate, grouped delete) and per-creative approval actions against a
//! [`atelier_client::CreativeBackend`]. Rows that show a spinner stay busy
//! for a minimum floor, overlapping mutations on one row are refused, and
//! every confirmed change is emitted as a [`DashboardEvent`] for the
//! single [`Dashboard`] reducer to apply.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod busy;
mod config;
mod controller;
mod dashboard;
mod events;
mod rows;

pub use busy::with_min_duration;
pub use config::{WorkflowConfig, WorkflowConfigBuilder};
pub use controller::{BriefOutcome, Deployment, DuplicateToggle, Duplicated, Workflow};
pub use dashboard::{Dashboard, QueueView};
pub use events::{DashboardEvent, UserNotice};
pub use rows::{RowActions, RowActivity, RowGuard, RowKey, RowRegistry, RowStatus};
