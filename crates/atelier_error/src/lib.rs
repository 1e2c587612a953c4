//! Error types for the Atelier workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use atelier_error::{AtelierResult, ClientError, ClientErrorKind};
//!
//! fn fetch_idea() -> AtelierResult<String> {
//!     Err(ClientError::new(ClientErrorKind::Http("Connection refused".into())))?
//! }
//!
//! match fetch_idea() {
//!     Ok(idea) => println!("Got: {}", idea),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod approval;
mod client;
mod config;
mod error;
mod grouping;
mod json;
mod workflow;

pub use approval::{ApprovalError, ApprovalErrorKind};
pub use client::{ClientError, ClientErrorKind};
pub use config::ConfigError;
pub use error::{AtelierError, AtelierErrorKind, AtelierResult};
pub use grouping::{GroupingError, GroupingErrorKind};
pub use json::JsonError;
pub use workflow::{WorkflowError, WorkflowErrorKind};
