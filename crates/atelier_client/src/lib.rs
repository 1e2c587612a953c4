//! Client for the Atelier creative backend.
//!
//! The backend generates ideas and creatives and stores approvals. This
//! crate speaks its HTTP API and decodes its two streamed responses:
//! batch generation (one creative per aspect ratio, delivered as each
//! finishes) and brief execution (one idea per target).
//!
//! The [`CreativeBackend`] trait is the seam the workflow controller is
//! written against; [`AtelierClient`] implements it with `reqwest`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod batch_stream;
mod client;
mod config;
mod frame;
mod idea_stream;

pub use backend::{
    BatchStream, ClientResult, CreativeBackend, CreativeQuery, CreativeStatus, IdeaStream,
};
pub use batch_stream::{
    BatchEvent, BatchSummary, BatchUpdate, Progress, RatioFailure, batch_from_list,
    decode_batch_stream,
};
pub use client::{AtelierClient, extract_detail};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
pub use frame::{DEFAULT_EVENT, Frame, FrameDecoder};
pub use idea_stream::{IdeaStreamEvent, decode_idea_stream};
