//! Streamed idea generation for a brief.
//!
//! Every frame carries a single `data:` line whose JSON object names its
//! own type. One idea is produced per (region, demographic) pair; a failed
//! pair is reported and the stream moves on.

use crate::FrameDecoder;
use atelier_core::{Idea, Region};
use atelier_error::{ClientError, ClientErrorKind};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One event of a brief execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IdeaStreamEvent {
    /// Targets about to be generated
    Init {
        /// Regions of the brief
        regions: Vec<Region>,
        /// Demographics of the brief
        demographics: Vec<String>,
        /// Number of ideas that will be attempted
        total: usize,
    },
    /// A persisted idea
    Idea(Box<Idea>),
    /// Generation failed for one target
    Error {
        /// Target region
        region: Region,
        /// Target demographic
        demographic: String,
        /// Backend message
        error: String,
    },
    /// All targets attempted
    Complete,
    /// The whole execution failed
    FatalError {
        /// Backend message
        error: String,
    },
}

impl IdeaStreamEvent {
    /// Ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::FatalError { .. })
    }
}

/// Decode a brief execution body into typed events.
///
/// Malformed frames are skipped. The sequence ends after `complete`,
/// `fatal_error`, or end of stream.
pub fn decode_idea_stream<S, B, E>(body: S) -> impl Stream<Item = Result<IdeaStreamEvent, ClientError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    async_stream::stream! {
        let mut decoder = FrameDecoder::new();
        let mut body = std::pin::pin!(body);

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!(error = %e, "Idea stream broke");
                    yield Err(ClientError::new(ClientErrorKind::Stream(e.to_string())));
                    return;
                }
            };
            decoder.push(chunk.as_ref());

            while let Some(frame) = decoder.next_frame() {
                match serde_json::from_str::<IdeaStreamEvent>(&frame.data) {
                    Ok(event) => {
                        let terminal = event.is_terminal();
                        debug!(?terminal, "Idea stream event");
                        yield Ok(event);
                        if terminal {
                            return;
                        }
                    }
                    Err(e) => warn!(error = %e, "Skipping malformed idea frame"),
                }
            }
        }
        decoder.finish();
    }
}
