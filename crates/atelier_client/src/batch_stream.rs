//! Typed events of a streamed batch generation.
//!
//! A batch request expects one creative per aspect ratio. The backend
//! reports per-ratio progress, delivers each creative as soon as it is
//! rendered, and reports per-ratio failures without aborting the rest of
//! the batch. [`decode_batch_stream`] turns the raw body into a lazy,
//! finite sequence of [`BatchUpdate`]s that always ends with exactly one
//! [`BatchUpdate::Completed`] unless the transport itself breaks.

use crate::{Frame, FrameDecoder};
use atelier_core::{AspectRatio, Creative};
use atelier_error::{ClientError, ClientErrorKind, JsonError};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Progress report for one aspect ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Ratio currently being rendered
    pub aspect_ratio: AspectRatio,
    /// One-based position within the batch
    #[serde(alias = "current")]
    pub index: usize,
    /// Number of ratios in the batch
    pub total: usize,
}

/// A ratio that failed to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioFailure {
    /// Failed ratio, when the backend names it
    #[serde(default)]
    pub aspect_ratio: Option<AspectRatio>,
    /// Backend message
    #[serde(alias = "error", default)]
    pub message: String,
}

/// Outcome of a finished batch stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Creatives delivered
    pub received: usize,
    /// Creatives requested
    pub expected: usize,
    /// Ratios reported as failed
    pub failed: Vec<RatioFailure>,
}

impl BatchSummary {
    /// Empty summary for a batch of `expected` creatives.
    pub fn new(expected: usize) -> Self {
        Self {
            received: 0,
            expected,
            failed: Vec::new(),
        }
    }

    /// Fewer creatives arrived than were requested.
    pub fn is_partial(&self) -> bool {
        self.received < self.expected
    }
}

/// One decoded frame of a batch stream.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// `progress`
    Progress(Progress),
    /// `creative`
    Creative(Box<Creative>),
    /// `error`
    Error(RatioFailure),
    /// `complete`
    Complete,
}

impl BatchEvent {
    /// Interpret a frame.
    ///
    /// Returns `Ok(None)` for event types this client does not know, and an
    /// error when a known event carries a payload that does not parse.
    pub fn from_frame(frame: &Frame) -> Result<Option<Self>, JsonError> {
        let event = match frame.event.as_str() {
            "progress" => Self::Progress(parse(&frame.data)?),
            "creative" => Self::Creative(Box::new(parse(&frame.data)?)),
            "error" => Self::Error(parse(&frame.data)?),
            "complete" => Self::Complete,
            other => {
                debug!(event = other, "Ignoring unknown batch event");
                return Ok(None);
            }
        };
        Ok(Some(event))
    }
}

fn parse<T: serde::de::DeserializeOwned>(data: &str) -> Result<T, JsonError> {
    serde_json::from_str(data).map_err(|e| JsonError::new(e.to_string()))
}

/// Item yielded to callers of a batch generation.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchUpdate {
    /// Rendering progress, no creative yet
    Progress(Progress),
    /// A finished creative, yielded as soon as it arrives
    Creative(Box<Creative>),
    /// A ratio failed; the stream continues
    Failed(RatioFailure),
    /// Terminal item
    Completed(BatchSummary),
}

/// Decode a streamed batch body.
///
/// Malformed payloads are skipped. A `complete` event or end of stream
/// finishes the sequence with a [`BatchSummary`]. A transport error is
/// yielded once and ends the sequence without a summary.
pub fn decode_batch_stream<S, B, E>(
    body: S,
    expected: usize,
) -> impl Stream<Item = Result<BatchUpdate, ClientError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    async_stream::stream! {
        let mut decoder = FrameDecoder::new();
        let mut summary = BatchSummary::new(expected);
        let mut body = std::pin::pin!(body);

        'read: while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!(error = %e, "Batch stream broke");
                    yield Err(ClientError::new(ClientErrorKind::Stream(e.to_string())));
                    return;
                }
            };
            decoder.push(chunk.as_ref());

            while let Some(frame) = decoder.next_frame() {
                match BatchEvent::from_frame(&frame) {
                    Ok(Some(BatchEvent::Progress(progress))) => {
                        debug!(aspect_ratio = %progress.aspect_ratio, index = progress.index, total = progress.total, "Batch progress");
                        yield Ok(BatchUpdate::Progress(progress));
                    }
                    Ok(Some(BatchEvent::Creative(creative))) => {
                        summary.received += 1;
                        debug!(creative_id = %creative.id, aspect_ratio = %creative.aspect_ratio, "Creative received");
                        yield Ok(BatchUpdate::Creative(creative));
                    }
                    Ok(Some(BatchEvent::Error(failure))) => {
                        warn!(aspect_ratio = ?failure.aspect_ratio, message = %failure.message, "Aspect ratio failed");
                        summary.failed.push(failure.clone());
                        yield Ok(BatchUpdate::Failed(failure));
                    }
                    Ok(Some(BatchEvent::Complete)) => break 'read,
                    Ok(None) => {}
                    Err(e) => warn!(event = %frame.event, error = %e, "Skipping malformed frame"),
                }
            }
        }

        decoder.finish();
        debug!(received = summary.received, expected = summary.expected, "Batch stream finished");
        yield Ok(BatchUpdate::Completed(summary));
    }
}

/// Present an already-complete creative list as a batch stream.
///
/// Backends that render the whole batch before answering return a JSON
/// array instead of an event stream.
pub fn batch_from_list(
    creatives: Vec<Creative>,
    expected: usize,
) -> impl Stream<Item = Result<BatchUpdate, ClientError>> {
    let summary = BatchSummary {
        received: creatives.len(),
        expected,
        failed: Vec::new(),
    };
    let updates: Vec<_> = creatives
        .into_iter()
        .map(|creative| Ok(BatchUpdate::Creative(Box::new(creative))))
        .chain(std::iter::once(Ok(BatchUpdate::Completed(summary))))
        .collect();
    futures::stream::iter(updates)
}
