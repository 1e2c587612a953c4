//! Error types for backend client operations.

/// Error kinds for backend client operations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum ClientErrorKind {
    /// The request never produced a response.
    #[display("HTTP request failed: {}", _0)]
    Http(String),

    /// The backend answered with a non-success status.
    #[display("API error ({}): {}", status, detail)]
    Api {
        /// HTTP status code
        status: u16,
        /// Human-readable detail extracted from the response body
        detail: String,
    },

    /// The response body could not be decoded.
    #[display("Failed to deserialize response: {}", _0)]
    Deserialization(String),

    /// The event stream broke mid-read.
    #[display("Stream error: {}", _0)]
    Stream(String),

    /// The client is misconfigured.
    #[display("Configuration error: {}", _0)]
    Configuration(String),
}

/// Error wrapper with location tracking.
///
/// # Examples
///
/// ```
/// use atelier_error::{ClientError, ClientErrorKind};
///
/// let err = ClientError::new(ClientErrorKind::Api {
///     status: 404,
///     detail: "Idea not found".into(),
/// });
/// assert_eq!(err.status(), Some(404));
/// assert!(!err.is_transport());
/// assert_eq!(err.user_message(), "Idea not found");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Client Error: {} at line {} in {}", kind, line, file)]
pub struct ClientError {
    /// The error kind
    pub kind: ClientErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl ClientError {
    /// Create a new ClientError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ClientErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// True when no response was received at all.
    pub fn is_transport(&self) -> bool {
        matches!(
            self.kind,
            ClientErrorKind::Http(_) | ClientErrorKind::Stream(_)
        )
    }

    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ClientErrorKind::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match &self.kind {
            ClientErrorKind::Api { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}
