//! Top-level error wrapper types.

use crate::{ApprovalError, ClientError, ConfigError, GroupingError, JsonError, WorkflowError};

/// Every error condition surfaced by the Atelier crates.
///
/// # Examples
///
/// ```
/// use atelier_error::{AtelierError, ClientError, ClientErrorKind};
///
/// let client_err = ClientError::new(ClientErrorKind::Http("connection refused".to_string()));
/// let err: AtelierError = client_err.into();
/// assert!(err.user_message().contains("connection refused"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum AtelierErrorKind {
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Backend client error
    #[from(ClientError)]
    Client(ClientError),
    /// Approval gate refused the action
    #[from(ApprovalError)]
    Approval(ApprovalError),
    /// Creatives could not be grouped
    #[from(GroupingError)]
    Grouping(GroupingError),
    /// Row workflow failure
    #[from(WorkflowError)]
    Workflow(WorkflowError),
}

/// Atelier error with kind discrimination.
///
/// # Examples
///
/// ```
/// use atelier_error::{AtelierResult, ConfigError};
///
/// fn might_fail() -> AtelierResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Atelier Error: {}", _0)]
pub struct AtelierError(Box<AtelierErrorKind>);

impl AtelierError {
    /// Create a new error from a kind.
    pub fn new(kind: AtelierErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &AtelierErrorKind {
        &self.0
    }

    /// Short message for a blocking user notification.
    ///
    /// Backend rejections show the backend's own detail text; everything
    /// else falls back to the kind's display form.
    pub fn user_message(&self) -> String {
        match self.kind() {
            AtelierErrorKind::Client(e) => e.user_message(),
            AtelierErrorKind::Approval(e) => e.kind.to_string(),
            AtelierErrorKind::Workflow(e) => e.kind.to_string(),
            AtelierErrorKind::Grouping(e) => e.kind.to_string(),
            AtelierErrorKind::Json(e) => e.message.clone(),
            AtelierErrorKind::Config(e) => e.message.clone(),
        }
    }
}

// Generic From implementation for any type that converts to AtelierErrorKind
impl<T> From<T> for AtelierError
where
    T: Into<AtelierErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Atelier operations.
pub type AtelierResult<T> = std::result::Result<T, AtelierError>;
