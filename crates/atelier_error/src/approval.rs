//! Approval gate errors.

/// Reasons an approval action is refused before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ApprovalErrorKind {
    /// The creative is deployed; every approval action is closed.
    #[display("Creative {} is already deployed", _0)]
    AlreadyDeployed(String),

    /// Regional approval only exists outside the exempt region.
    #[display("Creative {} targets {}, which has no regional sign-off", creative_id, region)]
    RegionalNotApplicable {
        /// Creative identifier
        creative_id: String,
        /// Region of the creative
        region: String,
    },

    /// Deployment gate not satisfied.
    #[display("Creative {} cannot be deployed: {}", creative_id, reason)]
    DeployNotPermitted {
        /// Creative identifier
        creative_id: String,
        /// Missing sign-off
        reason: String,
    },
}

/// Approval error with location tracking.
///
/// # Examples
///
/// ```
/// use atelier_error::{ApprovalError, ApprovalErrorKind};
///
/// let err = ApprovalError::new(ApprovalErrorKind::AlreadyDeployed("101".into()));
/// assert!(format!("{}", err).contains("already deployed"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Approval Error: {} at line {} in {}", kind, line, file)]
pub struct ApprovalError {
    /// The specific error condition
    pub kind: ApprovalErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ApprovalError {
    /// Create a new ApprovalError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ApprovalErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
