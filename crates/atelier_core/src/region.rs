//! Target regions.

use serde::{Deserialize, Serialize};

/// Market region an idea targets (e.g. "US", "DE", "JP").
///
/// The exempt region skips the regional sign-off stage entirely.
///
/// # Examples
///
/// ```
/// use atelier_core::Region;
///
/// assert!(!Region::new("US").requires_regional_approval());
/// assert!(Region::new("DE").requires_regional_approval());
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct Region(String);

impl Region {
    /// Region exempt from regional approval.
    pub const EXEMPT: &'static str = "US";

    /// Wrap a region code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Region code as sent by the backend.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether deployment additionally needs regional sign-off.
    pub fn requires_regional_approval(&self) -> bool {
        self.0 != Self::EXEMPT
    }
}

impl From<&str> for Region {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}
