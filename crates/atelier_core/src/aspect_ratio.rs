//! Output aspect ratios.

use serde::{Deserialize, Serialize};

/// Aspect ratio of a rendered creative.
///
/// Every generation batch requests one creative per ratio, in the order of
/// [`AspectRatio::ALL`].
///
/// # Examples
///
/// ```
/// use atelier_core::AspectRatio;
///
/// let ratio: AspectRatio = "9:16".parse().unwrap();
/// assert_eq!(ratio, AspectRatio::Portrait);
/// assert_eq!(ratio.to_string(), "9:16");
/// assert_eq!(AspectRatio::ALL.len(), 3);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum AspectRatio {
    /// 16:9 landscape
    #[serde(rename = "16:9")]
    #[strum(serialize = "16:9")]
    Landscape,
    /// 9:16 portrait (stories, reels)
    #[serde(rename = "9:16")]
    #[strum(serialize = "9:16")]
    Portrait,
    /// 1:1 square feed post
    #[serde(rename = "1:1")]
    #[strum(serialize = "1:1")]
    Square,
}

impl AspectRatio {
    /// Canonical generation order.
    pub const ALL: [AspectRatio; 3] = [
        AspectRatio::Landscape,
        AspectRatio::Portrait,
        AspectRatio::Square,
    ];

    /// Number of creatives a complete batch contains.
    pub const COUNT: usize = Self::ALL.len();
}
