//! Publishing targets.

use serde::{Deserialize, Serialize};

/// Social platform a deployed creative is published to.
///
/// The selection is made client-side and is not sent with the deploy request.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Platform {
    /// Instagram
    #[default]
    Instagram,
    /// TikTok
    #[strum(serialize = "TikTok")]
    TikTok,
    /// Facebook
    Facebook,
    /// Signal
    Signal,
}

impl Platform {
    /// Key prefix used for stored platform credentials.
    pub fn settings_prefix(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::TikTok => "tiktok",
            Platform::Facebook => "facebook",
            Platform::Signal => "signal",
        }
    }
}
