//! Provider and platform settings.
//!
//! The backend stores settings as a flat string map where the meaning of a
//! key depends on which provider is selected (the API key lives under the
//! provider's display name). [`ProviderSettings`] is the tagged form the rest
//! of the code works with; conversion in both directions is lossless for
//! every key it understands.

use crate::Platform;
use atelier_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use strum::IntoEnumIterator;

const LLM_PROVIDER: &str = "llm_provider";
const USE_LLM: &str = "use_llm";
const IMAGE_PROVIDER: &str = "image_provider";
const USE_IMAGE_MODEL: &str = "use_image_model";
const ADOBE_CLIENT_ID: &str = "adobe_client_id";
const ADOBE_CLIENT_SECRET: &str = "adobe_client_secret";
const ADOBE_ACCESS_TOKEN: &str = "adobe_jwt";
const ADOBE_ORG_ID: &str = "adobe_org_id";

/// Text-generation provider.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum LlmProvider {
    /// OpenAI
    #[default]
    #[strum(serialize = "OpenAI")]
    OpenAi,
    /// Anthropic
    Anthropic,
    /// Google Gemini
    Gemini,
    /// xAI Grok
    Grok,
    /// DeepSeek
    #[strum(serialize = "DeepSeek")]
    DeepSeek,
}

/// Image-generation provider other than Adobe Firefly.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum ImageProvider {
    /// OpenAI image models
    #[strum(serialize = "OpenAI")]
    OpenAi,
    /// DALL-E
    #[strum(serialize = "DALL-E")]
    DallE,
    /// Midjourney
    Midjourney,
    /// Stable Diffusion
    #[strum(serialize = "Stable Diffusion")]
    StableDiffusion,
    /// Freepik
    Freepik,
}

/// Text-generation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Selected provider
    pub provider: LlmProvider,
    /// Key for the selected provider
    pub api_key: Option<String>,
}

/// Image-generation settings, tagged by provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum ImageSettings {
    /// Adobe Firefly with OAuth client credentials
    AdobeFirefly {
        /// OAuth client id
        client_id: String,
        /// OAuth client secret
        client_secret: String,
        /// Pre-issued access token
        access_token: String,
        /// Adobe organisation id
        org_id: String,
        /// Optional API key stored under the provider name
        api_key: Option<String>,
    },
    /// Any key-authenticated provider
    Hosted {
        /// Selected provider
        kind: ImageProvider,
        /// Key for the selected provider
        api_key: Option<String>,
    },
}

impl ImageSettings {
    /// Display name used as the settings key for the provider's API key.
    pub fn provider_name(&self) -> String {
        match self {
            ImageSettings::AdobeFirefly { .. } => ImageSettings::FIREFLY.to_string(),
            ImageSettings::Hosted { kind, .. } => kind.to_string(),
        }
    }

    const FIREFLY: &'static str = "Adobe Firefly";
}

impl Default for ImageSettings {
    fn default() -> Self {
        ImageSettings::AdobeFirefly {
            client_id: String::new(),
            client_secret: String::new(),
            access_token: String::new(),
            org_id: String::new(),
            api_key: None,
        }
    }
}

/// Login for a publishing platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCredentials {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
}

/// Complete, tagged settings record.
///
/// # Examples
///
/// ```
/// use atelier_core::{ImageSettings, Platform, ProviderSettings};
/// use std::collections::BTreeMap;
///
/// let mut flat = BTreeMap::new();
/// flat.insert("use_llm".to_string(), "Anthropic".to_string());
/// flat.insert("Anthropic".to_string(), "sk-test".to_string());
/// flat.insert("use_image_model".to_string(), "Freepik".to_string());
/// flat.insert("tiktok_username".to_string(), "brand".to_string());
///
/// let settings = ProviderSettings::from_flat(&flat).unwrap();
/// assert_eq!(settings.llm.api_key.as_deref(), Some("sk-test"));
/// assert!(matches!(settings.image, ImageSettings::Hosted { .. }));
/// assert!(settings.platforms.contains_key(&Platform::TikTok));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Text generation
    pub llm: LlmSettings,
    /// Image generation
    pub image: ImageSettings,
    /// Publishing accounts
    pub platforms: BTreeMap<Platform, PlatformCredentials>,
}

fn non_empty(flat: &BTreeMap<String, String>, key: &str) -> Option<String> {
    flat.get(key).filter(|v| !v.trim().is_empty()).cloned()
}

fn field(flat: &BTreeMap<String, String>, key: &str) -> String {
    flat.get(key).cloned().unwrap_or_default()
}

impl ProviderSettings {
    /// Decode the backend's flat key-value map.
    ///
    /// `use_*` keys take precedence over `*_provider` keys. Missing
    /// selections fall back to OpenAI and Adobe Firefly.
    pub fn from_flat(flat: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let llm_name = non_empty(flat, USE_LLM).or_else(|| non_empty(flat, LLM_PROVIDER));
        let llm = match llm_name {
            Some(name) => {
                let provider = LlmProvider::from_str(&name).map_err(|_| {
                    ConfigError::new(format!("Unknown LLM provider: {}", name))
                })?;
                LlmSettings {
                    provider,
                    api_key: non_empty(flat, &name),
                }
            }
            None => LlmSettings::default(),
        };

        let image_name = non_empty(flat, USE_IMAGE_MODEL)
            .or_else(|| non_empty(flat, IMAGE_PROVIDER))
            .unwrap_or_else(|| ImageSettings::FIREFLY.to_string());
        let image = if image_name == ImageSettings::FIREFLY {
            ImageSettings::AdobeFirefly {
                client_id: field(flat, ADOBE_CLIENT_ID),
                client_secret: field(flat, ADOBE_CLIENT_SECRET),
                access_token: field(flat, ADOBE_ACCESS_TOKEN),
                org_id: field(flat, ADOBE_ORG_ID),
                api_key: non_empty(flat, &image_name),
            }
        } else {
            let kind = ImageProvider::from_str(&image_name).map_err(|_| {
                ConfigError::new(format!("Unknown image provider: {}", image_name))
            })?;
            ImageSettings::Hosted {
                kind,
                api_key: non_empty(flat, &image_name),
            }
        };

        let mut platforms = BTreeMap::new();
        for platform in Platform::iter() {
            let prefix = platform.settings_prefix();
            let username = flat.get(&format!("{}_username", prefix));
            let password = flat.get(&format!("{}_password", prefix));
            if username.is_some() || password.is_some() {
                platforms.insert(
                    platform,
                    PlatformCredentials {
                        username: username.cloned().unwrap_or_default(),
                        password: password.cloned().unwrap_or_default(),
                    },
                );
            }
        }

        Ok(Self {
            llm,
            image,
            platforms,
        })
    }

    /// Encode into the backend's flat key-value map.
    pub fn to_flat(&self) -> BTreeMap<String, String> {
        let mut flat = BTreeMap::new();
        let llm_name = self.llm.provider.to_string();
        flat.insert(LLM_PROVIDER.to_string(), llm_name.clone());
        flat.insert(USE_LLM.to_string(), llm_name.clone());
        if let Some(key) = self.llm.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            flat.insert(llm_name, key.clone());
        }

        let image_name = self.image.provider_name();
        flat.insert(IMAGE_PROVIDER.to_string(), image_name.clone());
        flat.insert(USE_IMAGE_MODEL.to_string(), image_name.clone());
        let image_key = match &self.image {
            ImageSettings::AdobeFirefly {
                client_id,
                client_secret,
                access_token,
                org_id,
                api_key,
            } => {
                flat.insert(ADOBE_CLIENT_ID.to_string(), client_id.clone());
                flat.insert(ADOBE_CLIENT_SECRET.to_string(), client_secret.clone());
                flat.insert(ADOBE_ACCESS_TOKEN.to_string(), access_token.clone());
                flat.insert(ADOBE_ORG_ID.to_string(), org_id.clone());
                api_key
            }
            ImageSettings::Hosted { api_key, .. } => api_key,
        };
        if let Some(key) = image_key.as_ref().filter(|k| !k.trim().is_empty()) {
            flat.insert(image_name, key.clone());
        }

        for (platform, creds) in &self.platforms {
            let prefix = platform.settings_prefix();
            flat.insert(format!("{}_username", prefix), creds.username.clone());
            flat.insert(format!("{}_password", prefix), creds.password.clone());
        }
        flat
    }

    /// Copy with every secret replaced by a mask, for display.
    pub fn redacted(&self) -> Self {
        fn mask(secret: &str) -> String {
            if secret.is_empty() {
                String::new()
            } else {
                "********".to_string()
            }
        }
        let mut copy = self.clone();
        copy.llm.api_key = copy.llm.api_key.as_deref().map(mask);
        copy.image = match copy.image {
            ImageSettings::AdobeFirefly {
                client_id,
                client_secret,
                access_token,
                org_id,
                api_key,
            } => ImageSettings::AdobeFirefly {
                client_id,
                client_secret: mask(&client_secret),
                access_token: mask(&access_token),
                org_id,
                api_key: api_key.as_deref().map(mask),
            },
            ImageSettings::Hosted { kind, api_key } => ImageSettings::Hosted {
                kind,
                api_key: api_key.as_deref().map(mask),
            },
        };
        for creds in copy.platforms.values_mut() {
            creds.password = mask(&creds.password);
        }
        copy
    }
}
