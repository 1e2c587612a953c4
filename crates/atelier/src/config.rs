//! Layered configuration for the atelier binary.

use atelier_client::{ClientConfig, ClientConfigBuilder};
use atelier_core::Platform;
use atelier_error::{AtelierError, AtelierResult, ConfigError};
use atelier_workflow::WorkflowConfig;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../atelier.toml");

/// Shorthand variable for the backend URL.
const BACKEND_URL_VAR: &str = "ATELIER_BACKEND_URL";

/// Shorthand variable for the bearer token.
const API_KEY_VAR: &str = "ATELIER_API_KEY";

/// Connection to the creative backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSection {
    /// Base URL of the backend
    pub base_url: String,
    /// Optional bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            base_url: atelier_client::DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Filter used when `RUST_LOG` is unset (e.g. "info", "atelier_client=debug")
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

/// Deploy defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploySection {
    /// Platform shown when `--platform` is not given
    #[serde(default)]
    pub platform: Platform,
}

/// Top-level atelier configuration.
///
/// Sources in order of precedence (later sources override earlier):
/// 1. Bundled defaults (atelier.toml shipped with the crate)
/// 2. `~/.config/atelier/atelier.toml`
/// 3. `./atelier.toml`
/// 4. `ATELIER__<SECTION>__<KEY>` environment variables
/// 5. `ATELIER_BACKEND_URL` and `ATELIER_API_KEY`
///
/// # Example
///
/// ```no_run
/// use atelier::AtelierConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AtelierConfig::load()?;
/// println!("Backend: {}", config.backend.base_url);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtelierConfig {
    /// Backend connection
    #[serde(default)]
    pub backend: BackendSection,
    /// Busy floors and batch shape
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingSection,
    /// Deploy defaults
    #[serde(default)]
    pub deploy: DeploySection,
}

impl AtelierConfig {
    /// Load configuration from every layer.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> AtelierResult<Self> {
        debug!("Loading configuration: env > current dir > home dir > bundled defaults");

        let mut builder = defaults();

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/atelier/atelier.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("atelier").required(false))
            .add_source(
                Environment::with_prefix("ATELIER")
                    .separator("__")
                    .try_parsing(true),
            );

        Ok(finish(builder)?.with_backend_env(
            std::env::var(BACKEND_URL_VAR).ok(),
            std::env::var(API_KEY_VAR).ok(),
        ))
    }

    /// Apply the `ATELIER_BACKEND_URL` and `ATELIER_API_KEY` values.
    ///
    /// Unset or empty values leave the loaded setting alone.
    pub fn with_backend_env(mut self, base_url: Option<String>, api_key: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.is_empty()) {
            debug!(base_url = %url, "Backend URL from {}", BACKEND_URL_VAR);
            self.backend.base_url = url;
        }
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            self.backend.api_key = Some(key);
        }
        self
    }

    /// Load bundled defaults overridden by one specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> AtelierResult<Self> {
        debug!("Loading configuration from file");
        finish(defaults().add_source(File::from(path.as_ref())))
    }

    /// Load bundled defaults overridden by inline TOML.
    pub fn from_toml(text: &str) -> AtelierResult<Self> {
        finish(defaults().add_source(File::from_str(text, FileFormat::Toml)))
    }

    /// Client connection settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the backend URL is not http(s).
    pub fn client_config(&self) -> AtelierResult<ClientConfig> {
        let mut builder = ClientConfigBuilder::default();
        builder.base_url(self.backend.base_url.clone());
        if let Some(key) = self.backend.api_key.as_ref().filter(|k| !k.is_empty()) {
            builder.api_key(key.clone());
        }
        Ok(builder.build()?)
    }
}

fn defaults() -> ConfigBuilder<DefaultState> {
    Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
}

fn finish(builder: ConfigBuilder<DefaultState>) -> AtelierResult<AtelierConfig> {
    builder
        .build()
        .map_err(|e| {
            AtelierError::from(ConfigError::new(format!(
                "Failed to build configuration: {}",
                e
            )))
        })?
        .try_deserialize()
        .map_err(|e| {
            AtelierError::from(ConfigError::new(format!(
                "Failed to parse configuration: {}",
                e
            )))
        })
}
