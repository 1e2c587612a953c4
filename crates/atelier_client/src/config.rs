//! Configuration for the creative backend connection

use atelier_error::{ClientError, ClientErrorKind};

/// Backend URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8002";

/// Configuration for the creative backend connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_builder::Builder)]
#[builder(
    setter(into),
    build_fn(private, name = "build_internal", validate = "Self::validate")
)]
pub struct ClientConfig {
    /// Base URL of the backend (e.g., "http://localhost:8002")
    #[builder(default = "DEFAULT_BASE_URL.to_string()")]
    pub base_url: String,
    /// Optional bearer token
    #[builder(default, setter(strip_option))]
    pub api_key: Option<String>,
}

impl ClientConfigBuilder {
    /// Build the ClientConfig.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is not http(s).
    pub fn build(&self) -> Result<ClientConfig, ClientError> {
        self.build_internal()
            .map(|config| ClientConfig {
                base_url: normalize(config.base_url),
                ..config
            })
            .map_err(|e| ClientError::new(ClientErrorKind::Configuration(e.to_string())))
    }

    fn validate(&self) -> Result<(), String> {
        match &self.base_url {
            Some(url) if !is_http_url(url) => Err(format!("Invalid backend URL: {}", url)),
            _ => Ok(()),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    /// Create a new configuration for the given backend URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize(base_url.into()),
            api_key: None,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Absolute URL for a backend path such as `/ideas/7/duplicate`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn normalize(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_without_double_slashes() {
        let config = ClientConfig::new("http://backend:8002/");
        assert_eq!(config.url("/ideas/7/regenerate"), "http://backend:8002/ideas/7/regenerate");
        assert_eq!(config.url("settings"), "http://backend:8002/settings");
    }

    #[test]
    fn builder_rejects_non_http_url() {
        let err = ClientConfigBuilder::default()
            .base_url("ftp://backend")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Invalid backend URL"));
    }

    #[test]
    fn builder_defaults() {
        let config = ClientConfigBuilder::default()
            .api_key("secret")
            .build()
            .unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
    }
}
