//! HTTP client for the creative backend.

use crate::{
    BatchStream, ClientConfig, ClientResult, CreativeBackend, CreativeQuery, IdeaStream,
    batch_from_list, decode_batch_stream, decode_idea_stream,
};
use async_trait::async_trait;
use atelier_core::{Approval, AspectRatio, BriefId, Creative, CreativeId, Idea, IdeaId};
use atelier_error::{ClientError, ClientErrorKind};
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use tracing::instrument;

/// Wire envelope of the settings endpoints.
#[derive(Debug, Serialize, Deserialize)]
struct SettingsEnvelope {
    settings: BTreeMap<String, String>,
}

/// HTTP client for the creative backend
#[derive(Debug, Clone)]
pub struct AtelierClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl AtelierClient {
    /// Create a new backend client
    #[instrument(skip(config), fields(base_url = %config.base_url))]
    pub fn new(config: ClientConfig) -> Self {
        tracing::debug!("Creating backend client");
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.url(path);
        tracing::debug!(%method, %url, "Sending request");
        let req = self.client.request(method, url);
        match &self.config.api_key {
            Some(api_key) => req.header("Authorization", format!("Bearer {}", api_key)),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> ClientResult<Response> {
        let response = req.send().await.map_err(|e| {
            tracing::error!("Request failed: {}", e);
            ClientError::new(ClientErrorKind::Http(format!("Request failed: {}", e)))
        })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(api_error(response).await)
        }
    }

    async fn json<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<T> {
        let response = self.send(req).await?;
        response.json().await.map_err(|e| {
            tracing::error!("Failed to parse response: {}", e);
            ClientError::new(ClientErrorKind::Deserialization(format!(
                "Failed to parse response: {}",
                e
            )))
        })
    }
}

/// Build an API error from a rejected response, preferring the body's
/// `detail` message over the bare status.
async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = extract_detail(&body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.to_string()
        } else {
            body.trim().to_string()
        }
    });
    tracing::error!(status = status.as_u16(), %detail, "Backend returned error");
    ClientError::new(ClientErrorKind::Api {
        status: status.as_u16(),
        detail,
    })
}

/// Human-readable message from an error body.
///
/// Understands `{"detail": "..."}` and validation lists of the form
/// `{"detail": [{"loc": [...], "msg": "..."}]}`.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| {
                    let msg = item.get("msg")?.as_str()?;
                    let location = item
                        .get("loc")
                        .and_then(|loc| loc.as_array())
                        .map(|loc| {
                            loc.iter()
                                .map(|part| match part {
                                    serde_json::Value::String(s) => s.clone(),
                                    other => other.to_string(),
                                })
                                .collect::<Vec<_>>()
                                .join(".")
                        });
                    Some(match location {
                        Some(location) if !location.is_empty() => format!("{}: {}", location, msg),
                        _ => msg.to_string(),
                    })
                })
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        other => Some(other.to_string()),
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("json"))
}

#[async_trait]
impl CreativeBackend for AtelierClient {
    #[instrument(skip(self), fields(idea_id = %idea_id))]
    async fn regenerate_idea(&self, idea_id: &IdeaId) -> ClientResult<Idea> {
        self.json(self.request(Method::POST, &format!("/ideas/{}/regenerate", idea_id)))
            .await
    }

    #[instrument(skip(self), fields(idea_id = %idea_id))]
    async fn duplicate_idea(&self, idea_id: &IdeaId) -> ClientResult<Idea> {
        self.json(self.request(Method::POST, &format!("/ideas/{}/duplicate", idea_id)))
            .await
    }

    #[instrument(skip(self), fields(idea_id = %idea_id))]
    async fn delete_idea(&self, idea_id: &IdeaId) -> ClientResult<()> {
        self.send(self.request(Method::DELETE, &format!("/ideas/{}", idea_id)))
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(idea_id = %idea_id))]
    async fn generate_creatives(&self, idea_id: &IdeaId) -> ClientResult<BatchStream> {
        let req = self
            .request(Method::POST, &format!("/ideas/{}/generate-creative", idea_id))
            .header("Accept", "text/event-stream, application/json");
        let response = self.send(req).await?;

        if is_json(&response) {
            tracing::debug!("Backend answered with a complete batch");
            let creatives: Vec<Creative> = response.json().await.map_err(|e| {
                ClientError::new(ClientErrorKind::Deserialization(format!(
                    "Failed to parse creatives: {}",
                    e
                )))
            })?;
            return Ok(Box::pin(batch_from_list(creatives, AspectRatio::COUNT)));
        }

        tracing::debug!("Streaming batch generation");
        Ok(Box::pin(decode_batch_stream(
            response.bytes_stream(),
            AspectRatio::COUNT,
        )))
    }

    #[instrument(skip(self), fields(creative_id = %creative_id))]
    async fn regenerate_creative(&self, creative_id: &CreativeId) -> ClientResult<Creative> {
        self.json(self.request(
            Method::POST,
            &format!("/creatives/{}/regenerate", creative_id),
        ))
        .await
    }

    #[instrument(skip(self), fields(creative_id = %creative_id))]
    async fn approve_creative(&self, creative_id: &CreativeId) -> ClientResult<Approval> {
        self.json(self.request(
            Method::POST,
            &format!("/creatives/{}/approve-creative", creative_id),
        ))
        .await
    }

    #[instrument(skip(self), fields(creative_id = %creative_id))]
    async fn approve_regional(&self, creative_id: &CreativeId) -> ClientResult<Approval> {
        self.json(self.request(
            Method::POST,
            &format!("/creatives/{}/approve-regional", creative_id),
        ))
        .await
    }

    #[instrument(skip(self), fields(creative_id = %creative_id))]
    async fn deploy(&self, creative_id: &CreativeId) -> ClientResult<Approval> {
        self.json(self.request(Method::POST, &format!("/creatives/{}/deploy", creative_id)))
            .await
    }

    #[instrument(skip(self), fields(creative_id = %creative_id))]
    async fn delete_creative(&self, creative_id: &CreativeId) -> ClientResult<()> {
        self.send(self.request(Method::DELETE, &format!("/creatives/{}", creative_id)))
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(idea_id = %idea_id))]
    async fn delete_creatives_for_idea(&self, idea_id: &IdeaId) -> ClientResult<()> {
        self.send(self.request(
            Method::DELETE,
            &format!("/creatives/by-idea/{}", idea_id),
        ))
        .await?;
        Ok(())
    }

    #[instrument(skip(self, query), fields(status = ?query.status, skip = query.skip, limit = query.limit))]
    async fn list_creatives(&self, query: &CreativeQuery) -> ClientResult<Vec<Creative>> {
        let mut params = vec![
            ("skip", query.skip.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(status) = query.status {
            params.push(("status", status.as_str().to_string()));
        }
        self.json(self.request(Method::GET, "/creatives").query(&params))
            .await
    }

    #[instrument(skip(self), fields(brief_id = %brief_id))]
    async fn execute_brief(&self, brief_id: &BriefId) -> ClientResult<IdeaStream> {
        let req = self
            .request(Method::POST, &format!("/briefs/{}/execute", brief_id))
            .header("Accept", "text/event-stream");
        let response = self.send(req).await?;
        tracing::debug!("Streaming brief execution");
        Ok(Box::pin(decode_idea_stream(response.bytes_stream())))
    }

    #[instrument(skip(self))]
    async fn get_settings(&self) -> ClientResult<BTreeMap<String, String>> {
        let envelope: SettingsEnvelope = self.json(self.request(Method::GET, "/settings")).await?;
        Ok(envelope.settings)
    }

    #[instrument(skip(self, settings), fields(keys = settings.len()))]
    async fn save_settings(
        &self,
        settings: &BTreeMap<String, String>,
    ) -> ClientResult<BTreeMap<String, String>> {
        let body = SettingsEnvelope {
            settings: settings.clone(),
        };
        let envelope: SettingsEnvelope = self
            .json(self.request(Method::POST, "/settings").json(&body))
            .await?;
        Ok(envelope.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string() {
        assert_eq!(
            extract_detail(r#"{"detail": "Idea not found"}"#).as_deref(),
            Some("Idea not found")
        );
    }

    #[test]
    fn detail_validation_list() {
        let body = r#"{"detail": [{"loc": ["path", "idea_id"], "msg": "value is not a valid uuid", "type": "type_error.uuid"}]}"#;
        assert_eq!(
            extract_detail(body).as_deref(),
            Some("path.idea_id: value is not a valid uuid")
        );
    }

    #[test]
    fn non_json_body_has_no_detail() {
        assert!(extract_detail("Internal Server Error").is_none());
        assert!(extract_detail(r#"{"message": "nope"}"#).is_none());
    }
}
