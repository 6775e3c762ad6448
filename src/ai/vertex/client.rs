use super::auth::{ServiceAccountTokenSource, TokenSource};
use crate::models::Config;
use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Lightweight Vertex AI REST client shared by the vision, image, edit and
/// video modules.
///
/// One instance is built per process and handed out as `Arc<VertexHttpClient>`.
pub struct VertexHttpClient {
    pub(crate) client: Client,
    tokens: Arc<dyn TokenSource>,
    project_id: String,
    location: String,
    pub(crate) base_url: String,
}

impl VertexHttpClient {
    pub fn new(tokens: Arc<dyn TokenSource>, project_id: String, location: String) -> Self {
        Self::new_with_client(tokens, project_id, location, Client::new())
    }

    pub fn new_with_client(
        tokens: Arc<dyn TokenSource>,
        project_id: String,
        location: String,
        client: Client,
    ) -> Self {
        let base_url = format!("https://{}-aiplatform.googleapis.com", location);

        Self {
            client,
            tokens,
            project_id,
            location,
            base_url,
        }
    }

    /// Loads the service account named in `config` and fetches a first token.
    ///
    /// Any failure here is an [`Error::Authentication`]; callers treat it as
    /// fatal.
    pub async fn connect(config: &Config) -> Result<Self> {
        let tokens = ServiceAccountTokenSource::from_file(&config.credentials_path)?;
        tokens.access_token().await?;

        tracing::info!(
            "Authenticated with Vertex AI (project: {}, location: {})",
            config.project_id,
            config.location
        );

        Ok(Self::new(
            Arc::new(tokens),
            config.project_id.clone(),
            config.location.clone(),
        ))
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:{}",
            self.base_url, self.project_id, self.location, model, method
        )
    }

    /// POSTs `request` to `{model}:{method}` and decodes the JSON reply.
    pub async fn call<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        model: &str,
        method: &str,
        request: &Req,
        timeout: Duration,
    ) -> Result<Resp> {
        let url = self.model_url(model, method);
        let token = self.tokens.access_token().await?;

        tracing::debug!("Calling Vertex AI {}:{}", model, method);

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Vertex AI: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Vertex AI error (status {}): {}", status, error_text);
            return Err(Error::AiProvider(format!(
                "Vertex AI error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Vertex AI response: {}\nBody: {}", e, body);
            Error::AiProvider(format!("Failed to parse Vertex AI response: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::vertex::test_support;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_call_builds_publisher_model_path_with_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(
                "/v1/projects/test-project/locations/us-central1/publishers/google/models/some-model:predict",
            ))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let http = test_support::http_client(&server);
        let body: serde_json::Value = http
            .call("some-model", "predict", &serde_json::json!({}), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_non_success_status_is_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
            .mount(&server)
            .await;

        let http = test_support::http_client(&server);
        let err = http
            .call::<_, serde_json::Value>("m", "predict", &serde_json::json!({}), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(ref msg) if msg.contains("permission denied")));
    }

    #[tokio::test]
    async fn test_unparsable_body_is_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let http = test_support::http_client(&server);
        let err = http
            .call::<_, serde_json::Value>("m", "predict", &serde_json::json!({}), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[test]
    fn test_default_base_url_uses_regional_endpoint() {
        let http = VertexHttpClient::new(
            Arc::new(crate::ai::vertex::StaticTokenSource::new("t")),
            "p".to_string(),
            "europe-west4".to_string(),
        );
        assert_eq!(http.base_url, "https://europe-west4-aiplatform.googleapis.com");
        assert_eq!(http.project_id(), "p");
    }
}
