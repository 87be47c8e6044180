//! OpenAI Images API client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::provider::{GeneratedImage, ImageGenerationParams, ImageProvider, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// `POST {base_url}/images/generations` with bearer auth.
#[derive(Clone)]
pub struct OpenAiImageClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    #[serde(default)]
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    param: Option<serde_json::Value>,
}

impl OpenAiImageClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        // Per-attempt timeouts are applied by the orchestrator.
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, api_key, base_url))
    }

    pub fn with_client(
        client: Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/images/generations", self.base_url)
    }
}

impl std::fmt::Debug for OpenAiImageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiImageClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Build an [`ProviderError::Api`] from a non-success response body.
fn parse_error_body(status: u16, body: &str) -> ProviderError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error)
        .unwrap_or_default();

    // Usually strings, but some errors send numbers or objects.
    let as_text = |value: Option<serde_json::Value>| match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };
    let code = as_text(parsed.code);
    let param = as_text(parsed.param);

    ProviderError::Api {
        status,
        message: parsed
            .message
            .unwrap_or_else(|| format!("HTTP {}", status)),
        error_type: parsed.error_type,
        code,
        param,
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageClient {
    async fn generate(
        &self,
        params: &ImageGenerationParams,
    ) -> Result<GeneratedImage, ProviderError> {
        debug!(
            model = %params.model,
            prompt_len = params.prompt.len(),
            "Calling images API"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = parse_error_body(status.as_u16(), &body);
            warn!(status = status.as_u16(), error = %err, "Images API returned an error");
            return Err(err);
        }

        let body: ImagesResponse = response.json().await?;
        body.data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .filter(|b| !b.is_empty())
            .map(|b64_json| GeneratedImage { b64_json })
            .ok_or_else(|| {
                ProviderError::InvalidResponse("response has no data[0].b64_json".into())
            })
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_error_body() {
        let body = r#"{"error":{"message":"Billing hard limit reached","type":"billing_error","code":"billing_hard_limit_reached","param":null}}"#;
        match parse_error_body(403, body) {
            ProviderError::Api {
                status,
                message,
                error_type,
                code,
                param,
            } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Billing hard limit reached");
                assert_eq!(error_type.as_deref(), Some("billing_error"));
                assert_eq!(code.as_deref(), Some("billing_hard_limit_reached"));
                assert_eq!(param, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_garbage_body() {
        let err = parse_error_body(502, "<html>Bad gateway</html>");
        assert_eq!(err.http_status(), Some(502));
        assert_eq!(err.error_type(), None);
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_numeric_code() {
        let err = parse_error_body(400, r#"{"error":{"message":"x","code":42}}"#);
        assert_eq!(err.code(), Some("42"));
    }

    #[test]
    fn test_non_string_param_keeps_envelope() {
        let body = r#"{"error":{"message":"bad size","type":"invalid_request_error","code":"invalid_value","param":["size"]}}"#;
        let err = parse_error_body(400, body);
        assert_eq!(err.error_type(), Some("invalid_request_error"));
        assert_eq!(err.code(), Some("invalid_value"));
        assert_eq!(err.param(), Some(r#"["size"]"#));
    }

    #[test]
    fn test_debug_redacts_key() {
        let client =
            OpenAiImageClient::with_client(Client::new(), "sk-secret", "http://localhost/v1/");
        let debug = format!("{client:?}");
        assert!(!debug.contains("sk-secret"));
        assert_eq!(client.base_url(), "http://localhost/v1");
        assert_eq!(client.endpoint(), "http://localhost/v1/images/generations");
    }
}
