//! Generation orchestrator
//!
//! Drives the [`AttemptState`] machine against an [`ImageProvider`]: one
//! independent loop per request, non-blocking backoff, every attempt under
//! its own timeout.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn, Instrument};
use uuid::Uuid;

use super::error::{ErrorKind, GenerationError};
use super::provider::{GeneratedImage, ImageGenerationParams, ImageProvider, ProviderError};
use super::retry::{AttemptState, RetryPolicy};

pub const DEFAULT_MODEL: &str = "gpt-image-1";

/// What happened during one `generate` call.
#[derive(Debug)]
pub struct GenerationReport {
    pub outcome: Result<GeneratedImage, GenerationError>,
    /// Provider calls made.
    pub attempts: u32,
    /// Backoff waits taken, in order.
    pub waits: Vec<Duration>,
    pub final_state: AttemptState,
}

#[derive(Clone)]
pub struct GenerationOrchestrator {
    provider: Arc<dyn ImageProvider>,
    policy: RetryPolicy,
    model: String,
}

impl std::fmt::Debug for GenerationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationOrchestrator")
            .field("provider", &self.provider.name())
            .field("policy", &self.policy)
            .field("model", &self.model)
            .finish()
    }
}

impl GenerationOrchestrator {
    pub fn new(provider: Arc<dyn ImageProvider>, policy: RetryPolicy) -> Self {
        Self {
            provider,
            policy,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate one image, returning its base64 PNG payload.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.generate_with_report(prompt)
            .await
            .outcome
            .map(|image| image.b64_json)
    }

    pub async fn generate_with_report(&self, prompt: &str) -> GenerationReport {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "generate_image",
            %request_id,
            provider = self.provider.name()
        );
        self.run(prompt).instrument(span).await
    }

    async fn run(&self, prompt: &str) -> GenerationReport {
        let params = ImageGenerationParams::new(self.model.clone(), prompt);
        let mut state = AttemptState::initial();
        let mut waits = Vec::new();
        let mut attempts = 0;
        let mut last_error = None;

        while let AttemptState::Attempting(n) = state {
            attempts = n;
            info!(attempt = n, max_attempts = self.policy.max_attempts, "Requesting image");

            let result = match tokio::time::timeout(
                self.policy.attempt_timeout,
                self.provider.generate(&params),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(self.policy.attempt_timeout)),
            };

            match result {
                Ok(image) => {
                    info!(attempt = n, "Image generated");
                    return GenerationReport {
                        outcome: Ok(image),
                        attempts,
                        waits,
                        final_state: state.on_success(),
                    };
                }
                Err(err) => {
                    warn!(
                        attempt = n,
                        status = ?err.http_status(),
                        error = %err,
                        "Image generation attempt failed"
                    );
                    let (next, wait) = state.on_failure(&self.policy);
                    if let Some(wait) = wait {
                        info!(wait_ms = wait.as_millis() as u64, "Backing off before retry");
                        waits.push(wait);
                        tokio::time::sleep(wait).await;
                    }
                    state = next;
                    last_error = Some(err);
                }
            }
        }

        let error = last_error
            .as_ref()
            .map(GenerationError::classify)
            .unwrap_or_else(|| GenerationError::from_kind(ErrorKind::Unknown));
        warn!(
            attempts,
            kind = ?error.kind,
            status = error.http_status(),
            "Image generation failed after retries"
        );
        GenerationReport {
            outcome: Err(error),
            attempts,
            waits,
            final_state: state,
        }
    }
}
