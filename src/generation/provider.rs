//! Image provider port
//!
//! The external image-generation API seen from the orchestrator: one call,
//! one image or one [`ProviderError`].

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Request sent to the provider for a single image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageGenerationParams {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub background: String,
    pub size: String,
    pub output_format: String,
    pub quality: String,
}

impl ImageGenerationParams {
    /// One 1024x1024 transparent PNG.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            n: 1,
            background: "transparent".to_string(),
            size: "1024x1024".to_string(),
            output_format: "png".to_string(),
            quality: "auto".to_string(),
        }
    }
}

/// A generated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Base64-encoded PNG.
    pub b64_json: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with an error status.
    #[error("provider returned HTTP {status}: {message}")]
    Api {
        status: u16,
        message: String,
        error_type: Option<String>,
        code: Option<String>,
        param: Option<String>,
    },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Shorthand for an [`ProviderError::Api`] without details.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            error_type: None,
            code: None,
            param: None,
        }
    }

    /// HTTP status reported by the provider, if it got that far.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Timeout(_) | Self::InvalidResponse(_) => None,
        }
    }

    pub fn error_type(&self) -> Option<&str> {
        match self {
            Self::Api { error_type, .. } => error_type.as_deref(),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn param(&self) -> Option<&str> {
        match self {
            Self::Api { param, .. } => param.as_deref(),
            _ => None,
        }
    }
}

/// Something that turns a prompt into an image.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate(
        &self,
        params: &ImageGenerationParams,
    ) -> Result<GeneratedImage, ProviderError>;

    /// Name used in logs.
    fn name(&self) -> &str {
        "image-provider"
    }
}
