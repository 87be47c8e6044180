//! Error taxonomy surfaced to clients of the generation endpoint.

use garment_types::{ErrorDetail, ErrorResponse};
use serde::Serialize;
use thiserror::Error;

use super::provider::ProviderError;

/// Closed set of failure categories, each with its own status and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    PermissionDenied,
    InvalidRequest,
    RateLimited,
    Unknown,
}

impl ErrorKind {
    /// Category for a provider HTTP status (`None`: no response at all).
    pub fn from_provider_status(status: Option<u16>) -> Self {
        match status {
            Some(403) => Self::PermissionDenied,
            Some(400) => Self::InvalidRequest,
            Some(429) => Self::RateLimited,
            _ => Self::Unknown,
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::PermissionDenied => 403,
            Self::InvalidRequest => 400,
            Self::RateLimited => 429,
            Self::Unknown => 500,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "Access denied: Your API key may not have permission for image generation or your account may have billing issues",
            Self::InvalidRequest => "The prompt may violate content policies or contains invalid parameters",
            Self::RateLimited => "Rate limit exceeded: Too many requests or quota exceeded",
            Self::Unknown => "Something went wrong generating the image",
        }
    }
}

/// Provider error type reported when the provider did not supply one.
pub const UNKNOWN_ERROR_TYPE: &str = "unknown_error";

/// A classified generation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GenerationError {
    pub kind: ErrorKind,
    pub message: String,
    pub provider_type: String,
    pub code: Option<String>,
    pub param: Option<String>,
}

impl GenerationError {
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
            provider_type: UNKNOWN_ERROR_TYPE.to_string(),
            code: None,
            param: None,
        }
    }

    /// Classify the last provider error after retries are exhausted.
    pub fn classify(err: &ProviderError) -> Self {
        let kind = ErrorKind::from_provider_status(err.http_status());
        Self {
            kind,
            message: kind.message().to_string(),
            provider_type: err
                .error_type()
                .filter(|t| !t.is_empty())
                .unwrap_or(UNKNOWN_ERROR_TYPE)
                .to_string(),
            code: err.code().filter(|c| !c.is_empty()).map(str::to_string),
            param: err.param().filter(|p| !p.is_empty()).map(str::to_string),
        }
    }

    pub fn http_status(&self) -> u16 {
        self.kind.http_status()
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            message: self.message.clone(),
            error: ErrorDetail {
                error_type: self.provider_type.clone(),
                code: self.code.clone(),
                param: self.param.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorKind::from_provider_status(Some(403)), ErrorKind::PermissionDenied);
        assert_eq!(ErrorKind::from_provider_status(Some(400)), ErrorKind::InvalidRequest);
        assert_eq!(ErrorKind::from_provider_status(Some(429)), ErrorKind::RateLimited);
        assert_eq!(ErrorKind::from_provider_status(Some(500)), ErrorKind::Unknown);
        assert_eq!(ErrorKind::from_provider_status(Some(401)), ErrorKind::Unknown);
        assert_eq!(ErrorKind::from_provider_status(None), ErrorKind::Unknown);
    }

    #[test]
    fn test_http_status_exhaustive() {
        assert_eq!(ErrorKind::PermissionDenied.http_status(), 403);
        assert_eq!(ErrorKind::InvalidRequest.http_status(), 400);
        assert_eq!(ErrorKind::RateLimited.http_status(), 429);
        assert_eq!(ErrorKind::Unknown.http_status(), 500);
    }

    #[test]
    fn test_rate_limit_passes_provider_details_through() {
        let err = ProviderError::Api {
            status: 429,
            message: "Rate limit reached for images".into(),
            error_type: Some("requests".into()),
            code: Some("rate_limit_exceeded".into()),
            param: Some("model".into()),
        };
        let classified = GenerationError::classify(&err);
        assert_eq!(classified.kind, ErrorKind::RateLimited);
        assert_eq!(
            classified.to_response(),
            ErrorResponse {
                message: "Rate limit exceeded: Too many requests or quota exceeded".into(),
                error: ErrorDetail {
                    error_type: "requests".into(),
                    code: Some("rate_limit_exceeded".into()),
                    param: Some("model".into()),
                },
            }
        );
    }

    #[test]
    fn test_missing_details_default() {
        let timeout = ProviderError::Timeout(Duration::from_secs(30));
        let classified = GenerationError::classify(&timeout);
        assert_eq!(classified.kind, ErrorKind::Unknown);
        assert_eq!(classified.http_status(), 500);
        assert_eq!(classified.provider_type, "unknown_error");
        assert_eq!(classified.code, None);
        assert_eq!(classified.param, None);
        assert_eq!(classified.message, "Something went wrong generating the image");
    }

    #[test]
    fn test_provider_message_is_not_leaked() {
        let err = ProviderError::status(500, "stack trace: internal details");
        let classified = GenerationError::classify(&err);
        assert!(!classified.message.contains("internal details"));
    }
}
