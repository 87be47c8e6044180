//! Image generation with bounded retries
//!
//! [`GenerationOrchestrator`] calls an [`ImageProvider`] until it succeeds or
//! the [`RetryPolicy`] is exhausted, then classifies the last failure into a
//! [`GenerationError`] the HTTP layer can return as-is.

pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod provider;
pub mod retry;

pub use error::{ErrorKind, GenerationError};
pub use openai::OpenAiImageClient;
pub use orchestrator::{GenerationOrchestrator, GenerationReport};
pub use provider::{GeneratedImage, ImageGenerationParams, ImageProvider, ProviderError};
pub use retry::{AttemptState, RetryPolicy};
