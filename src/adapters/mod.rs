//! Adapter interfaces for generative backends.
//!
//! The pipeline talks to two kinds of backend: one that turns a prompt into
//! text, and one that turns a prompt into an image. Both are traits so the
//! orchestrator can be driven by scripted fakes in tests.

pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

// Re-export the OpenAI adapter
pub use openai::OpenAiAdapter;

/// Errors returned by a backend call
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Transport or connection failure
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The call did not finish within the client timeout
    #[error("Backend request timed out")]
    Timeout,

    /// Backend answered with a non-success status
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON
    #[error("Failed to parse backend response: {0}")]
    Parse(String),

    /// Response parsed but carried no usable content
    #[error("Backend returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for AdapterError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AdapterError::Timeout
        } else if e.is_decode() {
            AdapterError::Parse(e.to_string())
        } else {
            AdapterError::Request(e.to_string())
        }
    }
}

/// Raw image payload as delivered by an image backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    /// Directly retrievable URL
    Url(String),

    /// Base64-encoded image bytes that must be persisted before use
    Base64(String),
}

/// Backend that completes a text prompt
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Return the completion for `prompt`
    async fn complete(&self, prompt: &str) -> Result<String, AdapterError>;
}

/// Backend that renders an image from a prompt
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Render one image for `prompt`
    async fn generate_image(&self, prompt: &str) -> Result<ImagePayload, AdapterError>;
}
