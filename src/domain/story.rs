//! Story content types: the topic a run is started for, the raw script the
//! text backend returns, and the ordered units and pages derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::artifact::Artifact;

/// Rejected request input. Never surfaced as a pipeline event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Topic was empty or whitespace only
    #[error("Topic is required")]
    EmptyTopic,

    /// Request body could not be read as `{ "topic": string }`
    #[error("Invalid request body: {0}")]
    MalformedBody(String),
}

/// A caller-supplied subject, guaranteed non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Validate and trim a raw topic string
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTopic);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unsegmented text returned by the text backend for one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawScript(String);

impl RawScript {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of the segmented script.
///
/// `index` is 1-based and contiguous; `text` is trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub index: usize,
    pub text: String,
}

/// A finished page as delivered to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelinePage {
    /// 1-based page number, equal to the unit index
    pub index: usize,

    /// Script text for this page
    pub unit_text: String,

    /// Generated visual for this page
    pub artifact: Artifact,
}

impl PipelinePage {
    pub fn new(unit: &Unit, artifact: Artifact) -> Self {
        Self {
            index: unit.index,
            unit_text: unit.text.clone(),
            artifact,
        }
    }
}

/// A page whose every generation strategy failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFailure {
    pub page_number: usize,
    pub error: String,
}
