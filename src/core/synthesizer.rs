//! Script synthesis: one text-backend call per run.
//!
//! There is no retry here. A failure propagates and aborts the run.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use crate::adapters::{AdapterError, TextBackend};
use crate::domain::{RawScript, Topic};

/// Global failure of the synthesis stage
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Failed to generate comic script: {0}")]
    Backend(#[from] AdapterError),

    #[error("Failed to generate comic script: no script generated")]
    EmptyScript,

    #[error("Generated script contained no pages")]
    NoUnits,
}

/// Produces the raw script for a topic
pub struct TextSynthesizer {
    backend: Arc<dyn TextBackend>,
    page_count: usize,
    delimiter: String,
}

impl TextSynthesizer {
    pub fn new(
        backend: Arc<dyn TextBackend>,
        page_count: usize,
        delimiter: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            page_count,
            delimiter: delimiter.into(),
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Prompt asking for exactly `page_count` pages separated by the delimiter
    pub fn prompt(&self, topic: &Topic) -> String {
        format!(
            "Write me a script for a comic book about the topic {topic}. \
             The script should be written for a {pages} page comic book. \
             Separate each page script with the word {delim}. \
             Don't use any emojis and give me only the script without any introduction, \
             headings or your own words.",
            topic = topic,
            pages = self.page_count,
            delim = self.delimiter,
        )
    }

    #[instrument(skip(self), fields(backend = %self.backend.name()))]
    pub async fn synthesize(&self, topic: &Topic) -> Result<RawScript, UpstreamError> {
        let text = self.backend.complete(&self.prompt(topic)).await?;

        if text.trim().is_empty() {
            return Err(UpstreamError::EmptyScript);
        }

        info!(chars = text.len(), "Script generated");
        Ok(RawScript::new(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Fixed(Result<String, ()>);

    #[async_trait]
    impl TextBackend for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, AdapterError> {
            self.0.clone().map_err(|_| AdapterError::Timeout)
        }
    }

    fn topic() -> Topic {
        Topic::parse("Egyptian Pyramids").unwrap()
    }

    #[test]
    fn test_prompt_names_topic_count_and_delimiter() {
        let synth = TextSynthesizer::new(Arc::new(Fixed(Ok(String::new()))), 4, "HUZZAA");
        let prompt = synth.prompt(&topic());

        assert!(prompt.contains("Egyptian Pyramids"));
        assert!(prompt.contains("4 page"));
        assert!(prompt.contains("HUZZAA"));
        assert!(prompt.contains("without any introduction"));
    }

    #[tokio::test]
    async fn test_synthesize_returns_raw_text() {
        let synth = TextSynthesizer::new(Arc::new(Fixed(Ok("A HUZZAA B".into()))), 2, "HUZZAA");
        let raw = synth.synthesize(&topic()).await.unwrap();
        assert_eq!(raw.as_str(), "A HUZZAA B");
    }

    #[tokio::test]
    async fn test_blank_payload_is_upstream_error() {
        let synth = TextSynthesizer::new(Arc::new(Fixed(Ok("  \n".into()))), 4, "HUZZAA");
        let err = synth.synthesize(&topic()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::EmptyScript));
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let synth = TextSynthesizer::new(Arc::new(Fixed(Err(()))), 4, "HUZZAA");
        let err = synth.synthesize(&topic()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Backend(AdapterError::Timeout)));
        assert!(err.to_string().contains("timed out"));
    }
}
