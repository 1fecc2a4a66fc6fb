//! Per-page artifact generation through a fixed fallback chain.
//!
//! Strategies are tried strictly in order:
//! 1. Direct image synthesis (URL, or embedded payload persisted to disk)
//! 2. Textual scene description
//!
//! Any failure of a strategy, including a failed write of an embedded image,
//! moves on to the next one. Only when the whole chain fails does
//! [`GenerationExhausted`] escape.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::adapters::{AdapterError, ImageBackend, ImagePayload, TextBackend};
use crate::domain::{Artifact, Unit};

use super::image_store::{ImageStore, PersistenceError};

/// Style directive appended to every image prompt
pub const STYLE_DIRECTIVE: &str =
    "Keep it historically accurate, use vibrant colors and a consistent comic illustration style.";

/// Order in which strategies are attempted. Not configurable per call.
pub const FALLBACK_CHAIN: [Strategy; 2] = [Strategy::DirectImage, Strategy::SceneDescription];

/// A single generation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    DirectImage,
    SceneDescription,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectImage => f.write_str("direct_image"),
            Self::SceneDescription => f.write_str("scene_description"),
        }
    }
}

/// Failure of one strategy attempt
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error(transparent)]
    Backend(#[from] AdapterError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Every strategy failed for a page
#[derive(Debug, Error)]
#[error("All generation strategies failed for page {index}: {last}")]
pub struct GenerationExhausted {
    pub index: usize,
    #[source]
    pub last: StrategyError,
}

/// Stateless per call; shares backends and the image store across pages
pub struct ArtifactGenerator {
    image_backend: Arc<dyn ImageBackend>,
    text_backend: Arc<dyn TextBackend>,
    store: ImageStore,
}

impl ArtifactGenerator {
    pub fn new(
        image_backend: Arc<dyn ImageBackend>,
        text_backend: Arc<dyn TextBackend>,
        store: ImageStore,
    ) -> Self {
        Self {
            image_backend,
            text_backend,
            store,
        }
    }

    /// Generate the artifact for one unit
    #[instrument(skip(self, unit), fields(page = unit.index))]
    pub async fn generate(&self, unit: &Unit) -> Result<Artifact, GenerationExhausted> {
        let mut last_error = None;

        for strategy in FALLBACK_CHAIN {
            let started = Instant::now();
            match self.attempt(strategy, unit).await {
                Ok(artifact) => {
                    info!(
                        %strategy,
                        kind = %artifact.kind(),
                        duration_ms = started.elapsed().as_millis() as u64,
                        "Artifact generated"
                    );
                    return Ok(artifact);
                }
                Err(e) => {
                    warn!(%strategy, error = %e, "Generation strategy failed");
                    last_error = Some(e);
                }
            }
        }

        Err(GenerationExhausted {
            index: unit.index,
            // FALLBACK_CHAIN is non-empty, so a failure was recorded
            last: last_error.unwrap_or(StrategyError::Backend(AdapterError::EmptyResponse)),
        })
    }

    async fn attempt(&self, strategy: Strategy, unit: &Unit) -> Result<Artifact, StrategyError> {
        match strategy {
            Strategy::DirectImage => self.direct_image(unit).await,
            Strategy::SceneDescription => self.scene_description(unit).await,
        }
    }

    async fn direct_image(&self, unit: &Unit) -> Result<Artifact, StrategyError> {
        let payload = self
            .image_backend
            .generate_image(&image_prompt(&unit.text))
            .await?;

        let reference = match payload {
            ImagePayload::Url(url) => url,
            ImagePayload::Base64(data) => self.store.persist_base64(&data).await?,
        };

        Ok(Artifact::image(reference))
    }

    async fn scene_description(&self, unit: &Unit) -> Result<Artifact, StrategyError> {
        let text = self
            .text_backend
            .complete(&description_prompt(&unit.text))
            .await?;

        let text = text.trim();
        if text.is_empty() {
            return Err(AdapterError::EmptyResponse.into());
        }

        Ok(Artifact::description(text))
    }
}

/// Image prompt for a page script
pub fn image_prompt(script: &str) -> String {
    format!(
        "Generate a historically accurate and engaging comic book page \
         from the given script: {} {}",
        script, STYLE_DIRECTIVE
    )
}

/// Description prompt used when no image can be produced
pub fn description_prompt(script: &str) -> String {
    format!(
        "Describe, vividly and in a few sentences, the visual scene of a comic book page \
         drawn from this script, including setting, characters, colors and action. \
         Give only the description: {}",
        script
    )
}
