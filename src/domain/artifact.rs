//! Visual artifacts produced for a page.
//!
//! The shape is decided where the artifact is produced, so consumers never
//! have to guess whether a string is a URL or prose.

use serde::{Deserialize, Serialize};

/// The generated visual payload for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifact {
    /// A retrievable image: absolute URL or server-relative path
    Image {
        #[serde(rename = "locationReference")]
        location_reference: String,
    },

    /// Textual scene description used when image generation is unavailable
    Description { text: String },
}

impl Artifact {
    pub fn image(location_reference: impl Into<String>) -> Self {
        Self::Image {
            location_reference: location_reference.into(),
        }
    }

    pub fn description(text: impl Into<String>) -> Self {
        Self::Description { text: text.into() }
    }

    /// Short label for logs
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::Image { .. } => ArtifactKind::Image,
            Self::Description { .. } => ArtifactKind::Description,
        }
    }
}

/// Discriminant of [`Artifact`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Image,
    Description,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::Description => f.write_str("description"),
        }
    }
}
