//! Domain types for the panelforge pipeline.
//!
//! This module contains the core data structures:
//! - Story: topic, raw script, units and finished pages
//! - Artifact: the visual produced for a page
//! - Events: the progress stream payloads
//! - Run: per-request pipeline state

pub mod artifact;
pub mod events;
pub mod run;
pub mod story;

// Re-export commonly used types
pub use artifact::{Artifact, ArtifactKind};
pub use events::StreamEvent;
pub use run::{PipelineRun, RunStatus, Stage};
pub use story::{PageFailure, PipelinePage, RawScript, Topic, Unit, ValidationError};
