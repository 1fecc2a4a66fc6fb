//! Core orchestration logic.
//!
//! This module contains:
//! - Synthesizer: topic to raw script
//! - Segmenter: raw script to ordered units
//! - ImageStore: persistence for embedded image payloads
//! - ArtifactGenerator: per-page fallback chain
//! - Orchestrator: main execution engine

pub mod artifact_generator;
pub mod image_store;
pub mod orchestrator;
pub mod segmenter;
pub mod synthesizer;

// Re-export commonly used types
pub use artifact_generator::{
    ArtifactGenerator, GenerationExhausted, Strategy, StrategyError, FALLBACK_CHAIN,
};
pub use image_store::{ImageStore, PersistenceError};
pub use orchestrator::{EventSink, Orchestrator};
pub use segmenter::segment;
pub use synthesizer::{TextSynthesizer, UpstreamError};
