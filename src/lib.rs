//! panelforge - Streaming comic-story generator
//!
//! Turns a free-text topic into a fixed-length illustrated story by chaining
//! a text backend (script synthesis) and an image backend (one visual per
//! page), streaming each page to the caller as it completes.
//!
//! # Architecture
//!
//! A run is a single sequential pipeline:
//! - The script is synthesized once; failure aborts the whole run
//! - The script is split into pages on a fixed delimiter
//! - Each page goes through a fallback chain (image, then description);
//!   a page that exhausts the chain is reported and skipped
//! - Progress is emitted as ordered events over `text/event-stream`
//!
//! # Modules
//!
//! - `adapters`: Generative backends (OpenAI-compatible HTTP)
//! - `core`: Synthesizer, Segmenter, ArtifactGenerator, Orchestrator
//! - `domain`: Data structures (Topic, Unit, Artifact, StreamEvent, PipelineRun)
//! - `stream`: Event stream codec and incremental consumer
//! - `server`: HTTP endpoints
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Serve the HTTP API
//! panelforge serve --port 5000
//!
//! # Generate a story locally
//! panelforge generate "Roman Colosseum"
//!
//! # Follow a running server's stream
//! panelforge fetch "Viking Ships"
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod stream;

// Re-export main types at crate root for convenience
pub use crate::core::{EventSink, Orchestrator};
pub use domain::{Artifact, PipelinePage, PipelineRun, RunStatus, StreamEvent, Topic, Unit};
pub use stream::{StoryProgress, StreamDecoder};
