//! Event stream protocol.
//!
//! - Codec: SSE framing of [`StreamEvent`](crate::domain::StreamEvent)s
//! - Consumer: incremental reconstruction of run progress
//! - Remote: HTTP client feeding a server's stream into the consumer

pub mod codec;
pub mod consumer;
pub mod remote;

pub use codec::{decode_line, encode_event, event_payload, StreamDecoder};
pub use consumer::{Flow, StoryProgress};
pub use remote::fetch_story;
