//! Lifecycle events emitted by the orchestrator.
//!
//! These are the payloads of the event stream. Per run they arrive in a fixed
//! order: one `status`, `script_complete`, then for each page a
//! `generating_page` followed by `page_complete` or `page_error`, and finally
//! exactly one terminal `complete` or `error`.

use serde::{Deserialize, Serialize};

use super::story::PipelinePage;

/// A single event in a run's progress stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Human-readable progress note
    Status { message: String },

    /// Segmentation finished; `pages` is the total unit count
    ScriptComplete { pages: usize },

    /// About to generate the given page
    GeneratingPage {
        #[serde(rename = "pageNumber")]
        page_number: usize,
    },

    /// A page finished with an artifact
    PageComplete { page: PipelinePage },

    /// A page exhausted every generation strategy
    PageError {
        #[serde(rename = "pageNumber")]
        page_number: usize,
        error: String,
    },

    /// Run finished; nothing follows
    Complete,

    /// Global failure; nothing follows
    Error { error: String },
}

impl StreamEvent {
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    /// Wire name of this event (`type` field)
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::ScriptComplete { .. } => "script_complete",
            Self::GeneratingPage { .. } => "generating_page",
            Self::PageComplete { .. } => "page_complete",
            Self::PageError { .. } => "page_error",
            Self::Complete => "complete",
            Self::Error { .. } => "error",
        }
    }

    /// Whether the stream closes after this event
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error { .. })
    }

    /// Page number carried by per-page events
    pub fn page_number(&self) -> Option<usize> {
        match self {
            Self::GeneratingPage { page_number } | Self::PageError { page_number, .. } => {
                Some(*page_number)
            }
            Self::PageComplete { page } => Some(page.index),
            _ => None,
        }
    }
}
