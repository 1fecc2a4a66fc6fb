//! Client-side reconstruction of a run from its event stream.

use std::collections::BTreeMap;

use crate::domain::{PipelinePage, StreamEvent};

/// What the reader should do after applying an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Progress of a run as seen by a consumer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryProgress {
    /// Latest human-readable status line
    pub status: String,

    /// Total page count, known after `script_complete`
    pub total_pages: Option<usize>,

    /// Completed pages in arrival order
    pub pages: Vec<PipelinePage>,

    /// Per-page failures keyed by page number
    pub page_errors: BTreeMap<usize, String>,

    /// Global failure message
    pub error: Option<String>,

    /// Set once a terminal event was applied
    pub finished: bool,
}

impl StoryProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild progress from a complete sequence of events
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a StreamEvent>) -> Self {
        let mut progress = Self::new();
        for event in events {
            if progress.apply(event) == Flow::Stop {
                break;
            }
        }
        progress
    }

    /// Apply one event. Events after a terminal one are ignored.
    pub fn apply(&mut self, event: &StreamEvent) -> Flow {
        if self.finished {
            return Flow::Stop;
        }

        match event {
            StreamEvent::Status { message } => {
                self.status = message.clone();
            }
            StreamEvent::ScriptComplete { pages } => {
                self.total_pages = Some(*pages);
                self.status = format!("Script complete! Generating {} pages...", pages);
            }
            StreamEvent::GeneratingPage { page_number } => {
                self.status = format!("Generating page {}...", page_number);
            }
            StreamEvent::PageComplete { page } => {
                self.status = format!("Page {} complete!", page.index);
                self.pages.push(page.clone());
            }
            StreamEvent::PageError { page_number, error } => {
                self.status = format!("Error generating page {}", page_number);
                self.page_errors.insert(*page_number, error.clone());
            }
            StreamEvent::Complete => {
                self.status = "Comic generation complete!".to_string();
                self.finished = true;
            }
            StreamEvent::Error { error } => {
                self.error = Some(error.clone());
                self.finished = true;
            }
        }

        if self.finished {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }

    /// Whether the run ended without a global failure
    pub fn succeeded(&self) -> bool {
        self.finished && self.error.is_none()
    }

    /// Pages that have reached an outcome, success or failure
    pub fn settled_pages(&self) -> usize {
        self.pages.len() + self.page_errors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Artifact;

    fn page(index: usize) -> PipelinePage {
        PipelinePage {
            index,
            unit_text: format!("page {}", index),
            artifact: Artifact::image(format!("https://img/{}.png", index)),
        }
    }

    #[test]
    fn test_mixed_run_reconstruction() {
        let events = vec![
            StreamEvent::status("Generating comic script..."),
            StreamEvent::ScriptComplete { pages: 3 },
            StreamEvent::GeneratingPage { page_number: 1 },
            StreamEvent::PageComplete { page: page(1) },
            StreamEvent::GeneratingPage { page_number: 2 },
            StreamEvent::PageError {
                page_number: 2,
                error: "exhausted".to_string(),
            },
            StreamEvent::GeneratingPage { page_number: 3 },
            StreamEvent::PageComplete { page: page(3) },
            StreamEvent::Complete,
        ];

        let progress = StoryProgress::from_events(&events);

        assert_eq!(progress.total_pages, Some(3));
        assert_eq!(progress.pages.len(), 2);
        assert_eq!(progress.page_errors.get(&2).map(String::as_str), Some("exhausted"));
        assert_eq!(progress.settled_pages(), 3);
        assert!(progress.succeeded());
    }

    #[test]
    fn test_global_error_is_terminal() {
        let mut progress = StoryProgress::new();
        progress.apply(&StreamEvent::status("Generating comic script..."));

        let flow = progress.apply(&StreamEvent::Error {
            error: "Failed to generate comic script".to_string(),
        });

        assert_eq!(flow, Flow::Stop);
        assert!(progress.finished);
        assert!(!progress.succeeded());
        assert!(progress.pages.is_empty());
    }

    #[test]
    fn test_events_after_terminal_ignored() {
        let mut progress = StoryProgress::new();
        progress.apply(&StreamEvent::Complete);

        assert_eq!(progress.apply(&StreamEvent::PageComplete { page: page(1) }), Flow::Stop);
        assert!(progress.pages.is_empty());
        assert_eq!(progress.status, "Comic generation complete!");
    }
}
