//! Run state for a single topic invocation.
//!
//! A PipelineRun lives exactly as long as one request. Nothing about it is
//! persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::story::{PageFailure, PipelinePage, Topic, Unit};

/// A pipeline execution run
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// Unique identifier for this run (log correlation only)
    pub id: Uuid,

    /// Topic the run was started for
    pub topic: Topic,

    /// Units produced by segmentation, in index order
    pub units: Vec<Unit>,

    /// Completed pages, grows monotonically
    pub pages: Vec<PipelinePage>,

    /// Pages that exhausted all strategies
    pub page_errors: Vec<PageFailure>,

    /// Terminal status
    pub status: RunStatus,

    /// Position in the orchestrator state machine
    pub stage: Stage,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run reached a terminal status
    pub completed_at: Option<DateTime<Utc>>,
}

impl PipelineRun {
    pub fn new(topic: Topic) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic,
            units: Vec::new(),
            pages: Vec::new(),
            page_errors: Vec::new(),
            status: RunStatus::Running,
            stage: Stage::Idle,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Move to the next stage
    pub fn advance(&mut self, stage: Stage) {
        debug!(run_id = %self.id, from = ?self.stage, to = ?stage, "Stage transition");
        self.stage = stage;
    }

    pub fn record_page(&mut self, page: PipelinePage) {
        let index = page.index;
        self.pages.push(page);
        self.advance(Stage::UnitComplete(index));
    }

    pub fn record_page_error(&mut self, page_number: usize, error: String) {
        self.page_errors.push(PageFailure { page_number, error });
    }

    pub fn complete(&mut self) {
        self.advance(Stage::Completed);
        self.status = RunStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: String) {
        self.advance(Stage::Failed);
        self.status = RunStatus::Failed { error };
        self.completed_at = Some(Utc::now());
    }

    pub fn cancel(&mut self) {
        self.status = RunStatus::Cancelled;
        self.completed_at = Some(Utc::now());
    }

    /// Check if the run is still in progress
    pub fn is_running(&self) -> bool {
        matches!(self.status, RunStatus::Running)
    }

    /// Total number of units, once segmentation has happened
    pub fn total_units(&self) -> usize {
        self.units.len()
    }
}

/// Terminal status of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RunStatus {
    /// Currently executing
    Running,

    /// Every unit reached an outcome
    Completed,

    /// Script synthesis failed; no pages exist
    Failed { error: String },

    /// The consumer went away before the run finished
    Cancelled,
}

/// Orchestrator state machine positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    ScriptGenerating,
    Segmented,
    GeneratingUnit(usize),
    UnitComplete(usize),
    Completed,
    Failed,
}
