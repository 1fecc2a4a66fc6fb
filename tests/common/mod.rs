//! Scripted backends shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use panelforge::adapters::{AdapterError, ImageBackend, ImagePayload, TextBackend};
use panelforge::core::{ArtifactGenerator, EventSink, ImageStore, TextSynthesizer};
use panelforge::{Orchestrator, PipelineRun, StreamEvent, Topic};
use tempfile::TempDir;
use tokio::sync::mpsc;

pub const DELIMITER: &str = "HUZZAA";

/// Marker that makes any backend call for a page containing it fail
pub const FAIL_ALL: &str = "[fail-all]";

/// Marker that makes only the image call fail
pub const FAIL_IMAGE: &str = "[fail-image]";

pub fn four_page_script() -> String {
    [
        "The emperor opens the games.",
        "Gladiators march into the arena.",
        "Crowds roar from the stands.",
        "The sun sets over the Colosseum.",
    ]
    .join(&format!("\n{}\n", DELIMITER))
}

/// Text backend: answers the script prompt with `script`, anything else
/// with a description unless the prompt carries [`FAIL_ALL`]
pub struct FakeText {
    script: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeText {
    pub fn with_script(script: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            script: Some(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Synthesis always fails
    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            script: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TextBackend for FakeText {
    fn name(&self) -> &str {
        "fake-text"
    }

    async fn complete(&self, prompt: &str) -> Result<String, AdapterError> {
        self.calls.lock().unwrap().push(prompt.to_string());

        if prompt.starts_with("Write me a script") {
            return self.script.clone().ok_or(AdapterError::Status {
                status: 500,
                body: "text backend unavailable".to_string(),
            });
        }

        if prompt.contains(FAIL_ALL) {
            return Err(AdapterError::Timeout);
        }

        Ok("A vivid scene full of color.".to_string())
    }
}

/// Image backend: returns numbered URLs unless the prompt carries a fail marker
#[derive(Default)]
pub struct FakeImages {
    pub calls: AtomicUsize,
    pub always_fail: bool,
}

impl FakeImages {
    pub fn working() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            always_fail: true,
            ..Self::default()
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageBackend for FakeImages {
    fn name(&self) -> &str {
        "fake-images"
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImagePayload, AdapterError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if self.always_fail || prompt.contains(FAIL_ALL) || prompt.contains(FAIL_IMAGE) {
            return Err(AdapterError::Status {
                status: 400,
                body: "content_policy_violation".to_string(),
            });
        }

        Ok(ImagePayload::Url(format!("https://img.example/{}.png", n)))
    }
}

pub fn orchestrator(text: Arc<FakeText>, images: Arc<FakeImages>, dir: &TempDir) -> Orchestrator {
    Orchestrator::new(
        TextSynthesizer::new(text.clone(), 4, DELIMITER),
        ArtifactGenerator::new(images, text, ImageStore::new(dir.path(), "/generated")),
    )
}

/// Run to completion and collect every emitted event
pub async fn run_collect(
    orchestrator: &Orchestrator,
    topic: &str,
) -> (Vec<StreamEvent>, PipelineRun) {
    let (tx, mut rx) = mpsc::channel(64);
    let run = orchestrator
        .run(Topic::parse(topic).unwrap(), &EventSink::new(tx))
        .await;

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    (events, run)
}

pub fn event_types(events: &[StreamEvent]) -> Vec<&'static str> {
    events.iter().map(StreamEvent::event_type).collect()
}
