//! Main orchestrator for pipeline execution.
//!
//! Runs synthesis, segmentation and per-page generation strictly in order,
//! one backend call outstanding at a time, and reports progress through an
//! [`EventSink`].
//!
//! Failure handling:
//! - synthesis failure is global: one `error` event, no pages
//! - generation exhaustion is local to its page: one `page_error` event,
//!   and the run moves on to the next page

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{error, field, info, instrument, warn, Span};

use crate::adapters::OpenAiAdapter;
use crate::config::ResolvedConfig;
use crate::domain::{PipelinePage, PipelineRun, Stage, StreamEvent, Topic, Unit};

use super::artifact_generator::ArtifactGenerator;
use super::image_store::ImageStore;
use super::segmenter::segment;
use super::synthesizer::{TextSynthesizer, UpstreamError};

/// Destination for lifecycle events
///
/// A channel-backed sink reports closure once the receiving side is dropped,
/// which is how a disconnected consumer cancels a run.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Option<mpsc::Sender<StreamEvent>>,
}

impl EventSink {
    pub fn new(tx: mpsc::Sender<StreamEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink that drops every event and never closes
    pub fn detached() -> Self {
        Self { tx: None }
    }

    /// Deliver an event. Returns false if the consumer is gone.
    pub async fn emit(&self, event: StreamEvent) -> bool {
        match &self.tx {
            Some(tx) => tx.send(event).await.is_ok(),
            None => true,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.as_ref().map(|tx| tx.is_closed()).unwrap_or(false)
    }
}

/// Main pipeline orchestrator
pub struct Orchestrator {
    synthesizer: TextSynthesizer,
    generator: ArtifactGenerator,
}

impl Orchestrator {
    pub fn new(synthesizer: TextSynthesizer, generator: ArtifactGenerator) -> Self {
        Self {
            synthesizer,
            generator,
        }
    }

    /// Wire an orchestrator to the configured OpenAI-compatible backend
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        if !config.has_api_key() {
            warn!("No OpenAI API key configured; backend calls will likely be rejected");
        }

        let adapter = Arc::new(
            OpenAiAdapter::from_settings(&config.openai)
                .context("Failed to build OpenAI adapter")?,
        );

        let synthesizer = TextSynthesizer::new(
            adapter.clone(),
            config.story.page_count,
            config.story.delimiter.clone(),
        );
        let generator = ArtifactGenerator::new(
            adapter.clone(),
            adapter,
            ImageStore::new(
                config.storage.public_dir.clone(),
                config.storage.url_prefix.clone(),
            ),
        );

        Ok(Self::new(synthesizer, generator))
    }

    /// Execute one run for `topic`, emitting progress into `sink`
    #[instrument(skip(self, topic, sink), fields(topic = %topic, run_id = field::Empty))]
    pub async fn run(&self, topic: Topic, sink: &EventSink) -> PipelineRun {
        let mut run = PipelineRun::new(topic);
        Span::current().record("run_id", field::display(&run.id));
        info!("Starting pipeline run");

        if !sink
            .emit(StreamEvent::status("Generating comic script..."))
            .await
        {
            return cancel(run);
        }

        run.advance(Stage::ScriptGenerating);
        let units = match self.script_units(&run).await {
            Ok(units) => units,
            Err(e) => {
                let error_msg = e.to_string();
                error!(error = %error_msg, "Run failed");
                run.fail(error_msg.clone());
                sink.emit(StreamEvent::Error { error: error_msg }).await;
                return run;
            }
        };

        let expected = self.synthesizer.page_count();
        if units.len() != expected {
            warn!(
                expected,
                actual = units.len(),
                "Script page count differs from requested; continuing with degraded output"
            );
        }

        run.units = units;
        run.advance(Stage::Segmented);
        if !sink
            .emit(StreamEvent::ScriptComplete {
                pages: run.total_units(),
            })
            .await
        {
            return cancel(run);
        }

        for unit in run.units.clone() {
            // Stop before issuing another backend call once the consumer is gone
            if sink.is_closed() {
                return cancel(run);
            }

            run.advance(Stage::GeneratingUnit(unit.index));
            if !sink
                .emit(StreamEvent::GeneratingPage {
                    page_number: unit.index,
                })
                .await
            {
                return cancel(run);
            }

            let event = match self.generator.generate(&unit).await {
                Ok(artifact) => {
                    let page = PipelinePage::new(&unit, artifact);
                    run.record_page(page.clone());
                    StreamEvent::PageComplete { page }
                }
                Err(e) => {
                    warn!(page = unit.index, error = %e, "Page failed");
                    let error_msg = e.last.to_string();
                    run.record_page_error(unit.index, error_msg.clone());
                    StreamEvent::PageError {
                        page_number: unit.index,
                        error: error_msg,
                    }
                }
            };

            if !sink.emit(event).await {
                return cancel(run);
            }
        }

        run.complete();
        info!(
            pages = run.pages.len(),
            failed = run.page_errors.len(),
            "Run completed"
        );
        sink.emit(StreamEvent::Complete).await;

        run
    }

    /// Synthesize and segment; both failures are global
    async fn script_units(&self, run: &PipelineRun) -> Result<Vec<Unit>, UpstreamError> {
        let raw = self.synthesizer.synthesize(&run.topic).await?;
        let units = segment(&raw, self.synthesizer.delimiter());
        if units.is_empty() {
            return Err(UpstreamError::NoUnits);
        }
        Ok(units)
    }
}

fn cancel(mut run: PipelineRun) -> PipelineRun {
    info!(stage = ?run.stage, "Consumer disconnected, stopping run");
    run.cancel();
    run
}
