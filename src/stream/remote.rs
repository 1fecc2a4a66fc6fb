//! HTTP consumer for a running panelforge server.

use anyhow::{Context, Result};
use futures::StreamExt;
use serde_json::json;
use tracing::debug;

use crate::domain::StreamEvent;

use super::codec::StreamDecoder;
use super::consumer::{Flow, StoryProgress};

/// Post `topic` to `url` and drive `on_event` with each decoded event.
///
/// Reading stops at the first terminal event. The returned progress is the
/// reconstructed state of the run.
pub async fn fetch_story<F>(url: &str, topic: &str, mut on_event: F) -> Result<StoryProgress>
where
    F: FnMut(&StreamEvent, &StoryProgress),
{
    let client = reqwest::Client::new();
    let response = client
        .post(url)
        .json(&json!({ "topic": topic }))
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", url))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Server returned {}: {}", status, body.trim());
    }

    let mut decoder = StreamDecoder::new();
    let mut progress = StoryProgress::new();
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let chunk = chunk.context("Failed to read event stream")?;
        for event in decoder.feed(&chunk) {
            let flow = progress.apply(&event);
            on_event(&event, &progress);
            if flow == Flow::Stop {
                return Ok(progress);
            }
        }
    }

    debug!(pending = decoder.pending(), "Stream closed without terminal event");
    anyhow::bail!("Event stream closed before the run finished")
}
