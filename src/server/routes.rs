//! Comic generation endpoints.

use std::convert::Infallible;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::core::EventSink;
use crate::domain::{PageFailure, PipelinePage, RunStatus, Topic, ValidationError};
use crate::stream::event_payload;

use super::AppState;

/// Events buffered between the run task and the response body
const EVENT_BUFFER: usize = 16;

/// Request body for both generation endpoints
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub topic: String,
}

/// Buffered-mode response body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferedResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<PipelinePage>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub page_errors: Vec<PageFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BufferedResponse {
    fn failure(error: String) -> Self {
        Self {
            success: false,
            pages: None,
            page_errors: Vec::new(),
            error: Some(error),
        }
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        warn!(error = %self, "Rejected generation request");
        (
            StatusCode::BAD_REQUEST,
            Json(BufferedResponse::failure(self.to_string())),
        )
            .into_response()
    }
}

pub fn comic_routes() -> Router<AppState> {
    Router::new()
        .route("/api/generate-comic", post(generate_stream))
        .route("/api/generate-comic/buffered", post(generate_buffered))
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

fn parse_topic(
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Topic, ValidationError> {
    let Json(request) = payload.map_err(|e| ValidationError::MalformedBody(e.body_text()))?;
    Topic::parse(&request.topic)
}

/// Run the pipeline and stream its events as `text/event-stream`
async fn generate_stream(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ValidationError> {
    let topic = parse_topic(payload)?;
    info!(%topic, "Streaming generation requested");

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        let sink = EventSink::new(tx);
        orchestrator.run(topic, &sink).await;
    });

    // The body ends when the run task drops its sender
    let events = ReceiverStream::new(rx)
        .map(|event| Ok::<_, Infallible>(Event::default().data(event_payload(&event))));

    // Comment frames go out while a page's backend calls are pending
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Run the pipeline to completion and answer once
async fn generate_buffered(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Response, ValidationError> {
    let topic = parse_topic(payload)?;
    info!(%topic, "Buffered generation requested");

    let run = state.orchestrator.run(topic, &EventSink::detached()).await;

    let response = match run.status {
        RunStatus::Completed => (
            StatusCode::OK,
            Json(BufferedResponse {
                success: true,
                pages: Some(run.pages),
                page_errors: run.page_errors,
                error: None,
            }),
        ),
        RunStatus::Failed { error } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(BufferedResponse::failure(error)),
        ),
        RunStatus::Running | RunStatus::Cancelled => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(BufferedResponse::failure("Failed to generate comic".to_string())),
        ),
    };

    Ok(response.into_response())
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "panelforge"
    }))
}
