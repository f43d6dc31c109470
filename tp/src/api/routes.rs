//! API route handlers

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::pipeline::{Pipeline, ProgressEvent};

const PROGRESS_BUFFER: usize = 16;

/// Application state shared by all handlers
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// Body of a plan generation request
#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub project_statement: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Generate a plan, streaming progress as server-sent events
///
/// The pipeline runs in its own task; the stream ends after the completion
/// or error event.
pub async fn generate_plan(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlanRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(statement_len = request.project_statement.len(), "generate_plan: request received");
    let (tx, rx) = mpsc::channel(PROGRESS_BUFFER);
    tokio::spawn(drive_pipeline(state.pipeline.clone(), request.project_statement, tx));

    let events = stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((Ok::<_, Infallible>(to_sse_event(&event)), rx))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

async fn drive_pipeline(pipeline: Arc<Pipeline>, statement: String, tx: mpsc::Sender<ProgressEvent>) {
    if tx.send(ProgressEvent::starting()).await.is_err() {
        debug!("drive_pipeline: client gone before start");
        return;
    }

    let progress = tx.clone();
    let run = tokio::spawn(async move { pipeline.run_with_progress(&statement, &progress).await });

    let last = match run.await {
        Ok(state) => ProgressEvent::completed(state),
        Err(e) => {
            error!(error = %e, "pipeline task failed");
            ProgressEvent::failed(format!("Error: {}", e))
        }
    };

    if tx.send(last).await.is_err() {
        debug!("drive_pipeline: client disconnected before completion");
    }
}

const SERIALIZE_FAILED_EVENT: &str =
    r#"{"status":"error","agent":"system","message":"Error: failed to serialize progress event"}"#;

fn to_sse_event(event: &ProgressEvent) -> Event {
    Event::default().json_data(event).unwrap_or_else(|e| {
        error!(error = %e, "failed to serialize progress event");
        Event::default().data(SERIALIZE_FAILED_EVENT)
    })
}
