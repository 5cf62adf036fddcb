use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use geo_ingest::{IngestError, IngestSummary};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    response::{ApiResponse, ApiResult},
    AppState,
};
use crate::events::TriggerEvent;

pub fn ingest_routes() -> Router<AppState> {
    Router::new()
        .route("/ingest", post(ingest_document))
        .route("/events", post(handle_event))
}

pub async fn health_check(State(state): State<AppState>) -> Response {
    Json(json!({
        "status": "healthy",
        "table": state.service.pipeline().table_name(),
    }))
    .into_response()
}

/// Ingest a CSV document sent as the raw request body
#[instrument(skip_all, fields(request_id = %Uuid::new_v4(), bytes = body.len()))]
async fn ingest_document(State(state): State<AppState>, body: Bytes) -> ApiResult<IngestSummary> {
    let summary = state.service.ingest(&body).await?;
    info!(records = summary.records, batches = summary.batches, "Document ingested");

    Ok(ApiResponse::success(summary))
}

/// Ingest the document named or carried by a trigger event
#[instrument(skip_all, fields(request_id = %Uuid::new_v4(), bytes = body.len()))]
async fn handle_event(State(state): State<AppState>, body: Bytes) -> ApiResult<IngestSummary> {
    let document = match resolve(&state, &body).await {
        Ok(document) => document,
        Err(e) => return Err(state.service.reject(e).await.into()),
    };

    let summary = state.service.ingest(&document).await?;
    info!(records = summary.records, batches = summary.batches, "Event ingested");

    Ok(ApiResponse::success(summary))
}

async fn resolve(state: &AppState, body: &[u8]) -> Result<Vec<u8>, IngestError> {
    TriggerEvent::from_slice(body)?
        .into_document(state.fetcher.as_ref())
        .await
}
