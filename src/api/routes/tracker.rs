//! Tracker control endpoints.
//!
//! Provides HTTP endpoints for:
//! - Getting the tracker snapshot (GET /tracker)
//! - Editing one config field (PUT /tracker/config)
//! - Pricing a pending edit without committing it (POST /tracker/preview)
//! - Starting, pausing and stopping (POST /tracker/{start,pause,stop})
//!
//! Mutations are sent to the service loop as [`ApiCommand`]s and answered
//! through a oneshot channel, so they are serialized with ticks.

use crate::api::error::{ApiError, ApiResult};
use crate::meeting::{
    ConfigUpdate, CostPreview, MeetingConfig, MeetingStopResult, TrackerError, TrackerSnapshot,
    TrackerStatus, TrackerStatusHandle,
};
use crate::subscription::{Feature, SubscriptionInfo};
use axum::{
    extract::State,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

type Reply<T> = oneshot::Sender<T>;

/// Commands handled by the service loop.
pub enum ApiCommand {
    Start(Reply<Result<TrackerSnapshot, TrackerError>>),
    Pause(Reply<TrackerSnapshot>),
    Stop(Reply<MeetingStopResult>),
    UpdateConfig(ConfigUpdate, Reply<Result<TrackerSnapshot, TrackerError>>),
    Preview(ConfigUpdate, Reply<Result<CostPreview, TrackerError>>),
    LoadConfig(MeetingConfig, Reply<TrackerSnapshot>),
}

#[derive(Clone)]
pub struct TrackerState {
    pub tx: mpsc::Sender<ApiCommand>,
    pub status: TrackerStatusHandle,
    pub subscription: SubscriptionInfo,
}

/// Request body for config edits and previews.
#[derive(Debug, Deserialize)]
pub struct ConfigUpdateRequest {
    pub field: String,
    pub value: Value,
}

impl ConfigUpdateRequest {
    fn into_update(self) -> ApiResult<ConfigUpdate> {
        Ok(ConfigUpdate::from_field(&self.field, &self.value)?)
    }
}

/// Creates the tracker router.
pub fn router(state: TrackerState) -> Router {
    Router::new()
        .route("/tracker", get(tracker_snapshot))
        .route("/tracker/config", put(update_config))
        .route("/tracker/preview", post(preview_config))
        .route("/tracker/start", post(start_tracker))
        .route("/tracker/pause", post(pause_tracker))
        .route("/tracker/stop", post(stop_tracker))
        .with_state(state)
}

/// Send a command to the service loop and wait for its reply.
pub async fn request<T>(
    tx: &mpsc::Sender<ApiCommand>,
    command: impl FnOnce(Reply<T>) -> ApiCommand,
) -> ApiResult<T> {
    let (reply_tx, reply_rx) = oneshot::channel();
    tx.send(command(reply_tx)).await.map_err(|e| {
        error!("Failed to send tracker command: {}", e);
        ApiError::internal("Tracker service is not running")
    })?;
    reply_rx
        .await
        .map_err(|_| ApiError::internal("Tracker service dropped the request"))
}

/// Render a snapshot, hiding the cost trend below the plan that includes it.
pub fn snapshot_json(snapshot: &TrackerSnapshot, subscription: &SubscriptionInfo) -> Value {
    let mut value = serde_json::to_value(snapshot).unwrap_or_else(|_| json!({}));
    if !subscription.can_use(Feature::CostTrend) {
        value["cost_history"] = Value::Null;
        value["cost_history_locked"] = Value::Bool(true);
    }
    value
}

async fn tracker_snapshot(State(state): State<TrackerState>) -> Json<Value> {
    let status = state.status.get().await;
    Json(status_json(&status, &state.subscription))
}

/// Snapshot plus the most recently stopped meeting, if any.
fn status_json(status: &TrackerStatus, subscription: &SubscriptionInfo) -> Value {
    let mut value = snapshot_json(&status.snapshot, subscription);
    value["last_meeting"] = match &status.last_summary {
        Some(summary) => json!({
            "meeting_id": status.last_meeting_id,
            "summary": summary,
        }),
        None => Value::Null,
    };
    value
}

async fn update_config(
    State(state): State<TrackerState>,
    Json(body): Json<ConfigUpdateRequest>,
) -> ApiResult<Json<Value>> {
    let update = body.into_update()?;
    info!("Config update received via API: {}", update.field_name());

    let snapshot = request(&state.tx, |reply| ApiCommand::UpdateConfig(update, reply)).await??;
    Ok(Json(snapshot_json(&snapshot, &state.subscription)))
}

async fn preview_config(
    State(state): State<TrackerState>,
    Json(body): Json<ConfigUpdateRequest>,
) -> ApiResult<Json<CostPreview>> {
    let update = body.into_update()?;
    let preview = request(&state.tx, |reply| ApiCommand::Preview(update, reply)).await??;
    Ok(Json(preview))
}

async fn start_tracker(State(state): State<TrackerState>) -> ApiResult<Json<Value>> {
    info!("Start command received via API");
    let snapshot = request(&state.tx, ApiCommand::Start).await??;
    Ok(Json(json!({
        "success": true,
        "state": snapshot.state.as_str(),
        "snapshot": snapshot_json(&snapshot, &state.subscription),
    })))
}

async fn pause_tracker(State(state): State<TrackerState>) -> ApiResult<Json<Value>> {
    info!("Pause command received via API");
    let snapshot = request(&state.tx, ApiCommand::Pause).await?;
    Ok(Json(json!({
        "success": true,
        "state": snapshot.state.as_str(),
        "snapshot": snapshot_json(&snapshot, &state.subscription),
    })))
}

async fn stop_tracker(State(state): State<TrackerState>) -> ApiResult<Json<Value>> {
    info!("Stop command received via API");
    let result = request(&state.tx, ApiCommand::Stop).await?;
    let summary = &result.summary;
    Ok(Json(json!({
        "success": true,
        "meeting_id": result.meeting_id,
        "total_cost": summary.total_cost,
        "duration_seconds": summary.elapsed_seconds,
        "efficiency": summary.efficiency.map(|e| e.as_str()),
        "summary": summary,
    })))
}
