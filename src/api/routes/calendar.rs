//! Calendar import endpoint.
//!
//! POST /calendar/import takes one calendar event and returns the meeting
//! config and estimated cost derived from it. With `?apply=true` the config
//! is also loaded into the tracker.

use crate::api::error::{require_feature, ApiResult};
use crate::calendar::{import_event, CalendarEvent};
use crate::config::TrackerConfig;
use crate::cost::RateTable;
use crate::subscription::{Feature, SubscriptionInfo};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::info;

use super::tracker::{request, snapshot_json, ApiCommand};

#[derive(Clone)]
pub struct CalendarState {
    pub tx: mpsc::Sender<ApiCommand>,
    pub defaults: TrackerConfig,
    pub rates: RateTable,
    pub subscription: SubscriptionInfo,
}

#[derive(Debug, Deserialize, Default)]
pub struct ImportParams {
    #[serde(default)]
    pub apply: bool,
}

pub fn router(state: CalendarState) -> Router {
    Router::new()
        .route("/calendar/import", post(import))
        .with_state(state)
}

async fn import(
    State(state): State<CalendarState>,
    Query(params): Query<ImportParams>,
    Json(event): Json<CalendarEvent>,
) -> ApiResult<Json<Value>> {
    require_feature(&state.subscription, Feature::CalendarImport)?;

    let imported = import_event(&event, &state.defaults, &state.rates)?;
    info!(
        "Imported calendar event '{}' ({} participants)",
        imported.config.title, imported.config.participants
    );

    let snapshot = if params.apply {
        let config = imported.config.clone();
        let snapshot = request(&state.tx, |reply| ApiCommand::LoadConfig(config, reply)).await?;
        Some(snapshot_json(&snapshot, &state.subscription))
    } else {
        None
    };

    Ok(Json(json!({
        "imported": imported,
        "applied": params.apply,
        "snapshot": snapshot,
    })))
}
