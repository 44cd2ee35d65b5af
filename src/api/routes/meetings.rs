//! Meeting history API endpoints.
//!
//! Provides HTTP endpoints for:
//! - Listing finished meetings (GET /meetings)
//! - Getting a specific meeting (GET /meetings/:id)
//! - Aggregate statistics (GET /meetings/stats, analytics plan only)

use crate::api::error::{require_feature, ApiError, ApiResult};
use crate::db::{Database, MeetingRecord, MeetingRepository, MeetingStats};
use crate::subscription::{Feature, SubscriptionInfo};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

const DEFAULT_LIST_LIMIT: usize = 20;

/// Shared state for meeting history routes.
#[derive(Clone)]
pub struct MeetingsState {
    pub db: Database,
    pub subscription: SubscriptionInfo,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    /// Maximum results (default 20)
    pub limit: Option<usize>,
}

pub fn router(state: MeetingsState) -> Router {
    Router::new()
        .route("/meetings", get(list_meetings))
        .route("/meetings/stats", get(meeting_stats))
        .route("/meetings/:id", get(get_meeting))
        .with_state(state)
}

/// Run a repository call on the blocking pool.
async fn with_connection<T, F>(db: Database, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Connection) -> anyhow::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let conn = db.connect()?;
        f(&conn)
    })
    .await
    .map_err(|e| ApiError::internal(format!("Database task failed: {}", e)))?
    .map_err(ApiError::from)
}

async fn list_meetings(
    State(state): State<MeetingsState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let meetings: Vec<MeetingRecord> =
        with_connection(state.db, move |conn| MeetingRepository::list(conn, limit)).await?;

    Ok(Json(json!({
        "meetings": meetings,
        "count": meetings.len(),
    })))
}

async fn get_meeting(
    State(state): State<MeetingsState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MeetingRecord>> {
    let meeting = with_connection(state.db, move |conn| MeetingRepository::get(conn, id))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Meeting {} not found", id)))?;

    Ok(Json(meeting))
}

async fn meeting_stats(State(state): State<MeetingsState>) -> ApiResult<Json<MeetingStats>> {
    require_feature(&state.subscription, Feature::Analytics)?;
    let stats = with_connection(state.db, MeetingRepository::stats).await?;
    Ok(Json(stats))
}
