//! REST API server for meetcost.
//!
//! Provides HTTP endpoints for:
//! - Tracker control (start, pause, stop, config edits, snapshot)
//! - Meeting history and statistics
//! - Calendar event import
//! - Subscription info

pub mod error;
pub mod routes;

use crate::config::Config;
use crate::db::Database;
use crate::meeting::TrackerStatusHandle;
use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tracing::info;

pub use routes::calendar::CalendarState;
pub use routes::meetings::MeetingsState;
pub use routes::tracker::{ApiCommand, ConfigUpdateRequest, TrackerState};

pub struct ApiServer {
    port: u16,
    tracker_state: TrackerState,
    meetings_state: MeetingsState,
    calendar_state: CalendarState,
}

impl ApiServer {
    pub fn new(
        tx: tokio::sync::mpsc::Sender<ApiCommand>,
        status: TrackerStatusHandle,
        db: Database,
        config: &Config,
    ) -> Self {
        let subscription = config.subscription.clone();
        Self {
            port: config.server.port,
            tracker_state: TrackerState {
                tx: tx.clone(),
                status,
                subscription: subscription.clone(),
            },
            meetings_state: MeetingsState {
                db,
                subscription: subscription.clone(),
            },
            calendar_state: CalendarState {
                tx,
                defaults: config.tracker.clone(),
                rates: config.rates.clone(),
                subscription,
            },
        }
    }

    pub fn router(&self) -> Router {
        let subscription = self.tracker_state.subscription.clone();
        Router::new()
            // Root and version endpoints
            .route("/", get(status))
            .route("/version", get(version))
            .merge(routes::tracker::router(self.tracker_state.clone()))
            .merge(routes::meetings::router(self.meetings_state.clone()))
            .merge(routes::calendar::router(self.calendar_state.clone()))
            .merge(routes::subscription::router(subscription))
            .layer(ServiceBuilder::new())
    }

    pub async fn start(self) -> Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(&format!("127.0.0.1:{}", self.port)).await?;

        info!("API server listening on http://127.0.0.1:{}", self.port);
        info!("Endpoints:");
        info!("  GET  /                 - Service info");
        info!("  GET  /version          - Get version info");
        info!("  GET  /tracker          - Get tracker snapshot");
        info!("  PUT  /tracker/config   - Edit one config field");
        info!("  POST /tracker/preview  - Price a config edit without applying it");
        info!("  POST /tracker/start    - Start or resume the meeting");
        info!("  POST /tracker/pause    - Pause the meeting");
        info!("  POST /tracker/stop     - Stop and record the meeting");
        info!("  GET  /meetings         - List finished meetings");
        info!("  GET  /meetings/:id     - Get a single meeting");
        info!("  GET  /meetings/stats   - Meeting statistics");
        info!("  POST /calendar/import  - Import a calendar event");
        info!("  GET  /subscription     - Current plan and features");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn status() -> Json<Value> {
    Json(json!({
        "service": "meetcost",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": "meetcost"
    }))
}
