//! Subscription info endpoint.

use crate::subscription::{Feature, SubscriptionInfo};
use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};

pub fn router(subscription: SubscriptionInfo) -> Router {
    Router::new()
        .route("/subscription", get(subscription_info))
        .with_state(subscription)
}

/// GET /subscription - Current plan and the features it unlocks.
async fn subscription_info(State(subscription): State<SubscriptionInfo>) -> Json<Value> {
    let locked: Vec<Feature> = Feature::ALL
        .into_iter()
        .filter(|feature| !subscription.can_use(*feature))
        .collect();

    Json(json!({
        "tier": subscription.tier,
        "status": subscription.status,
        "effective_tier": subscription.effective_tier(),
        "features": subscription.accessible_features(),
        "locked_features": locked,
    }))
}
