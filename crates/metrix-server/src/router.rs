//! Axum router wiring.

use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::{api, app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/update/:kind/:name/:value", post(api::update::update_path))
        .route("/update/", post(api::update::update_json))
        .route("/updates/", post(api::update::update_batch))
        .route("/value/:kind/:name", get(api::value::value_path))
        .route("/value/", post(api::value::value_json))
        .route("/metrics", get(ops::metrics))
        .route("/ping", get(ops::ping))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
