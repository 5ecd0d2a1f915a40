//! Axum router construction for the observer server.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled so dashboards served from elsewhere can connect.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the observer server.
///
/// - `GET /` -- minimal HTML status page
/// - `GET /data` -- `WebSocket` broadcast frame stream
/// - `GET /echo` -- one-shot JSON snapshot
///
/// CORS allows any origin; the monitor carries no credentials.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/data", get(ws::ws_data))
        .route("/echo", get(handlers::echo))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
