//! Axum router construction for the page routes.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /view/{title}` -- render a page
/// - `GET /edit/{title}` -- edit form for a page
/// - `POST /save/{title}` -- store a page and redirect to its view
///
/// Every request runs inside a `tower-http` trace span.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/view/{title}", get(handlers::view))
        .route("/edit/{title}", get(handlers::edit))
        .route("/save/{title}", post(handlers::save))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
