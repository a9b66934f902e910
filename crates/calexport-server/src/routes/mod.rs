pub mod download;
pub mod views;

use axum::{Router, routing::get};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::state::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let ics_route = state.links().ics_route().to_string();

    Router::new()
        .merge(download::router(&ics_route))
        .merge(views::router())
        .route("/health", get(health))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// GET /health
async fn health() -> &'static str {
    "ok"
}
