pub mod models;
pub mod review;

// Re-exports
pub use models::*;

use crate::storage::DocumentStore;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Health check; a store that cannot count its reviews reports `degraded`.
pub async fn health_handler(State(state): State<AppState>) -> Response {
    match state.with_reviews(|store| store.count()).await {
        Ok(total_reviews) => Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            total_reviews,
        })
        .into_response(),
        Err(err) => {
            warn!(error = ?err, "Health check could not read the review store");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    total_reviews: 0,
                }),
            )
                .into_response()
        }
    }
}

/// Full application router: routes, permissive CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .merge(review::routes())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
