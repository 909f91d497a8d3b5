use crate::api::models::AppState;
use crate::api::review::handlers::*;
use axum::{
    routing::get,
    Router,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/reviews",
            get(list_reviews_handler).post(create_review_handler),
        )
        .route(
            "/api/reviews/{id}",
            get(get_review_handler)
                .put(update_review_handler)
                .delete(delete_review_handler),
        )
}
