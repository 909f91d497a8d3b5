use crate::api::models::*;
use crate::models::Review;
use crate::storage::DocumentStore;
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

pub async fn list_reviews_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = state.with_reviews(|store| store.find_all()).await?;

    info!(count = reviews.len(), "Listed reviews");

    Ok(Json(reviews))
}

pub async fn get_review_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Review>, AppError> {
    let lookup = id.clone();
    let review = state
        .with_reviews(move |store| store.find_by_id(&lookup))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Review {} not found", id)))?;

    Ok(Json(review))
}

pub async fn create_review_handler(
    State(state): State<AppState>,
    Json(review): Json<Review>,
) -> Result<Json<Review>, AppError> {
    let saved = state.with_reviews(move |store| store.save(review)).await?;

    info!(id = ?saved.id, "Review created");

    Ok(Json(saved))
}

/// Full replacement keyed by the path id. The body id is ignored, and an
/// unknown id creates the record.
pub async fn update_review_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut review): Json<Review>,
) -> Result<Json<Review>, AppError> {
    review.id = Some(id);
    let saved = state.with_reviews(move |store| store.save(review)).await?;

    info!(id = ?saved.id, "Review updated");

    Ok(Json(saved))
}

/// Deleting an unknown id still answers 200.
pub async fn delete_review_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(), AppError> {
    let target = id.clone();
    state
        .with_reviews(move |store| store.delete_by_id(&target))
        .await?;

    info!(id = %id, "Review deleted");

    Ok(())
}
