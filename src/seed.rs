use crate::models::Review;
use crate::storage::{DocumentStore, StorageError};
use tracing::info;

pub const SEED_REVIEW_ID: &str = "Nguyen Van A";

/// The fixed record written on every process start.
pub fn seed_review() -> Review {
    Review {
        id: Some(SEED_REVIEW_ID.to_string()),
        username: Some("Sunrise Hotel".to_string()),
        book_title: None,
        rating: 4,
        comment: Some("Phòng đẹp, sạch sẽ".to_string()),
    }
}

/// Upsert the seed review. Runs unconditionally; the fixed id keeps restarts
/// from duplicating it.
pub fn seed_reviews(store: &dyn DocumentStore<Review>) -> Result<Review, StorageError> {
    let review = store.save(seed_review())?;
    info!(id = SEED_REVIEW_ID, "Seeded startup review");
    Ok(review)
}
