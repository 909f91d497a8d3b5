use crate::models::Review;
use crate::storage::{DocumentStore, StorageError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub reviews: Arc<dyn DocumentStore<Review>>,
}

impl AppState {
    pub fn new(reviews: Arc<dyn DocumentStore<Review>>) -> Self {
        Self { reviews }
    }

    /// Run a store operation on the blocking pool; file-backed stores do
    /// synchronous I/O under a lock.
    pub async fn with_reviews<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&dyn DocumentStore<Review>) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.reviews);
        tokio::task::spawn_blocking(move || op(&*store))
            .await
            .map_err(|e| AppError::Internal(format!("Store task failed: {}", e)))?
            .map_err(AppError::from)
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub total_reviews: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Internal(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorResponse {
            error: status.to_string(),
            message,
        }))
        .into_response()
    }
}
