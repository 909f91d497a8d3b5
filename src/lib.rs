pub mod api;
pub mod config;
pub mod models;
pub mod seed;
pub mod storage;

pub use api::{router, AppState};
pub use config::{AppConfig, StoreBackend};
pub use models::Review;
pub use storage::{Document, DocumentStore, JsonlStore, MemoryStore, StorageError};
