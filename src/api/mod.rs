pub mod backend;
pub mod client;
pub mod models;
pub mod response;

pub use backend::ChatBackend;
pub use client::HttpBackend;
pub use models::{ChatRequest, HistoryEntry, HistoryRecord, ImageUpload};
