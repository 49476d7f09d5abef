use crate::api::models::{ChatRequest, HistoryRecord, ImageUpload};
use crate::error::Result;
use async_trait::async_trait;

/// The remote endpoints a widget talks to.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `GET /api/get-chat-history`. `Ok(None)` when the reply carries no transcript.
    async fn get_chat_history(&self, session_id: &str) -> Result<Option<Vec<HistoryRecord>>>;

    /// `POST /api/create-session`
    async fn create_session(&self, session_id: &str) -> Result<()>;

    /// `POST /api/upload`, returning the stored file URL
    async fn upload(&self, upload: &ImageUpload) -> Result<String>;

    /// `POST /api/chat`, returning the reply text
    async fn chat(&self, request: &ChatRequest) -> Result<String>;
}
