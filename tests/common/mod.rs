#![allow(dead_code)]

use async_trait::async_trait;
use scout_chat::api::{ChatBackend, ChatRequest, HistoryRecord, ImageUpload};
use scout_chat::error::{Result, ScoutError};
use scout_chat::storage::{KeyValueStore, MemoryStore};
use scout_chat::widget::{ChatWidget, WidgetSettings};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub enum HistoryReply {
    Records(Vec<HistoryRecord>),
    Empty,
    Fail,
}

/// Backend double with scripted replies that records every call.
pub struct FakeBackend {
    history: Mutex<HistoryReply>,
    chat_replies: Mutex<VecDeque<Result<String>>>,
    upload_reply: Mutex<Option<Result<String>>>,
    create_fails: AtomicBool,
    create_status: Mutex<Option<u16>>,
    hang_chat: AtomicBool,
    pub history_requests: Mutex<Vec<String>>,
    pub created_sessions: Mutex<Vec<String>>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub uploads: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            history: Mutex::new(HistoryReply::Empty),
            chat_replies: Mutex::new(VecDeque::new()),
            upload_reply: Mutex::new(None),
            create_fails: AtomicBool::new(false),
            create_status: Mutex::new(None),
            hang_chat: AtomicBool::new(false),
            history_requests: Mutex::new(Vec::new()),
            created_sessions: Mutex::new(Vec::new()),
            chat_requests: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_history(self, records: serde_json::Value) -> Self {
        let records: Vec<HistoryRecord> = serde_json::from_value(records).unwrap();
        *self.history.lock().unwrap() = HistoryReply::Records(records);
        self
    }

    pub fn failing_history(self) -> Self {
        *self.history.lock().unwrap() = HistoryReply::Fail;
        self
    }

    pub fn reply(self, text: &str) -> Self {
        self.chat_replies
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
        self
    }

    pub fn chat_error(self, status: u16, message: &str) -> Self {
        self.chat_replies
            .lock()
            .unwrap()
            .push_back(Err(ScoutError::ApiError {
                status,
                message: message.to_string(),
            }));
        self
    }

    pub fn upload_url(self, url: &str) -> Self {
        *self.upload_reply.lock().unwrap() = Some(Ok(url.to_string()));
        self
    }

    pub fn upload_error(self) -> Self {
        *self.upload_reply.lock().unwrap() = Some(Err(ScoutError::ApiError {
            status: 400,
            message: "Upload failed".to_string(),
        }));
        self
    }

    /// Session creation never reaches the server.
    pub fn failing_create(self) -> Self {
        self.create_fails.store(true, Ordering::SeqCst);
        self
    }

    /// Session creation reaches the server, which answers with `status`.
    pub fn create_status(self, status: u16) -> Self {
        *self.create_status.lock().unwrap() = Some(status);
        self
    }

    pub fn hanging_chat(self) -> Self {
        self.hang_chat.store(true, Ordering::SeqCst);
        self
    }

    pub fn last_chat_request(&self) -> ChatRequest {
        self.chat_requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no chat request was made")
    }

    pub fn chat_count(&self) -> usize {
        self.chat_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn get_chat_history(&self, session_id: &str) -> Result<Option<Vec<HistoryRecord>>> {
        self.history_requests
            .lock()
            .unwrap()
            .push(session_id.to_string());
        match &*self.history.lock().unwrap() {
            HistoryReply::Records(records) => Ok(Some(records.clone())),
            HistoryReply::Empty => Ok(None),
            HistoryReply::Fail => Err(ScoutError::ApiError {
                status: 500,
                message: "history unavailable".to_string(),
            }),
        }
    }

    async fn create_session(&self, session_id: &str) -> Result<()> {
        self.created_sessions
            .lock()
            .unwrap()
            .push(session_id.to_string());
        if self.create_fails.load(Ordering::SeqCst) {
            return Err(ScoutError::Other("connection refused".to_string()));
        }
        if let Some(status) = *self.create_status.lock().unwrap() {
            return Err(ScoutError::ApiError {
                status,
                message: "Failed to create session".to_string(),
            });
        }
        Ok(())
    }

    async fn upload(&self, upload: &ImageUpload) -> Result<String> {
        self.uploads.lock().unwrap().push(upload.file_name.clone());
        self.upload_reply
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok("https://cdn.example/upload.png".to_string()))
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        self.chat_requests.lock().unwrap().push(request.clone());
        if self.hang_chat.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let next = self.chat_replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok("Happy to help!".to_string()))
    }
}

/// Store whose writes always fail.
pub struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, key: &str, _value: &str) -> Result<()> {
        Err(ScoutError::StorageError(format!("cannot write {}", key)))
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

pub struct Harness {
    pub widget: ChatWidget,
    pub backend: Arc<FakeBackend>,
    pub durable: Arc<MemoryStore>,
    pub session_store: Arc<MemoryStore>,
}

pub fn settings() -> WidgetSettings {
    WidgetSettings {
        verbose: false,
        auto_open: false,
        ..WidgetSettings::default()
    }
}

pub fn harness(backend: FakeBackend) -> Harness {
    harness_with_durable(backend, Arc::new(MemoryStore::new()))
}

pub fn harness_with_durable(backend: FakeBackend, durable: Arc<MemoryStore>) -> Harness {
    let backend = Arc::new(backend);
    let session_store = Arc::new(MemoryStore::new());
    let widget = ChatWidget::new(
        backend.clone(),
        durable.clone(),
        session_store.clone(),
        settings(),
    );
    Harness {
        widget,
        backend,
        durable,
        session_store,
    }
}

pub fn two_record_history() -> serde_json::Value {
    json!([
        { "id": "h1", "content": "I found droppings in the pantry", "role": "user", "timestamp": "2025-04-02T09:00:00Z" },
        { "id": "h2", "content": "That sounds like **mice**.", "role": "assistant", "timestamp": "2025-04-02T09:00:05Z" }
    ])
}
