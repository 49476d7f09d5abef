use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use scout_chat::api::{ChatBackend, ChatRequest, HistoryEntry, HttpBackend, ImageUpload};
use scout_chat::error::ScoutError;
use scout_chat::models::{MessageContent, Sender};
use scout_chat::storage::MemoryStore;
use scout_chat::widget::{ChatWidget, WidgetSettings, CHAT_APOLOGY, SESSION_APOLOGY};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorded {
    chats: Mutex<Vec<Value>>,
    sessions: Mutex<Vec<String>>,
    uploads: Mutex<Vec<(String, String, usize)>>,
}

type Shared = Arc<Recorded>;

async fn history(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("sessionId").map(String::as_str) {
        Some("known") => Json(json!({
            "messages": [
                { "id": "a", "content": "ants again", "role": "user", "timestamp": "2025-05-01T12:00:00Z" },
                { "id": "b", "content": "Try bait stations.", "role": "assistant" }
            ]
        }))
        .into_response(),
        Some("broken") => (StatusCode::INTERNAL_SERVER_ERROR, "db down").into_response(),
        Some("garbled") => "<html>maintenance</html>".into_response(),
        _ => Json(json!({})).into_response(),
    }
}

async fn create_session(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let session_id = body["sessionId"].as_str().unwrap_or_default().to_string();
    state.sessions.lock().unwrap().push(session_id.clone());
    if session_id == "fail" {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "down" }))).into_response();
    }
    Json(json!({ "success": true })).into_response()
}

async fn upload(State(state): State<Shared>, mut multipart: Multipart) -> Response {
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await.unwrap();
        state
            .uploads
            .lock()
            .unwrap()
            .push((file_name.clone(), content_type, data.len()));

        if file_name == "huge.png" {
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "error": "File too large" })),
            )
                .into_response();
        }
        return Json(json!({ "url": format!("https://cdn.test/{}", file_name) })).into_response();
    }
    (StatusCode::BAD_REQUEST, Json(json!({ "error": "No file provided" }))).into_response()
}

async fn chat(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    state.chats.lock().unwrap().push(body.clone());
    match body["message"].as_str().unwrap_or_default() {
        "explode" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "boom" })),
        )
            .into_response(),
        "gateway" => (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").into_response(),
        message => Json(json!({ "response": format!("echo: {}", message) })).into_response(),
    }
}

async fn serve() -> (String, Shared) {
    let state: Shared = Arc::new(Recorded::default());
    let router = Router::new()
        .route("/api/get-chat-history", get(history))
        .route("/api/create-session", post(create_session))
        .route("/api/upload", post(upload))
        .route("/api/chat", post(chat))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

fn request(message: &str) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        history: vec![HistoryEntry {
            sender: Sender::Bot,
            content: MessageContent::from("Hi there!"),
        }],
        session_id: "s-1".to_string(),
        image_url: None,
    }
}

#[tokio::test]
async fn test_chat_sends_camel_case_body() {
    let (base_url, state) = serve().await;
    let backend = HttpBackend::new(&format!("{}/", base_url)).unwrap();
    assert_eq!(backend.base_url(), base_url);

    let mut req = request("silverfish in the tub");
    req.image_url = Some("https://cdn.test/a.png".to_string());
    let reply = backend.chat(&req).await.unwrap();
    assert_eq!(reply, "echo: silverfish in the tub");

    let body = state.chats.lock().unwrap()[0].clone();
    assert_eq!(body["sessionId"], "s-1");
    assert_eq!(body["imageUrl"], "https://cdn.test/a.png");
    assert_eq!(body["history"][0]["sender"], "bot");
    assert_eq!(body["history"][0]["content"], "Hi there!");
}

#[tokio::test]
async fn test_chat_error_status_maps_to_api_error() {
    let (base_url, _state) = serve().await;
    let backend = HttpBackend::new(&base_url).unwrap();

    match backend.chat(&request("explode")).await {
        Err(ScoutError::ApiError { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("unexpected result: {:?}", other),
    }

    match backend.chat(&request("gateway")).await {
        Err(ScoutError::ApiError { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "Failed to get response");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_history_lookup() {
    let (base_url, _state) = serve().await;
    let backend = HttpBackend::new(&base_url).unwrap();

    let records = backend.get_chat_history("known").await.unwrap().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].role.as_deref(), Some("user"));
    assert_eq!(records[1].id_text().as_deref(), Some("b"));

    assert!(backend.get_chat_history("fresh").await.unwrap().is_none());

    match backend.get_chat_history("broken").await {
        Err(ScoutError::ApiError { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Failed to load chat history");
        }
        other => panic!("unexpected result: {:?}", other),
    }

    // A 200 page that is not JSON carries no transcript
    assert!(backend.get_chat_history("garbled").await.is_err());
}

#[tokio::test]
async fn test_create_session() {
    let (base_url, state) = serve().await;
    let backend = HttpBackend::new(&base_url).unwrap();

    backend.create_session("new-session").await.unwrap();
    assert!(backend.create_session("fail").await.is_err());
    assert_eq!(
        *state.sessions.lock().unwrap(),
        vec!["new-session".to_string(), "fail".to_string()]
    );
}

#[tokio::test]
async fn test_upload_multipart() {
    let (base_url, state) = serve().await;
    let backend = HttpBackend::new(&base_url).unwrap();

    let url = backend
        .upload(&ImageUpload::new("wasp.png", vec![7; 16]))
        .await
        .unwrap();
    assert_eq!(url, "https://cdn.test/wasp.png");
    assert_eq!(
        state.uploads.lock().unwrap()[0],
        ("wasp.png".to_string(), "image/png".to_string(), 16)
    );

    match backend.upload(&ImageUpload::new("huge.png", vec![0; 4])).await {
        Err(ScoutError::ApiError { status, message }) => {
            assert_eq!(status, 413);
            assert_eq!(message, "File too large");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_widget_over_http_shows_apology_on_chat_error() {
    let (base_url, state) = serve().await;
    let backend = Arc::new(HttpBackend::new(&base_url).unwrap());
    let durable = Arc::new(MemoryStore::new());
    let mut widget = ChatWidget::new(
        backend,
        durable,
        Arc::new(MemoryStore::new()),
        WidgetSettings {
            auto_open: false,
            ..WidgetSettings::default()
        },
    );
    widget.mount().await;

    widget.set_input("explode");
    widget.send().await;

    let reply = widget.messages().last().unwrap();
    assert_eq!(reply.content().unwrap().text(), CHAT_APOLOGY);
    assert_eq!(state.sessions.lock().unwrap().len(), 1);
    assert_eq!(
        state.chats.lock().unwrap()[0]["sessionId"],
        widget.session().session_id.as_str()
    );
}

#[tokio::test]
async fn test_widget_with_unreachable_server_apologizes_for_session() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = Arc::new(HttpBackend::new(&format!("http://{}", addr)).unwrap());
    let mut widget = ChatWidget::new(
        backend,
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
        WidgetSettings {
            auto_open: false,
            ..WidgetSettings::default()
        },
    );
    widget.mount().await;

    widget.set_input("anyone home?");
    assert!(widget.send().await);

    let messages = widget.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].content().unwrap().text(), SESSION_APOLOGY);
    assert!(widget.session().created);
    assert!(!widget.is_loading());
}
