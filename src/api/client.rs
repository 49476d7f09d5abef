use crate::api::backend::ChatBackend;
use crate::api::models::{ChatRequest, CreateSessionRequest, HistoryRecord, ImageUpload};
use crate::api::response::{
    extract_chat_response, extract_error, extract_history, extract_upload_url,
};
use crate::error::{Result, ScoutError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

/// `ChatBackend` speaking JSON over HTTP to the widget API.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn read_json(response: reqwest::Response) -> Result<(u16, Value)> {
        let status = response.status().as_u16();
        let text = response.text().await?;
        // Error pages are not always JSON; keep the status and treat the body as empty.
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok((status, body))
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn get_chat_history(&self, session_id: &str) -> Result<Option<Vec<HistoryRecord>>> {
        let response = self
            .http
            .get(self.endpoint("get-chat-history"))
            .query(&[("sessionId", session_id)])
            .send()
            .await?;

        let (status, body) = Self::read_json(response).await?;
        if !(200..300).contains(&status) {
            return Err(ScoutError::ApiError {
                status,
                message: extract_error(&body, "Failed to load chat history"),
            });
        }
        extract_history(body)
    }

    async fn create_session(&self, session_id: &str) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint("create-session"))
            .json(&CreateSessionRequest {
                session_id: session_id.to_string(),
            })
            .send()
            .await?;

        let (status, body) = Self::read_json(response).await?;
        if !(200..300).contains(&status) {
            return Err(ScoutError::ApiError {
                status,
                message: extract_error(&body, "Failed to create session"),
            });
        }
        Ok(())
    }

    async fn upload(&self, upload: &ImageUpload) -> Result<String> {
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        let (status, body) = Self::read_json(response).await?;
        extract_upload_url(status, &body)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint("chat"))
            .json(request)
            .send()
            .await?;

        let (status, body) = Self::read_json(response).await?;
        extract_chat_response(status, &body)
    }
}
