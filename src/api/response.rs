use crate::api::models::{HistoryRecord, HistoryResponse};
use crate::error::{Result, ScoutError};
use crate::models::{generate_message_id, Message, MessageContent, MessageState, Sender};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Error text carried by a failed response body, falling back to `default`.
pub fn extract_error(body: &Value, default: &str) -> String {
    body.get("error")
        .and_then(|e| e.as_str())
        .unwrap_or(default)
        .to_string()
}

/// Pull the reply text out of a `/api/chat` response.
pub fn extract_chat_response(status: u16, body: &Value) -> Result<String> {
    if !(200..300).contains(&status) {
        return Err(ScoutError::ApiError {
            status,
            message: extract_error(body, "Failed to get response"),
        });
    }

    body.get("response")
        .and_then(|r| r.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ScoutError::Other("No response in chat reply".to_string()))
}

/// Pull the stored file URL out of a `/api/upload` response.
pub fn extract_upload_url(status: u16, body: &Value) -> Result<String> {
    if !(200..300).contains(&status) {
        return Err(ScoutError::ApiError {
            status,
            message: extract_error(body, "Upload failed"),
        });
    }

    body.get("url")
        .and_then(|u| u.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ScoutError::Other("No url in upload reply".to_string()))
}

/// Transcript records of a history response, `None` when the body has none.
pub fn extract_history(body: Value) -> Result<Option<Vec<HistoryRecord>>> {
    let response: HistoryResponse = serde_json::from_value(body)?;
    Ok(response.messages)
}

/// Convert a backend transcript record into a widget message.
pub fn record_to_message(record: HistoryRecord) -> Message {
    let sender = record
        .role
        .as_deref()
        .map(Sender::from_role)
        .unwrap_or(Sender::Bot);

    let timestamp = record
        .timestamp
        .as_ref()
        .and_then(parse_timestamp)
        .unwrap_or_else(Utc::now);

    Message {
        id: record.id_text().unwrap_or_else(generate_message_id),
        sender,
        state: MessageState::Resolved(
            record
                .content
                .unwrap_or_else(|| MessageContent::Text(String::new())),
        ),
        timestamp,
        image_url: None,
    }
}

fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc))
            .or_else(|| s.parse::<i64>().ok().and_then(DateTime::<Utc>::from_timestamp_millis)),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}
