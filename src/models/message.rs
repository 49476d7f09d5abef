use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Map a backend transcript role onto a sender. Unknown roles are shown as the bot.
    pub fn from_role(role: &str) -> Self {
        match role {
            "user" => Sender::User,
            _ => Sender::Bot,
        }
    }
}

/// One element of a structured message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: String },
    Image { image: Option<String> },
}

/// Message body: plain text or a list of structured parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Concatenated text of the body, skipping image parts.
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::Image { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

/// Lifecycle of a message body. A bot reply starts `Pending` while the
/// request is in flight and is resolved in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "content", rename_all = "lowercase")]
pub enum MessageState {
    Pending,
    Resolved(MessageContent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: Sender,
    pub state: MessageState,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<MessageContent>, image_url: Option<String>) -> Self {
        Self {
            id: generate_message_id(),
            sender: Sender::User,
            state: MessageState::Resolved(content.into()),
            timestamp: Utc::now(),
            image_url,
        }
    }

    pub fn bot(content: impl Into<MessageContent>) -> Self {
        Self {
            id: generate_message_id(),
            sender: Sender::Bot,
            state: MessageState::Resolved(content.into()),
            timestamp: Utc::now(),
            image_url: None,
        }
    }

    /// The "typing" placeholder shown while a reply is outstanding.
    pub fn pending() -> Self {
        Self {
            id: generate_message_id(),
            sender: Sender::Bot,
            state: MessageState::Pending,
            timestamp: Utc::now(),
            image_url: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, MessageState::Pending)
    }

    pub fn content(&self) -> Option<&MessageContent> {
        match &self.state {
            MessageState::Pending => None,
            MessageState::Resolved(content) => Some(content),
        }
    }

    pub fn resolve(&mut self, content: impl Into<MessageContent>) {
        self.state = MessageState::Resolved(content.into());
    }
}

/// Unique id built from the generation time and a random suffix.
pub fn generate_message_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &suffix[..7])
}
