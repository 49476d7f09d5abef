use super::{ChatWidget, CHAT_APOLOGY, IMAGE_ONLY_PROMPT, IMAGE_ONLY_TEXT, SESSION_APOLOGY};
use crate::api::{ChatRequest, HistoryEntry};
use crate::models::Message;
use crate::ui::output::{log_error, log_verbose};

impl ChatWidget {
    /// Send the current input (and staged image) to the chat endpoint.
    ///
    /// Returns false without touching anything when there is nothing to send or a
    /// request is already in flight. Otherwise the user message and a pending
    /// reply are appended, and the reply is resolved in place once the backend
    /// answers (or with an apology when it fails).
    pub async fn send(&mut self) -> bool {
        let text = self.input.trim().to_string();
        if (text.is_empty() && self.staged_image.is_none()) || self.loading {
            return false;
        }

        let history = self.history_snapshot();
        let image_url = self.staged_image.take();
        self.input.clear();
        if image_url.is_some() {
            self.emit(super::WidgetEvent::StagedImageChanged(None));
        }

        let user_text = if text.is_empty() {
            IMAGE_ONLY_TEXT.to_string()
        } else {
            text.clone()
        };
        self.push_message(Message::user(user_text, image_url.clone()));

        let placeholder = Message::pending();
        let placeholder_id = placeholder.id.clone();
        self.push_message(placeholder);
        self.set_loading(true);

        let session_id = match self.ensure_session().await {
            Ok(session_id) => session_id,
            Err(e) => {
                log_error(&format!("Error creating session: {}", e));
                self.remove_message(&placeholder_id);
                self.push_message(Message::bot(SESSION_APOLOGY));
                self.set_loading(false);
                return true;
            }
        };

        let request = ChatRequest {
            message: if text.is_empty() {
                IMAGE_ONLY_PROMPT.to_string()
            } else {
                text
            },
            history,
            session_id,
            image_url,
        };

        log_verbose(
            self.settings.verbose,
            &format!(
                "Sending message with {} prior message(s){}",
                request.history.len(),
                if request.image_url.is_some() { " and an image" } else { "" }
            ),
        );

        let reply = match self.backend.chat(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                log_error(&format!("Error getting AI response: {}", e));
                CHAT_APOLOGY.to_string()
            }
        };

        self.resolve_message(&placeholder_id, reply);
        self.set_loading(false);
        true
    }

    /// Transcript as it stands before the outgoing message, without placeholders.
    fn history_snapshot(&self) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .filter_map(|message| {
                message.content().map(|content| HistoryEntry {
                    sender: message.sender,
                    content: content.clone(),
                })
            })
            .collect()
    }
}
