use super::ChatWidget;
use crate::api::response::record_to_message;
use crate::error::{Result, ScoutError};
use crate::models::{generate_session_id, Message, Session};
use crate::storage::SESSION_ID_KEY;
use crate::ui::output::{log_error, log_verbose};

impl ChatWidget {
    /// Adopt a previously stored session and pull its transcript from the backend.
    ///
    /// Failures are logged and leave the greeting in place. The history-loading
    /// flag is cleared on every path.
    pub(super) async fn restore_session(&mut self) {
        let saved = match self.durable.get(SESSION_ID_KEY) {
            Ok(value) => value.filter(|id| !id.trim().is_empty()),
            Err(e) => {
                log_error(&format!("Error reading stored session: {}", e));
                None
            }
        };

        let Some(session_id) = saved else {
            self.loading_history = false;
            return;
        };

        log_verbose(
            self.settings.verbose,
            &format!("Restoring session {}", session_id),
        );
        self.session = Session::established(session_id.clone());

        match self.backend.get_chat_history(&session_id).await {
            Ok(Some(records)) => {
                log_verbose(
                    self.settings.verbose,
                    &format!("Loaded {} message(s) of history", records.len()),
                );
                let restored: Vec<Message> = records.into_iter().map(record_to_message).collect();
                self.replace_transcript(restored);
            }
            Ok(None) => {
                log_verbose(self.settings.verbose, "History response carried no messages");
                self.persist_transcript();
            }
            Err(e) => {
                log_error(&format!("Error loading chat history: {}", e));
                self.persist_transcript();
            }
        }

        self.loading_history = false;
    }

    /// Return the current session id, creating and persisting one if needed.
    ///
    /// The new id is persisted and adopted before the backend is told about it.
    /// A non-OK reply from the backend is logged and ignored. Failing to reach the
    /// backend at all, or failing to persist the id, is returned as an error; in
    /// the former case the id stays adopted and later sends reuse it.
    pub async fn ensure_session(&mut self) -> Result<String> {
        if self.session.created && !self.session.is_empty() {
            return Ok(self.session.session_id.clone());
        }

        let session_id = generate_session_id();
        self.durable.set(SESSION_ID_KEY, &session_id)?;
        self.session = Session::established(session_id.clone());
        self.persist_transcript();
        log_verbose(
            self.settings.verbose,
            &format!("Created session {}", session_id),
        );

        match self.backend.create_session(&session_id).await {
            Ok(()) => Ok(session_id),
            Err(e @ ScoutError::ApiError { .. }) => {
                log_error(&format!("Error creating session: {}", e));
                Ok(session_id)
            }
            Err(e) => Err(e),
        }
    }
}
