use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub created: bool,
}

impl Session {
    /// Adopt an id that already exists (restored from storage or freshly persisted).
    pub fn established(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            created: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.session_id.is_empty()
    }
}

pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}
