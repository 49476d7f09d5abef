mod filesystem;
mod memory;
mod store;

pub use filesystem::FilesystemStore;
pub use memory::MemoryStore;
pub use store::KeyValueStore;

/// Durable key holding the current session id
pub const SESSION_ID_KEY: &str = "pest_assessment_session_id";

/// Prefix of the session-scoped transcript cache key
pub const CHAT_HISTORY_KEY: &str = "pest_assessment_chat_history";

pub fn transcript_key(session_id: &str) -> String {
    format!("{}_{}", CHAT_HISTORY_KEY, session_id)
}
