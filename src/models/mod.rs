mod message;
mod session;

pub use message::{generate_message_id, ContentPart, Message, MessageContent, MessageState, Sender};
pub use session::{generate_session_id, Session};
