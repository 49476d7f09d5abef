use crate::error::Result;

/// Trait for key-value storage backends.
///
/// Two stores back a widget: a durable one that survives restarts (the session id)
/// and a session-scoped one that lives as long as the process (the transcript cache).
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
