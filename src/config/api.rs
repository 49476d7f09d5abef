use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Origin serving the `/api/*` endpoints
    #[serde(default)]
    pub base_url: Option<String>,
}
