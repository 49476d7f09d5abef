use std::fmt;

#[derive(Debug)]
pub enum ScoutError {
    ApiError {
        status: u16,
        message: String,
    },
    ConfigError(String),
    StorageError(String),
    NetworkError(reqwest::Error),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    YamlError(serde_yaml::Error),
    Other(String),
}

impl fmt::Display for ScoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoutError::ApiError { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            ScoutError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ScoutError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            ScoutError::NetworkError(e) => write!(f, "Network error: {}", e),
            ScoutError::IoError(e) => write!(f, "IO error: {}", e),
            ScoutError::JsonError(e) => write!(f, "JSON error: {}", e),
            ScoutError::YamlError(e) => write!(f, "YAML error: {}", e),
            ScoutError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ScoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScoutError::NetworkError(e) => Some(e),
            ScoutError::IoError(e) => Some(e),
            ScoutError::JsonError(e) => Some(e),
            ScoutError::YamlError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ScoutError {
    fn from(err: reqwest::Error) -> Self {
        ScoutError::NetworkError(err)
    }
}

impl From<std::io::Error> for ScoutError {
    fn from(err: std::io::Error) -> Self {
        ScoutError::IoError(err)
    }
}

impl From<serde_json::Error> for ScoutError {
    fn from(err: serde_json::Error) -> Self {
        ScoutError::JsonError(err)
    }
}

impl From<serde_yaml::Error> for ScoutError {
    fn from(err: serde_yaml::Error) -> Self {
        ScoutError::YamlError(err)
    }
}

impl From<anyhow::Error> for ScoutError {
    fn from(err: anyhow::Error) -> Self {
        ScoutError::ConfigError(format!("{:#}", err))
    }
}

impl From<String> for ScoutError {
    fn from(msg: String) -> Self {
        ScoutError::Other(msg)
    }
}

impl From<&str> for ScoutError {
    fn from(msg: &str) -> Self {
        ScoutError::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
