pub fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

pub fn default_auto_open() -> bool {
    true
}

pub fn default_open_delay_ms() -> u64 {
    3500
}

pub fn default_verbose() -> bool {
    false
}

/// Parse a boolean flag the way environment variables are usually written.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
