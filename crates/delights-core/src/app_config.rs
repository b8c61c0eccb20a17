use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// Base URL of the restaurant service (search, listings, auth).
    pub api_url: String,
    /// Origin that canonical image paths are appended to for display.
    pub asset_origin: String,
    pub log_level: String,
    /// File backing the session credential across runs.
    pub session_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub search_page_size: u32,
    pub search_debounce_ms: u64,
}
