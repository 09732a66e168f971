use std::time::Duration;

use crate::notify::{Language, DEFAULT_NOTICE_TIMEOUT};

/// Address the controller answers on in access point mode
pub const DEFAULT_BASE_URL: &str = "http://192.168.4.1";

/// Configuration for an editor session
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Base URL of the controller's HTTP server
    pub base_url: String,
    /// How long success and error notices stay visible
    pub notice_timeout: Duration,
    /// Language of status messages
    pub language: Language,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            notice_timeout: DEFAULT_NOTICE_TIMEOUT,
            language: Language::default(),
        }
    }
}

impl EditorConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_notice_timeout(mut self, timeout: Duration) -> Self {
        self.notice_timeout = timeout;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}
