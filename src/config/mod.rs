use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub documents: DocumentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// How long an opened file stays on disk before it is released
    pub viewer_release_secs: u64,
    pub page_size: usize,
    /// Where opened files are written; defaults to the OS temp dir
    pub viewer_dir: Option<PathBuf>,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl DocumentConfig {
    pub fn viewer_release_delay(&self) -> Duration {
        Duration::from_secs(self.viewer_release_secs)
    }

    pub fn viewer_dir(&self) -> PathBuf {
        self.viewer_dir
            .clone()
            .unwrap_or_else(|| env::temp_dir().join("casedesk"))
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("CASEDESK_API_BASE_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = v.trim().trim_end_matches('/').to_string();
            }
        }
        if let Ok(v) = env::var("CASEDESK_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }
        if let Ok(v) = env::var("CASEDESK_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Document overrides
        if let Ok(v) = env::var("CASEDESK_VIEWER_RELEASE_SECS") {
            self.documents.viewer_release_secs = v.parse().unwrap_or(self.documents.viewer_release_secs);
        }
        if let Ok(v) = env::var("CASEDESK_PAGE_SIZE") {
            self.documents.page_size = match v.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => self.documents.page_size,
            };
        }
        if let Ok(v) = env::var("CASEDESK_VIEWER_DIR") {
            self.documents.viewer_dir = Some(PathBuf::from(v));
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                request_timeout_secs: 30,
                enable_request_logging: true,
            },
            documents: DocumentConfig {
                viewer_release_secs: 60,
                page_size: 10,
                viewer_dir: None,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging.example.com/api".to_string(),
                request_timeout_secs: 15,
                enable_request_logging: true,
            },
            documents: DocumentConfig {
                viewer_release_secs: 60,
                page_size: 10,
                viewer_dir: None,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://app.example.com/api".to_string(),
                request_timeout_secs: 10,
                enable_request_logging: false,
            },
            documents: DocumentConfig {
                viewer_release_secs: 60,
                page_size: 10,
                viewer_dir: None,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
