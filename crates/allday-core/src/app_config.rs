use std::path::PathBuf;

use crate::products::SyncMode;
use crate::ConfigError;

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

/// Runtime configuration for a crawl, read once at startup.
///
/// Delays are in milliseconds except `retry_delay_secs`, which mirrors the
/// fixed back-off between navigation retries.
#[derive(Clone)]
pub struct AppConfig {
    /// Only commands that open a pool need it; a dry run does not.
    pub database_url: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub categories_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub site_base_url: String,
    pub user_agent: String,
    pub navigation_timeout_secs: u64,
    /// Items per ranking page; a shorter page marks the end of a category.
    pub page_size: usize,
    /// Default number of products to collect per category.
    pub target_count: usize,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    /// Pause after navigating to a detail view or opening a coupon panel.
    pub settle_delay_ms: u64,
    /// Coupon amounts at or below this value are classified as percentages.
    pub percent_threshold: i64,
    pub sync_mode: SyncMode,
    pub schedule_cron: String,
}

impl AppConfig {
    /// The configured database URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if `DATABASE_URL` was not set.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("categories_path", &self.categories_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("site_base_url", &self.site_base_url)
            .field("user_agent", &self.user_agent)
            .field("navigation_timeout_secs", &self.navigation_timeout_secs)
            .field("page_size", &self.page_size)
            .field("target_count", &self.target_count)
            .field("delay_min_ms", &self.delay_min_ms)
            .field("delay_max_ms", &self.delay_max_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_secs", &self.retry_delay_secs)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .field("percent_threshold", &self.percent_threshold)
            .field("sync_mode", &self.sync_mode)
            .field("schedule_cron", &self.schedule_cron)
            .finish()
    }
}
