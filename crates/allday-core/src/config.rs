use crate::app_config::{AppConfig, Environment};
use crate::products::SyncMode;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        or_default(var, default)
            .parse::<i64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = lookup("DATABASE_URL").ok().filter(|url| !url.is_empty());
    let env = parse_environment(&or_default("ALLDAY_ENV", "development"))?;
    let log_level = or_default("ALLDAY_LOG_LEVEL", "info");
    let categories_path = PathBuf::from(or_default(
        "ALLDAY_CATEGORIES_PATH",
        "./config/categories.yaml",
    ));

    let db_max_connections = parse_u32("ALLDAY_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("ALLDAY_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("ALLDAY_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let site_base_url = or_default("ALLDAY_SITE_BASE_URL", "https://www.oliveyoung.co.kr")
        .trim_end_matches('/')
        .to_string();
    let user_agent = or_default(
        "ALLDAY_USER_AGENT",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    );
    let navigation_timeout_secs = parse_u64("ALLDAY_NAVIGATION_TIMEOUT_SECS", "30")?;

    let page_size = parse_usize("ALLDAY_PAGE_SIZE", "24")?;
    if page_size == 0 {
        return Err(invalid("ALLDAY_PAGE_SIZE", "must be greater than zero".into()));
    }
    let target_count = parse_usize("ALLDAY_TARGET_COUNT", "100")?;

    let delay_min_ms = parse_u64("ALLDAY_DELAY_MIN_MS", "2000")?;
    let delay_max_ms = parse_u64("ALLDAY_DELAY_MAX_MS", "4000")?;
    if delay_min_ms > delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "ALLDAY_DELAY_MIN_MS ({delay_min_ms}) must not exceed ALLDAY_DELAY_MAX_MS ({delay_max_ms})"
        )));
    }

    let max_retries = parse_u32("ALLDAY_MAX_RETRIES", "2")?;
    let retry_delay_secs = parse_u64("ALLDAY_RETRY_DELAY_SECS", "5")?;
    let settle_delay_ms = parse_u64("ALLDAY_SETTLE_DELAY_MS", "1000")?;
    let percent_threshold = parse_i64("ALLDAY_PERCENT_THRESHOLD", "100")?;

    let sync_mode = or_default("ALLDAY_SYNC_MODE", "price-only")
        .parse::<SyncMode>()
        .map_err(|reason| invalid("ALLDAY_SYNC_MODE", reason))?;
    let schedule_cron = or_default("ALLDAY_SCHEDULE_CRON", "0 0 3 * * *");

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        categories_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        site_base_url,
        user_agent,
        navigation_timeout_secs,
        page_size,
        target_count,
        delay_min_ms,
        delay_max_ms,
        max_retries,
        retry_delay_secs,
        settle_delay_ms,
        percent_threshold,
        sync_mode,
        schedule_cron,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ALLDAY_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
