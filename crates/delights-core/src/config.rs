use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_API_URL: &str = "http://localhost:8081";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
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

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("DELIGHTS_ENV", "development"))?;

    let api_url = parse_base_url(
        "DELIGHTS_API_URL",
        &or_default("DELIGHTS_API_URL", DEFAULT_API_URL),
    )?;
    let asset_origin = match lookup("DELIGHTS_ASSET_ORIGIN") {
        Ok(raw) => parse_base_url("DELIGHTS_ASSET_ORIGIN", &raw)?,
        Err(_) => api_url.clone(),
    };

    let log_level = or_default("DELIGHTS_LOG_LEVEL", "info");
    let session_path = PathBuf::from(or_default(
        "DELIGHTS_SESSION_PATH",
        "./.delights/session.json",
    ));

    let request_timeout_secs = parse_u64("DELIGHTS_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "DELIGHTS_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "timeout must be at least 1 second".to_string(),
        });
    }
    let user_agent = or_default(
        "DELIGHTS_USER_AGENT",
        "delights/0.1 (restaurant-discovery)",
    );

    let search_page_size = parse_u32("DELIGHTS_SEARCH_PAGE_SIZE", "10")?;
    if search_page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "DELIGHTS_SEARCH_PAGE_SIZE".to_string(),
            reason: "page size must be at least 1".to_string(),
        });
    }
    let search_debounce_ms = parse_u64("DELIGHTS_SEARCH_DEBOUNCE_MS", "500")?;

    Ok(AppConfig {
        env,
        api_url,
        asset_origin,
        log_level,
        session_path,
        request_timeout_secs,
        user_agent,
        search_page_size,
        search_debounce_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "DELIGHTS_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

/// Accepts `http://` or `https://` URLs and strips trailing slashes so that
/// paths can be joined with a single `/`.
fn parse_base_url(var: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("\"{raw}\" is not an http(s) URL"),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
