use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "DELIGHTS_ENV"));
}

#[test]
fn build_app_config_uses_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.api_url, "http://localhost:8081");
    assert_eq!(cfg.asset_origin, "http://localhost:8081");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(
        cfg.session_path,
        std::path::PathBuf::from("./.delights/session.json")
    );
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "delights/0.1 (restaurant-discovery)");
    assert_eq!(cfg.search_page_size, 10);
    assert_eq!(cfg.search_debounce_ms, 500);
}

#[test]
fn api_url_trailing_slash_is_stripped() {
    let mut map = HashMap::new();
    map.insert("DELIGHTS_API_URL", "https://api.delights.pk/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_url, "https://api.delights.pk");
}

#[test]
fn asset_origin_defaults_to_api_url() {
    let mut map = HashMap::new();
    map.insert("DELIGHTS_API_URL", "https://api.delights.pk");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.asset_origin, "https://api.delights.pk");
}

#[test]
fn asset_origin_override() {
    let mut map = HashMap::new();
    map.insert("DELIGHTS_ASSET_ORIGIN", "https://cdn.delights.pk");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.asset_origin, "https://cdn.delights.pk");
    assert_eq!(cfg.api_url, "http://localhost:8081");
}

#[test]
fn api_url_without_scheme_fails() {
    let mut map = HashMap::new();
    map.insert("DELIGHTS_API_URL", "localhost:8081");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DELIGHTS_API_URL"),
        "expected InvalidEnvVar(DELIGHTS_API_URL), got: {result:?}"
    );
}

#[test]
fn request_timeout_override() {
    let mut map = HashMap::new();
    map.insert("DELIGHTS_REQUEST_TIMEOUT_SECS", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.request_timeout_secs, 5);
}

#[test]
fn request_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("DELIGHTS_REQUEST_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DELIGHTS_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(DELIGHTS_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn request_timeout_zero_fails() {
    let mut map = HashMap::new();
    map.insert("DELIGHTS_REQUEST_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, ref reason }) if var == "DELIGHTS_REQUEST_TIMEOUT_SECS" && reason.contains("at least 1")),
        "expected InvalidEnvVar(DELIGHTS_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn search_page_size_zero_fails() {
    let mut map = HashMap::new();
    map.insert("DELIGHTS_SEARCH_PAGE_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DELIGHTS_SEARCH_PAGE_SIZE"),
        "expected InvalidEnvVar(DELIGHTS_SEARCH_PAGE_SIZE), got: {result:?}"
    );
}

#[test]
fn search_debounce_override() {
    let mut map = HashMap::new();
    map.insert("DELIGHTS_SEARCH_DEBOUNCE_MS", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.search_debounce_ms, 250);
}

#[test]
fn search_debounce_invalid() {
    let mut map = HashMap::new();
    map.insert("DELIGHTS_SEARCH_DEBOUNCE_MS", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DELIGHTS_SEARCH_DEBOUNCE_MS"),
        "expected InvalidEnvVar(DELIGHTS_SEARCH_DEBOUNCE_MS), got: {result:?}"
    );
}
