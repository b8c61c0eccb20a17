mod app_config;
mod config;
mod restaurants;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use restaurants::{
    CanonicalRestaurant, QueryState, ResultPage, SearchFilters, DEFAULT_CUISINE, DEFAULT_LOCATION,
    DEFAULT_NAME, PLACEHOLDER_IMAGE,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
