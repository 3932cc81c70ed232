use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

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

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let backend_base_url = require("GEOSCOUT_BACKEND_BASE_URL")?;
    let google_maps_api_key = lookup("GEOSCOUT_GOOGLE_MAPS_API_KEY").ok();

    let env = parse_environment(&or_default("GEOSCOUT_ENV", "development"));
    let log_level = or_default("GEOSCOUT_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("GEOSCOUT_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("GEOSCOUT_USER_AGENT", "geoscout/0.1 (field-ops)");

    let places_page_delay_ms = parse_u64("GEOSCOUT_PLACES_PAGE_DELAY_MS", "2000")?;
    let places_max_retries = parse_u32("GEOSCOUT_PLACES_MAX_RETRIES", "3")?;
    let places_retry_backoff_base_ms =
        parse_u64("GEOSCOUT_PLACES_RETRY_BACKOFF_BASE_MS", "2000")?;
    let places_inter_pass_delay_ms = parse_u64("GEOSCOUT_PLACES_INTER_PASS_DELAY_MS", "1000")?;
    let places_max_radius_m = parse_f64("GEOSCOUT_PLACES_MAX_RADIUS_M", "50000")?;

    let backend_max_retries = parse_u32("GEOSCOUT_BACKEND_MAX_RETRIES", "3")?;
    let backend_retry_base_delay_ms = parse_u64("GEOSCOUT_BACKEND_RETRY_BASE_DELAY_MS", "1000")?;
    let backend_inter_save_delay_ms = parse_u64("GEOSCOUT_BACKEND_INTER_SAVE_DELAY_MS", "500")?;

    Ok(AppConfig {
        backend_base_url,
        google_maps_api_key,
        env,
        log_level,
        request_timeout_secs,
        user_agent,
        places_page_delay_ms,
        places_max_retries,
        places_retry_backoff_base_ms,
        places_inter_pass_delay_ms,
        places_max_radius_m,
        backend_max_retries,
        backend_retry_base_delay_ms,
        backend_inter_save_delay_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
