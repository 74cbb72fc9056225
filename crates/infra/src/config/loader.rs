//! Configuration loader (`SPEC_FULL.md` §6).
//!
//! Loads the broker's runtime configuration from `OAUTHBROKER_*` environment
//! variables, following the teacher's env-then-default strategy: every
//! variable has a sane default for local development, so only production
//! and staging deployments need a full environment.
//!
//! ## Environment Variables
//! - `OAUTHBROKER_ENV`: `development` | `staging` | `production` (default `development`)
//! - `OAUTHBROKER_DB_PATH`: SQLite database file path (default `oauthbroker.db`)
//! - `OAUTHBROKER_DB_POOL_SIZE`: connection pool size (default `5`)
//! - `OAUTHBROKER_ENCRYPTION_KEY`: 32+ byte symmetric key for token encryption
//! - `OAUTHBROKER_REDIRECT_HOSTS_PRODUCTION`, `OAUTHBROKER_REDIRECT_HOSTS_STAGING`:
//!   comma-separated redirect-host allow-lists
//! - `OAUTHBROKER_CALLBACK_PATH`: callback route path (default `/api/v1/oauth/callback`)
//! - `OAUTHBROKER_TOKEN_TIMEOUT_SECS`: provider HTTP timeout (default `30`)
//! - `OAUTHBROKER_STATE_TTL_SECS`: authorization flow TTL (default `600`)

use std::time::Duration;

use oauthbroker_domain::config::{BrokerConfig, Environment, MonitoringThresholds, RedirectPolicy};
use oauthbroker_domain::{OAuthBrokerError, Result};

/// Database connection settings, separate from [`BrokerConfig`] because the
/// storage adapter (not the core) is the only consumer.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub path: String,
    pub pool_size: u32,
}

/// Everything `oauthbroker-infra` needs to bootstrap: the core's
/// [`BrokerConfig`] plus infra-only settings (database, encryption key).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub broker: BrokerConfig,
    pub database: DatabaseSettings,
    pub encryption_key: Option<String>,
}

/// Load the application configuration from environment variables.
///
/// Every variable has a development-safe default, so this never fails in
/// practice — it returns `Result` only because [`Environment::from_str`]
/// can reject a malformed `OAUTHBROKER_ENV` value.
///
/// # Errors
/// Returns `OAuthBrokerError::Config` if `OAUTHBROKER_ENV` is set to an
/// unrecognized value, or a numeric setting fails to parse.
pub fn load() -> Result<AppConfig> {
    let environment: Environment = env_var_or("OAUTHBROKER_ENV", "development")
        .parse()
        .map_err(OAuthBrokerError::Config)?;

    let callback_path = env_var_or("OAUTHBROKER_CALLBACK_PATH", "/api/v1/oauth/callback");

    let allowed_hosts = match environment {
        Environment::Production => env_hosts("OAUTHBROKER_REDIRECT_HOSTS_PRODUCTION"),
        Environment::Staging => env_hosts("OAUTHBROKER_REDIRECT_HOSTS_STAGING"),
        Environment::Development => vec!["localhost".to_string(), "127.0.0.1".to_string()],
    };

    let token_endpoint_timeout =
        Duration::from_secs(env_u64("OAUTHBROKER_TOKEN_TIMEOUT_SECS", 30)?);
    let state_ttl = Duration::from_secs(env_u64("OAUTHBROKER_STATE_TTL_SECS", 600)?);

    let broker = BrokerConfig {
        environment,
        redirect_policy: RedirectPolicy { environment, allowed_hosts, callback_path },
        token_endpoint_timeout,
        state_ttl,
        monitoring: MonitoringThresholds::default(),
    };

    let database = DatabaseSettings {
        path: env_var_or("OAUTHBROKER_DB_PATH", "oauthbroker.db"),
        pool_size: env_u64("OAUTHBROKER_DB_POOL_SIZE", 5)?
            .try_into()
            .map_err(|_| OAuthBrokerError::Config("pool size out of range".to_string()))?,
    };

    let encryption_key = std::env::var("OAUTHBROKER_ENCRYPTION_KEY").ok();

    tracing::info!(
        environment = ?broker.environment,
        db_path = %database.path,
        "configuration loaded from environment"
    );

    Ok(AppConfig { broker, database, encryption_key })
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(raw) => {
            raw.parse().map_err(|e| OAuthBrokerError::Config(format!("invalid {key}: {e}")))
        }
        Err(_) => Ok(default),
    }
}

fn env_hosts(key: &str) -> Vec<String> {
    std::env::var(key)
        .ok()
        .map(|raw| {
            raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    #[test]
    fn defaults_to_development_with_localhost() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        std::env::remove_var("OAUTHBROKER_ENV");
        std::env::remove_var("OAUTHBROKER_REDIRECT_HOSTS_PRODUCTION");

        let config = load().expect("defaults always load");
        assert_eq!(config.broker.environment, Environment::Development);
        assert!(config.broker.redirect_policy.is_host_allowed("localhost"));
        assert_eq!(config.database.path, "oauthbroker.db");
    }

    #[test]
    fn production_reads_comma_separated_hosts() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        std::env::set_var("OAUTHBROKER_ENV", "production");
        std::env::set_var(
            "OAUTHBROKER_REDIRECT_HOSTS_PRODUCTION",
            "mwapsp.example, other.example",
        );

        let config = load().expect("valid env loads");
        assert!(config.broker.redirect_policy.is_host_allowed("mwapsp.example"));
        assert!(config.broker.redirect_policy.is_host_allowed("other.example"));
        assert!(!config.broker.redirect_policy.is_host_allowed("evil.example"));

        std::env::remove_var("OAUTHBROKER_ENV");
        std::env::remove_var("OAUTHBROKER_REDIRECT_HOSTS_PRODUCTION");
    }

    #[test]
    fn invalid_environment_is_rejected() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        std::env::set_var("OAUTHBROKER_ENV", "nonsense");

        let result = load();
        assert!(result.is_err());

        std::env::remove_var("OAUTHBROKER_ENV");
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        std::env::remove_var("OAUTHBROKER_ENV");
        std::env::set_var("OAUTHBROKER_TOKEN_TIMEOUT_SECS", "not-a-number");

        let result = load();
        assert!(result.is_err());

        std::env::remove_var("OAUTHBROKER_TOKEN_TIMEOUT_SECS");
    }
}
