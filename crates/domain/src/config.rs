//! Plain configuration structures (`spec.md` §6, "Environment configuration").
//!
//! These are value types only — parsing environment variables into them is
//! `oauthbroker_infra::config::load`'s job, following the teacher's
//! `infra::config::loader` env-then-file pattern.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Deployment environment, gates redirect-URI scheme/host policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn allows_plain_http(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unrecognized environment: {other}")),
        }
    }
}

/// Redirect-URI allow-list policy for the current environment (`spec.md`
/// §4.1 "Redirect-URI validation").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectPolicy {
    pub environment: Environment,
    pub allowed_hosts: Vec<String>,
    pub callback_path: String,
}

impl RedirectPolicy {
    #[must_use]
    pub fn is_host_allowed(&self, host: &str) -> bool {
        if matches!(self.environment, Environment::Development)
            && (host == "localhost" || host == "127.0.0.1")
        {
            return true;
        }
        self.allowed_hosts.iter().any(|h| h == host)
    }
}

/// Monitoring thresholds (`spec.md` §4.7), all configurable with the given
/// defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringThresholds {
    pub window: Duration,
    pub failure_rate_min_attempts: u32,
    pub failure_rate_threshold: f64,
    pub failure_rate_high_threshold: f64,
    pub rapid_attempts_threshold: u32,
    pub rapid_attempts_high_threshold: u32,
    pub ip_abuse_threshold: u32,
    pub ip_abuse_critical_threshold: u32,
    pub attempt_retention: Duration,
    pub pattern_retention: Duration,
    pub alert_retention: Duration,
    pub max_attempts_per_key: usize,
    pub eviction_interval: Duration,
}

impl Default for MonitoringThresholds {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(5 * 60),
            failure_rate_min_attempts: 5,
            failure_rate_threshold: 0.5,
            failure_rate_high_threshold: 0.8,
            rapid_attempts_threshold: 10,
            rapid_attempts_high_threshold: 20,
            ip_abuse_threshold: 20,
            ip_abuse_critical_threshold: 50,
            attempt_retention: Duration::from_secs(24 * 60 * 60),
            pattern_retention: Duration::from_secs(24 * 60 * 60),
            alert_retention: Duration::from_secs(7 * 24 * 60 * 60),
            max_attempts_per_key: 1_000,
            eviction_interval: Duration::from_secs(60),
        }
    }
}

/// Top-level broker configuration (`spec.md` §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub environment: Environment,
    pub redirect_policy: RedirectPolicy,
    pub token_endpoint_timeout: Duration,
    pub state_ttl: Duration,
    pub monitoring: MonitoringThresholds,
}

impl BrokerConfig {
    #[must_use]
    pub fn development_default() -> Self {
        Self {
            environment: Environment::Development,
            redirect_policy: RedirectPolicy {
                environment: Environment::Development,
                allowed_hosts: vec!["localhost".to_string(), "127.0.0.1".to_string()],
                callback_path: "/api/v1/oauth/callback".to_string(),
            },
            token_endpoint_timeout: Duration::from_secs(30),
            state_ttl: Duration::from_secs(10 * 60),
            monitoring: MonitoringThresholds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_allows_localhost() {
        let policy = BrokerConfig::development_default().redirect_policy;
        assert!(policy.is_host_allowed("localhost"));
        assert!(policy.is_host_allowed("127.0.0.1"));
        assert!(!policy.is_host_allowed("evil.example"));
    }
}
