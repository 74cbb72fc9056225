// Remote Configuration Management

use std::collections::HashMap;
use std::fs;

use serde::{Deserialize, Serialize};
use tracing::info;

// Type aliases for complex types
type InitResult = Result<(), Box<dyn std::error::Error>>;

/// Remote configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub version: String,
    pub environment: String,
    pub settings: HashMap<String, serde_json::Value>,
    pub last_sync: Option<chrono::DateTime<chrono::Utc>>,
    pub sync_url: Option<String>,
}

/// Configuration manager for remote and local configs
#[derive(Debug)]
pub struct ConfigManager {
    config: RemoteConfig,
    local_overrides: HashMap<String, serde_json::Value>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: RemoteConfig {
                version: "1.0.0".to_string(),
                environment: "production".to_string(),
                settings: HashMap::new(),
                last_sync: None,
                sync_url: None,
            },
            local_overrides: HashMap::new(),
        }
    }

    pub async fn sync_from_remote(&mut self, url: &str) -> InitResult {
        info!("Syncing configuration from {}", url);

        // Fetch configuration from remote endpoint
        let response = reqwest::get(url).await?;

        if !response.status().is_success() {
            return Err(
                format!("Remote config endpoint returned status: {}", response.status()).into()
            );
        }

        let remote_config: RemoteConfig = response.json().await?;

        // Validate version compatibility
        if !self.is_version_compatible(&remote_config.version) {
            return Err(format!(
                "Incompatible config version: {} (current: {})",
                remote_config.version, self.config.version
            )
            .into());
        }

        // Apply the remote configuration
        self.config = remote_config;
        self.config.sync_url = Some(url.to_string());
        self.config.last_sync = Some(chrono::Utc::now());

        info!("Successfully synced configuration from remote. Version: {}", self.config.version);
        Ok(())
    }

    /// Check if a config version is compatible
    fn is_version_compatible(&self, version: &str) -> bool {
        // Simple major version check (e.g., "1.x.x" is compatible with "1.y.z")
        let current_major = self.config.version.split('.').next().unwrap_or("0");
        let remote_major = version.split('.').next().unwrap_or("0");
        current_major == remote_major
    }

    pub fn load_from_file(&mut self, path: &str) -> InitResult {
        let content = fs::read_to_string(path)?;
        self.config = serde_json::from_str(&content)?;

        info!("Loaded configuration from {}", path);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.local_overrides.get(key).or_else(|| self.config.settings.get(key)).cloned()
    }

    pub fn set_override(&mut self, key: String, value: serde_json::Value) {
        self.local_overrides.insert(key.clone(), value.clone());
        info!("Set local override for '{}': {:?}", key, value);
    }

    pub fn get_environment(&self) -> &str {
        &self.config.environment
    }

    pub fn get_version(&self) -> &str {
        &self.config.version
    }

    pub fn clear_overrides(&mut self) {
        self.local_overrides.clear();
        info!("Cleared all local overrides");
    }

    pub fn get_all_settings(&self) -> HashMap<String, serde_json::Value> {
        let mut merged = self.config.settings.clone();
        for (key, value) in &self.local_overrides {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}
