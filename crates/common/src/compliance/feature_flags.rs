// Feature Flags System for A/B Testing and Gradual Rollouts

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::security::rbac::UserContext;

/// Feature flag definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlag {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub rollout_percentage: f32,
    pub target_roles: Vec<String>,
    pub target_users: Vec<String>,
    pub metadata: HashMap<String, String>,
}

/// Feature flag manager
#[derive(Debug)]
pub struct FeatureFlagManager {
    flags: HashMap<String, FeatureFlag>,
}

impl Default for FeatureFlagManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureFlagManager {
    pub fn new() -> Self {
        let mut manager = Self { flags: HashMap::new() };
        manager.initialize_default_flags();
        manager
    }

    pub fn initialize(&mut self) -> Result<(), String> {
        info!("Initializing feature flags");
        self.initialize_default_flags();
        Ok(())
    }

    fn initialize_default_flags(&mut self) {
        self.flags.insert(
            "enterprise_menu".to_string(),
            FeatureFlag {
                id: "enterprise_menu".to_string(),
                name: "Enterprise Menu".to_string(),
                description: "Enable enterprise menu features".to_string(),
                enabled: true,
                rollout_percentage: 100.0,
                target_roles: vec!["admin".to_string(), "power_user".to_string()],
                target_users: vec![],
                metadata: HashMap::new(),
            },
        );

        self.flags.insert(
            "advanced_telemetry".to_string(),
            FeatureFlag {
                id: "advanced_telemetry".to_string(),
                name: "Advanced Telemetry".to_string(),
                description: "Enable advanced telemetry collection".to_string(),
                enabled: false,
                rollout_percentage: 0.0,
                target_roles: vec![],
                target_users: vec![],
                metadata: HashMap::new(),
            },
        );
    }

    pub async fn is_enabled(&self, flag_id: &str, context: Option<&UserContext>) -> bool {
        if let Some(flag) = self.flags.get(flag_id) {
            if !flag.enabled {
                return false;
            }

            if let Some(ctx) = context {
                // Check target users
                if flag.target_users.contains(&ctx.user_id) {
                    return true;
                }

                // Check target roles
                for role in &ctx.roles {
                    if flag.target_roles.contains(role) {
                        return true;
                    }
                }

                // Check rollout percentage
                if flag.rollout_percentage >= 100.0 {
                    return true;
                }

                if flag.rollout_percentage <= 0.0 {
                    return false;
                }

                // FNV-1a hash-based rollout (deterministic per user + flag_id)
                // This ensures same user gets different rollouts for different flags
                let hash = Self::fnv1a_hash(&format!("{}:{}", ctx.user_id, flag_id));
                let threshold = (flag.rollout_percentage * 100.0) as u64;
                return (hash % 10000) < threshold;
            }

            flag.rollout_percentage >= 100.0
        } else {
            false
        }
    }

    /// FNV-1a hash function for deterministic rollout
    /// Returns a 64-bit hash value with good distribution properties
    fn fnv1a_hash(s: &str) -> u64 {
        const FNV_OFFSET_BASIS: u64 = 14695981039346656037;
        const FNV_PRIME: u64 = 1099511628211;

        let mut hash = FNV_OFFSET_BASIS;
        for byte in s.bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }

    pub fn toggle_flag(&mut self, flag_id: &str, enabled: bool) -> Result<(), String> {
        if let Some(flag) = self.flags.get_mut(flag_id) {
            flag.enabled = enabled;
            info!("Feature flag '{}' set to {}", flag_id, enabled);
            Ok(())
        } else {
            Err(format!("Feature flag '{}' not found", flag_id))
        }
    }

    pub fn get_flag(&self, flag_id: &str) -> Option<&FeatureFlag> {
        self.flags.get(flag_id)
    }

    pub fn add_flag(&mut self, flag: FeatureFlag) -> Result<(), String> {
        let flag_id = flag.id.clone();
        if self.flags.contains_key(&flag_id) {
            return Err(format!("Feature flag '{}' already exists", flag_id));
        }
        self.flags.insert(flag_id.clone(), flag);
        info!("Added feature flag '{}'", flag_id);
        Ok(())
    }

    pub fn set_rollout_percentage(&mut self, flag_id: &str, percentage: f32) -> Result<(), String> {
        if !(0.0..=100.0).contains(&percentage) {
            return Err("Rollout percentage must be between 0 and 100".to_string());
        }

        if let Some(flag) = self.flags.get_mut(flag_id) {
            flag.rollout_percentage = percentage;
            info!("Feature flag '{}' rollout set to {}%", flag_id, percentage);
            Ok(())
        } else {
            Err(format!("Feature flag '{}' not found", flag_id))
        }
    }
}
