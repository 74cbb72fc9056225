// Role-Based Access Control (RBAC) System

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

// Type aliases for complex types
type RoleMap = Arc<RwLock<HashMap<String, Role>>>;
type PermissionMap = Arc<RwLock<HashMap<String, Permission>>>;
type UserRoleMap = Arc<RwLock<HashMap<String, Vec<String>>>>;
type PermissionCache = Arc<RwLock<HashMap<String, CachedPermission>>>;
type InitResult = Result<(), Box<dyn std::error::Error>>;
type ConditionFuture<'a> = std::pin::Pin<Box<dyn std::future::Future<Output = bool> + 'a + Send>>;

/// User role in the system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: String,
    pub permissions: HashSet<String>,
    pub parent_role: Option<String>,
    pub priority: u32,
}

/// Permission definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Permission {
    pub id: String,
    pub resource: String,
    pub action: String,
    pub description: String,
    pub requires_approval: bool,
}

/// User context for RBAC checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    pub roles: Vec<String>,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub attributes: HashMap<String, String>,
}

/// RBAC policy for dynamic permissions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RBACPolicy {
    pub id: String,
    pub name: String,
    pub condition: PolicyCondition,
    pub effect: PolicyEffect,
    pub permissions: Vec<String>,
}

/// Policy condition for dynamic evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PolicyCondition {
    Always,
    TimeRange { start_time: String, end_time: String },
    IpRange { allowed_ips: Vec<String> },
    UserAttribute { attribute: String, value: String },
    And { conditions: Vec<PolicyCondition> },
    Or { conditions: Vec<PolicyCondition> },
    Not { condition: Box<PolicyCondition> },
}

/// Policy effect
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PolicyEffect {
    Allow,
    Deny,
}

/// RBAC Manager for the application
pub struct RBACManager {
    roles: RoleMap,
    /// Permission registry for validation and discovery
    permissions: PermissionMap,
    user_roles: UserRoleMap,
    policies: Arc<RwLock<Vec<RBACPolicy>>>,
    cache: PermissionCache,
}

/// Cached permission result
#[derive(Debug, Clone)]
struct CachedPermission {
    granted: bool,
    expires_at: std::time::Instant,
}

impl Default for RBACManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RBACManager {
    /// Create a new RBAC manager
    pub fn new() -> Self {
        // Build default roles before wrapping in RwLock to avoid blocking issues
        let default_roles = Self::build_default_roles();

        Self {
            roles: Arc::new(RwLock::new(default_roles)),
            permissions: Arc::new(RwLock::new(HashMap::new())),
            user_roles: Arc::new(RwLock::new(HashMap::new())),
            policies: Arc::new(RwLock::new(Vec::new())),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Build default roles (pure function, no locking)
    fn build_default_roles() -> HashMap<String, Role> {
        let default_roles = vec![
            Role {
                id: "admin".to_string(),
                name: "Administrator".to_string(),
                description: "Full system access".to_string(),
                permissions: HashSet::from_iter(vec![
                    "system:*".to_string(),
                    "menu:*".to_string(),
                    "config:*".to_string(),
                    "audit:*".to_string(),
                ]),
                parent_role: None,
                priority: 100,
            },
            Role {
                id: "power_user".to_string(),
                name: "Power User".to_string(),
                description: "Advanced user with elevated permissions".to_string(),
                permissions: HashSet::from_iter(vec![
                    "menu:view".to_string(),
                    "menu:interact".to_string(),
                    "config:read".to_string(),
                    "config:write".to_string(),
                    "audit:read".to_string(),
                ]),
                parent_role: Some("user".to_string()),
                priority: 50,
            },
            Role {
                id: "user".to_string(),
                name: "Standard User".to_string(),
                description: "Basic user permissions".to_string(),
                permissions: HashSet::from_iter(vec![
                    "menu:view".to_string(),
                    "menu:interact:basic".to_string(),
                    "config:read:own".to_string(),
                ]),
                parent_role: None,
                priority: 10,
            },
            Role {
                id: "guest".to_string(),
                name: "Guest".to_string(),
                description: "Limited read-only access".to_string(),
                permissions: HashSet::from_iter(vec!["menu:view:basic".to_string()]),
                parent_role: None,
                priority: 1,
            },
            Role {
                id: "auditor".to_string(),
                name: "Auditor".to_string(),
                description: "Audit and compliance access".to_string(),
                permissions: HashSet::from_iter(vec![
                    "audit:*".to_string(),
                    "compliance:view".to_string(),
                    "menu:view".to_string(),
                ]),
                parent_role: None,
                priority: 60,
            },
        ];

        let mut roles_map = HashMap::new();
        for role in default_roles {
            roles_map.insert(role.id.clone(), role);
        }
        roles_map
    }

    /// Initialize RBAC manager
    pub fn initialize(&mut self) -> InitResult {
        info!("Initializing RBAC manager");
        // Roles are already initialized in new(), just initialize permissions
        self.initialize_default_permissions()?;
        Ok(())
    }

    /// Initialize default permissions
    fn initialize_default_permissions(&mut self) -> InitResult {
        // Permissions registry is optional and not used by the core permission checking
        // logic which relies on role-based permissions defined in the roles
        // themselves. This can be populated during actual application startup
        // if needed, but not required for tests.
        info!("Permission registry initialization skipped (permissions are embedded in roles)");
        Ok(())
    }

    /// Check if a user has a specific permission
    ///
    /// # Permission Matching Rules
    ///
    /// Permissions are matched using three strategies, evaluated in order:
    ///
    /// ## 1. Exact Match
    /// The permission string exactly matches a user's permission.
    ///
    /// ```text
    /// User has: "menu:view"
    /// Checking: "menu:view"
    /// Result:   ✅ GRANTED
    /// ```
    ///
    /// ## 2. Resource Wildcard (`resource:*`)
    /// User has wildcard permission for a specific resource.
    ///
    /// ```text
    /// User has: "menu:*"
    /// Checking: "menu:view", "menu:edit", "menu:delete"
    /// Result:   ✅ GRANTED (all menu actions)
    /// ```
    ///
    /// ## 3. Global Wildcard (`*:*` or `system:*`)
    /// User has global wildcard permission for all resources and actions.
    ///
    /// ```text
    /// User has: "system:*"
    /// Checking: "menu:view", "config:write", "audit:delete"
    /// Result:   ✅ GRANTED (all permissions)
    /// ```
    ///
    /// ```text
    /// User has: "*:*"
    /// Checking: Any permission
    /// Result:   ✅ GRANTED (superuser)
    /// ```
    ///
    /// # Wildcard Hierarchy
    ///
    /// ```text
    /// *:*           → Matches everything (superuser)
    /// system:*      → Matches all system permissions
    /// menu:*        → Matches all menu permissions (menu:view, menu:edit, etc.)
    /// menu:view     → Matches only menu:view (exact)
    /// ```
    ///
    /// # Policy Override
    ///
    /// Dynamic policies can override role-based permissions:
    /// - **Deny policies** always take precedence (even over wildcards)
    /// - **Allow policies** grant permission if no deny policy applies
    /// - If no policy matches, fall back to role-based matching
    ///
    /// ```text
    /// User has: "system:*"
    /// Policy:   Deny "audit:delete" during business hours
    /// Checking: "audit:delete" at 2pm
    /// Result:   ❌ DENIED (policy overrides wildcard)
    /// ```
    ///
    /// # Caching
    ///
    /// Permission checks are cached for 60 seconds to improve performance.
    /// Cache is keyed by `user_id:permission_id`.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use oauthbroker_common::security::rbac::{RBACManager, UserContext, Permission};
    ///
    /// let rbac = RBACManager::new();
    /// let admin = UserContext::admin("admin_user");
    /// let perm = Permission::new("menu:view", "menu", "view");
    ///
    /// // Admin has "system:*" which matches everything
    /// assert!(rbac.check_permission(&admin, &perm).await);
    /// ```
    pub async fn check_permission(
        &self,
        user_context: &UserContext,
        permission: &Permission,
    ) -> bool {
        // Check cache first
        let cache_key = format!("{}:{}", user_context.user_id, permission.id);
        let cache = self.cache.read().await;
        if let Some(cached) = cache.get(&cache_key) {
            if cached.expires_at > std::time::Instant::now() {
                debug!("Permission check cache hit: {}", cache_key);
                return cached.granted;
            }
        }
        drop(cache);

        // Check user roles
        let user_permissions = self.get_user_permissions(user_context).await;

        // Check exact permission
        let permission_string = format!("{}:{}", permission.resource, permission.action);
        let has_exact = user_permissions.contains(&permission_string);

        // Check wildcard permissions
        let has_resource_wildcard =
            user_permissions.contains(&format!("{}:*", permission.resource));
        let has_global_wildcard =
            user_permissions.contains("*:*") || user_permissions.contains("system:*");

        // Check policies
        let policy_result = self.evaluate_policies(user_context, &permission_string).await;

        let granted = match policy_result {
            Some(PolicyEffect::Deny) => false,
            Some(PolicyEffect::Allow) => true,
            None => has_exact || has_resource_wildcard || has_global_wildcard,
        };

        // Cache the result
        let mut cache = self.cache.write().await;
        cache.insert(
            cache_key,
            CachedPermission {
                granted,
                expires_at: std::time::Instant::now() + std::time::Duration::from_secs(60),
            },
        );

        granted
    }

    /// Get all permissions for a user
    async fn get_user_permissions(&self, user_context: &UserContext) -> HashSet<String> {
        let mut permissions = HashSet::new();
        let roles = self.roles.read().await;

        for role_id in &user_context.roles {
            if let Some(role) = roles.get(role_id) {
                permissions.extend(role.permissions.clone());

                // Include parent role permissions
                if let Some(parent_id) = &role.parent_role {
                    if let Some(parent_role) = roles.get(parent_id) {
                        permissions.extend(parent_role.permissions.clone());
                    }
                }
            }
        }

        permissions
    }

    /// Evaluate policies for a permission
    async fn evaluate_policies(
        &self,
        user_context: &UserContext,
        permission: &str,
    ) -> Option<PolicyEffect> {
        let policies = self.policies.read().await;

        for policy in policies.iter() {
            if !policy.permissions.contains(&permission.to_string()) {
                continue;
            }

            if self.evaluate_condition(&policy.condition, user_context).await {
                return Some(policy.effect);
            }
        }

        None
    }

    /// Evaluate a policy condition
    #[allow(clippy::only_used_in_recursion)]
    fn evaluate_condition<'a>(
        &'a self,
        condition: &'a PolicyCondition,
        user_context: &'a UserContext,
    ) -> ConditionFuture<'a> {
        Box::pin(async move {
            match condition {
                PolicyCondition::Always => true,
                PolicyCondition::TimeRange { start_time, end_time } => {
                    // Parse time strings (expected format: "HH:MM" or "HH:MM:SS")
                    let current_time = chrono::Local::now();

                    match (parse_time_string(start_time), parse_time_string(end_time)) {
                        (Ok(start), Ok(end)) => {
                            let current_time_of_day = current_time.time();
                            debug!(
                                "Time range check: {} - {} (current: {})",
                                start_time, end_time, current_time_of_day
                            );

                            // Handle time ranges that cross midnight
                            if start <= end {
                                current_time_of_day >= start && current_time_of_day <= end
                            } else {
                                current_time_of_day >= start || current_time_of_day <= end
                            }
                        }
                        _ => {
                            warn!("Invalid time range format: {} - {}", start_time, end_time);
                            false
                        }
                    }
                }
                PolicyCondition::IpRange { allowed_ips } => {
                    if let Some(ip) = &user_context.ip_address {
                        allowed_ips.contains(ip)
                    } else {
                        false
                    }
                }
                PolicyCondition::UserAttribute { attribute, value } => {
                    user_context.attributes.get(attribute).map(|v| v == value).unwrap_or(false)
                }
                PolicyCondition::And { conditions } => {
                    for cond in conditions {
                        if !self.evaluate_condition(cond, user_context).await {
                            return false;
                        }
                    }
                    true
                }
                PolicyCondition::Or { conditions } => {
                    for cond in conditions {
                        if self.evaluate_condition(cond, user_context).await {
                            return true;
                        }
                    }
                    false
                }
                PolicyCondition::Not { condition } => {
                    !self.evaluate_condition(condition, user_context).await
                }
            }
        })
    }

    /// Assign a role to a user
    pub async fn assign_role(&self, user_id: &str, role_id: &str) -> InitResult {
        let roles = self.roles.read().await;
        if !roles.contains_key(role_id) {
            return Err(format!("Role '{}' does not exist", role_id).into());
        }
        drop(roles);

        let mut user_roles = self.user_roles.write().await;
        let roles = user_roles.entry(user_id.to_string()).or_insert_with(Vec::new);

        if !roles.contains(&role_id.to_string()) {
            roles.push(role_id.to_string());
            info!("Assigned role '{}' to user '{}'", role_id, user_id);
        }

        // Clear cache for this user
        let mut cache = self.cache.write().await;
        cache.retain(|k, _| !k.starts_with(&format!("{}:", user_id)));

        Ok(())
    }

    /// Remove a role from a user
    pub async fn revoke_role(&self, user_id: &str, role_id: &str) -> InitResult {
        let mut user_roles = self.user_roles.write().await;

        if let Some(roles) = user_roles.get_mut(user_id) {
            roles.retain(|r| r != role_id);
            info!("Revoked role '{}' from user '{}'", role_id, user_id);

            // Clear cache for this user
            let mut cache = self.cache.write().await;
            cache.retain(|k, _| !k.starts_with(&format!("{}:", user_id)));
        }

        Ok(())
    }

    /// Get all roles for a user
    pub async fn get_user_roles(&self, user_id: &str) -> Vec<Role> {
        let user_roles = self.user_roles.read().await;
        let roles = self.roles.read().await;

        user_roles
            .get(user_id)
            .map(|role_ids| role_ids.iter().filter_map(|id| roles.get(id).cloned()).collect())
            .unwrap_or_default()
    }

    /// Create a custom role
    pub async fn create_role(&self, role: Role) -> InitResult {
        let mut roles = self.roles.write().await;

        if roles.contains_key(&role.id) {
            return Err(format!("Role '{}' already exists", role.id).into());
        }

        info!("Created role '{}' with {} permissions", role.id, role.permissions.len());
        roles.insert(role.id.clone(), role);
        Ok(())
    }

    /// Add a policy
    pub async fn add_policy(&self, policy: RBACPolicy) -> InitResult {
        let mut policies = self.policies.write().await;

        info!("Added policy '{}' with effect {:?}", policy.id, policy.effect);
        policies.push(policy);

        // Clear all cache as policies affect everyone
        self.cache.write().await.clear();

        Ok(())
    }

    /// Register a permission in the permission registry
    pub async fn register_permission(&self, permission: Permission) -> InitResult {
        let mut permissions = self.permissions.write().await;

        if permissions.contains_key(&permission.id) {
            return Err(format!("Permission '{}' already registered", permission.id).into());
        }

        debug!("Registered permission: {}", permission.id);
        permissions.insert(permission.id.clone(), permission);
        Ok(())
    }

    /// Get a permission from the registry by ID
    pub async fn get_permission(&self, permission_id: &str) -> Option<Permission> {
        let permissions = self.permissions.read().await;
        permissions.get(permission_id).cloned()
    }

    /// List all registered permissions
    pub async fn list_permissions(&self) -> Vec<Permission> {
        let permissions = self.permissions.read().await;
        permissions.values().cloned().collect()
    }

    /// Validate if a permission string exists in the registry
    pub async fn is_permission_registered(&self, permission_id: &str) -> bool {
        let permissions = self.permissions.read().await;
        permissions.contains_key(permission_id)
    }

    /// Get permissions by resource
    pub async fn get_permissions_by_resource(&self, resource: &str) -> Vec<Permission> {
        let permissions = self.permissions.read().await;
        permissions.values().filter(|p| p.resource == resource).cloned().collect()
    }
}

impl Permission {
    /// Create a new permission from a resource:action string
    pub fn new(permission_str: &str) -> Self {
        let parts: Vec<&str> = permission_str.split(':').collect();
        let resource = parts.first().unwrap_or(&"").to_string();
        let action = parts.get(1).unwrap_or(&"").to_string();

        Self {
            id: permission_str.to_string(),
            resource,
            action,
            description: String::new(),
            requires_approval: false,
        }
    }
}

/// Helper function to parse time strings like "HH:MM" or "HH:MM:SS"
fn parse_time_string(time_str: &str) -> Result<NaiveTime, chrono::ParseError> {
    // Try parsing as HH:MM:SS first
    NaiveTime::parse_from_str(time_str, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time_str, "%H:%M"))
}
