//! Stable-event-name audit logging (`SPEC_FULL.md` §4.4 expansion,
//! `spec.md` §4.8).
//!
//! Mirrors the teacher's `tracing::info!(event = ..., ...)` convention for
//! `command_execution_success`/`feature_flag_evaluated`: one structured
//! event per pipeline exit point, carrying a stable `event` field plus
//! whatever correlation fields that exit point has on hand. Never logs
//! secrets.

/// Stable event names emitted across the OAuth pipeline.
pub mod events {
    pub const CALLBACK_SUCCESS: &str = "oauth.callback.success";
    pub const CALLBACK_FAILURE: &str = "oauth.callback.failure";
    pub const CALLBACK_ROUTE_ACCESS: &str = "oauth.callback.route.access";
    pub const TOKENS_REFRESH: &str = "oauth.tokens.refresh";
    pub const FLOW_RESET: &str = "oauth.flow.reset";
    pub const INITIATE_ATTEMPT: &str = "oauth.initiate.attempt";
    pub const REFRESH_ATTEMPT: &str = "oauth.refresh.attempt";
}

/// Records a successful callback (`events::CALLBACK_SUCCESS`).
pub fn record_callback_success(tenant_id: &str, integration_id: &str, provider_slug: &str) {
    tracing::info!(
        event = events::CALLBACK_SUCCESS,
        tenant_id,
        integration_id,
        provider = provider_slug,
        "oauth callback completed"
    );
}

/// Records a failed callback (`events::CALLBACK_FAILURE`). `error_code` is
/// the stable machine-readable code, never the generic user-facing message
/// or any internal detail.
pub fn record_callback_failure(error_code: &str, is_duplicate: bool) {
    tracing::warn!(
        event = events::CALLBACK_FAILURE,
        error_code,
        duplicate_attempt = is_duplicate,
        "oauth callback failed"
    );
}

pub fn record_route_access(route: &str) {
    tracing::info!(event = events::CALLBACK_ROUTE_ACCESS, route, "public oauth route accessed");
}

pub fn record_tokens_refresh(tenant_id: &str, integration_id: &str, forced: bool) {
    tracing::info!(
        event = events::TOKENS_REFRESH,
        tenant_id,
        integration_id,
        forced,
        "oauth tokens refreshed"
    );
}

pub fn record_flow_reset(tenant_id: &str, integration_id: &str) {
    tracing::info!(event = events::FLOW_RESET, tenant_id, integration_id, "oauth flow reset");
}

pub fn record_initiate_attempt(tenant_id: &str, integration_id: &str) {
    tracing::info!(
        event = events::INITIATE_ATTEMPT,
        tenant_id,
        integration_id,
        "oauth initiation attempted"
    );
}

pub fn record_refresh_attempt(tenant_id: &str, integration_id: &str) {
    tracing::info!(
        event = events::REFRESH_ATTEMPT,
        tenant_id,
        integration_id,
        "oauth refresh attempted"
    );
}

/// Emits a separate high-severity record whenever a callback attempt carries
/// non-empty `securityIssues` (`spec.md` §4.1, "audit logging").
pub fn record_security_issues(issues: &[String]) {
    if issues.is_empty() {
        return;
    }
    tracing::error!(event = "oauth.callback.security_issue", issues = ?issues, "security issue observed during callback");
}
