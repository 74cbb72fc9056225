//! Monitoring records derived from the callback attempt stream (`spec.md`
//! §3, "Callback Attempt" / "Suspicious Pattern" / "Security Alert").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;

/// Append-only, bounded-retention monitoring record for one callback attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackAttempt {
    pub timestamp: DateTime<Utc>,
    pub ip: String,
    pub user_agent: String,
    pub success: bool,
    pub error_code: Option<String>,
    pub tenant_id: Option<ObjectId>,
    pub integration_id: Option<ObjectId>,
    pub user_id: Option<ObjectId>,
    pub provider: Option<String>,
    pub security_issues: Vec<String>,
}

/// Severity of a detected pattern or raised alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Kind of suspicious pattern detected from the attempt stream (`spec.md`
/// §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternKind {
    HighFailureRate,
    RapidAttempts,
    IpAbuse,
    StateManipulation,
    ReplayAttack,
}

/// One detected suspicious pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousPattern {
    pub kind: PatternKind,
    pub severity: Severity,
    pub description: String,
    pub evidence: Vec<String>,
    /// `(ip, userAgent)` or bare `ip`, depending on `kind`.
    pub source: String,
    pub detected_at: DateTime<Utc>,
}

/// Lifecycle status of a [`SecurityAlert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertStatus {
    Active,
    Investigating,
    Resolved,
}

/// Aggregated `SECURITY_INCIDENT` alert, raised for every `HIGH`/`CRITICAL`
/// pattern (`spec.md` §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityAlert {
    pub id: String,
    pub patterns: Vec<SuspiciousPattern>,
    pub recommended_actions: Vec<String>,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
}

/// Administrative metrics report (`spec.md` §4.7, "current metrics").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringMetrics {
    pub total_attempts: u64,
    pub successful_attempts: u64,
    pub failed_attempts: u64,
    pub success_rate: f64,
    pub failure_rate: f64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

/// Self-check report confirming no secret material leaks into a redacted
/// projection (`spec.md` §4.7, "data-exposure self-check").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataExposureReport {
    pub checked_fields: Vec<String>,
    pub exposures_found: Vec<String>,
    pub passed: bool,
}

/// Self-check report enumerating the attack vectors this service actively
/// detects (`spec.md` §4.7, "attack-vector self-check").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackVectorReport {
    pub vectors_monitored: Vec<PatternKind>,
    pub thresholds_configured: bool,
    pub passed: bool,
}
