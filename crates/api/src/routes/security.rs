//! `GET /api/v1/oauth/security/*` — super-admin introspection (C7,
//! `SPEC_FULL.md` §4.7 "administrative introspection responses").

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use oauthbroker_domain::security::{AttackVectorReport, DataExposureReport, MonitoringMetrics, SecurityAlert, SuspiciousPattern};
use serde::Serialize;

use crate::guards::SuperAdmin;
use crate::state::AppState;

pub async fn metrics(State(app): State<AppState>, _admin: SuperAdmin) -> Json<MonitoringMetrics> {
    Json(app.monitoring.metrics(Utc::now()))
}

#[derive(Serialize)]
pub struct SecurityReport {
    metrics: MonitoringMetrics,
    alerts: Vec<SecurityAlert>,
    patterns: Vec<SuspiciousPattern>,
}

/// Combined metrics+alerts+patterns view (`spec.md` §4.8's `/security/report`).
pub async fn report(State(app): State<AppState>, _admin: SuperAdmin) -> Json<SecurityReport> {
    Json(SecurityReport {
        metrics: app.monitoring.metrics(Utc::now()),
        alerts: app.monitoring.alerts(),
        patterns: app.monitoring.patterns(),
    })
}

pub async fn alerts(State(app): State<AppState>, _admin: SuperAdmin) -> Json<Vec<SecurityAlert>> {
    Json(app.monitoring.alerts())
}

pub async fn patterns(State(app): State<AppState>, _admin: SuperAdmin) -> Json<Vec<SuspiciousPattern>> {
    Json(app.monitoring.patterns())
}

pub async fn data_exposure_report(
    State(app): State<AppState>,
    _admin: SuperAdmin,
) -> Json<DataExposureReport> {
    Json(app.monitoring.data_exposure_report())
}

pub async fn attack_vector_report(
    State(app): State<AppState>,
    _admin: SuperAdmin,
) -> Json<AttackVectorReport> {
    Json(app.monitoring.attack_vector_report())
}
