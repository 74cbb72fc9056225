//! `ApiError` → HTTP response mapping (`spec.md` §7, `SPEC_FULL.md` §4.8).
//!
//! One `#[from]` away from every layer below it, the same layered-error
//! convention `oauthbroker-infra::errors::InfraError` already establishes
//! for the domain/infra boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use oauthbroker_domain::errors::OAuthCallbackError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Callback(#[from] OAuthCallbackError),

    #[error("caller is not authenticated")]
    Unauthenticated,

    #[error("caller is not authorized to perform this action")]
    Forbidden,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Callback(err) => (
                StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                err.code(),
                err.generic_message(),
            ),
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Authentication is required"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", "Not authorized to perform this action"),
        };

        if matches!(&self, Self::Callback(OAuthCallbackError::InternalError)) {
            tracing::error!(error = %self, "internal error surfaced to an authenticated route");
        }

        (status, Json(ErrorBody { code, message })).into_response()
    }
}
