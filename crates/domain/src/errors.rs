//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for OAuthBroker
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum OAuthBrokerError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Security error: {0}")]
    Security(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for OAuthBroker operations
pub type Result<T> = std::result::Result<T, OAuthBrokerError>;

/// Error kinds surfaced by the OAuth callback pipeline (`spec.md` §7).
///
/// Every variant maps to a stable error code, a generic user-facing message
/// (never the provider's or our own internal detail), and — for authenticated
/// routes — an HTTP status. The callback pipeline never lets one of these
/// escape as a raw error response; it always converts to a redirect.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code", content = "detail")]
pub enum OAuthCallbackError {
    #[error("provider returned an error: {0}")]
    ProviderError(String),

    #[error("missing required callback parameters")]
    MissingParameters,

    #[error("invalid state parameter")]
    InvalidState,

    #[error("state parameter could not be decoded")]
    StateDecodeError,

    #[error("state parameter structure is invalid: {0}")]
    InvalidStateStructure(String),

    #[error("state parameter has expired")]
    StateExpired,

    #[error("nonce is invalid")]
    InvalidNonce,

    #[error("integration not found")]
    IntegrationNotFound,

    #[error("integration is already configured")]
    AlreadyConfigured,

    #[error("provider is unavailable")]
    ProviderUnavailable,

    #[error("provider is disabled")]
    ProviderDisabled,

    #[error("PKCE parameters are invalid")]
    InvalidPkceParameters,

    #[error("redirect URI is invalid")]
    InvalidRedirectUri,

    #[error("redirect URI does not match the registered value")]
    RedirectUriMismatch,

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("internal error")]
    InternalError,
}

impl OAuthCallbackError {
    /// Stable, machine-readable error code (matches `spec.md` §7 literally).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ProviderError(_) => "PROVIDER_ERROR",
            Self::MissingParameters => "MISSING_PARAMETERS",
            Self::InvalidState => "INVALID_STATE",
            Self::StateDecodeError => "STATE_DECODE_ERROR",
            Self::InvalidStateStructure(_) => "INVALID_STATE_STRUCTURE",
            Self::StateExpired => "STATE_EXPIRED",
            Self::InvalidNonce => "INVALID_NONCE",
            Self::IntegrationNotFound => "INTEGRATION_NOT_FOUND",
            Self::AlreadyConfigured => "ALREADY_CONFIGURED",
            Self::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            Self::ProviderDisabled => "PROVIDER_DISABLED",
            Self::InvalidPkceParameters => "INVALID_PKCE_PARAMETERS",
            Self::InvalidRedirectUri => "INVALID_REDIRECT_URI",
            Self::RedirectUriMismatch => "REDIRECT_URI_MISMATCH",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Generic, user-safe message. Never includes provider or internal detail
    /// (`spec.md` §4.1 error response generator, §8 property 2).
    #[must_use]
    pub fn generic_message(&self) -> &'static str {
        match self {
            Self::ProviderError(_) => "The provider could not complete the request",
            Self::MissingParameters => "The callback request was incomplete",
            Self::InvalidState | Self::StateDecodeError | Self::InvalidStateStructure(_) => {
                "This authorization link is no longer valid, please try again"
            }
            Self::StateExpired => "Request has expired, please try again",
            Self::InvalidNonce => "This authorization link is no longer valid, please try again",
            Self::IntegrationNotFound => "Integration not found or access denied",
            Self::AlreadyConfigured => "This integration is already connected",
            Self::ProviderUnavailable | Self::ProviderDisabled => {
                "This provider is not currently available"
            }
            Self::InvalidPkceParameters => {
                "This authorization link is no longer valid, please try again"
            }
            Self::InvalidRedirectUri | Self::RedirectUriMismatch => {
                "This authorization link is no longer valid, please try again"
            }
            Self::ValidationError(_) => "The request could not be processed",
            Self::InternalError => "Something went wrong, please try again",
        }
    }

    /// Shorthand for the provider error that maps to `spec.md` S5's exchange
    /// failure (`invalid_grant`).
    #[must_use]
    pub fn provider_invalid_grant() -> Self {
        Self::ProviderError("invalid_grant".to_string())
    }

    /// HTTP status returned by authenticated routes for this error
    /// (`spec.md` §7 propagation policy). Callback-pipeline errors never use
    /// this directly — they always become a redirect.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::IntegrationNotFound | Self::ProviderUnavailable | Self::ProviderDisabled => 404,
            Self::MissingParameters
            | Self::ValidationError(_)
            | Self::InvalidPkceParameters
            | Self::InvalidRedirectUri
            | Self::RedirectUriMismatch
            | Self::InvalidState
            | Self::StateDecodeError
            | Self::InvalidStateStructure(_)
            | Self::StateExpired
            | Self::InvalidNonce => 400,
            Self::AlreadyConfigured => 409,
            Self::ProviderError(_) => 502,
            Self::InternalError => 500,
        }
    }

    /// True when this error should be recorded as a replay/duplicate attempt
    /// rather than a fresh failure (`spec.md` §4.4, open question in §9).
    #[must_use]
    pub fn is_duplicate_attempt(&self) -> bool {
        matches!(self, Self::AlreadyConfigured)
    }
}
