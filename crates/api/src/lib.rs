//! # OAuthBroker API
//!
//! `axum` HTTP surface for the OAuth integration subsystem (`spec.md` §4.8).
//!
//! This crate contains:
//! - Route handlers (`routes`), one module per pipeline
//! - Authorization guards (`guards`) — `TenantOwner`/`SuperAdmin` extractors
//! - Router assembly (`router`)
//! - Shared application state (`state`)
//! - `ApiError` → HTTP response mapping (`error`)
//!
//! ## Architecture
//! - Depends on `oauthbroker-common`, `oauthbroker-domain`, `oauthbroker-core`, `oauthbroker-infra`
//! - Wires up the hexagonal architecture: concrete infra adapters behind
//!   core ports, exposed through axum handlers

pub mod error;
pub mod guards;
pub mod router;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;
