//! Generic retrying HTTP client, used for non-token-exchange outbound calls.
//!
//! Not used by [`crate::integrations::oauth_client`] — see that module's doc
//! comment for why the provider token endpoint is deliberately not routed
//! through this client's retry layer.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
