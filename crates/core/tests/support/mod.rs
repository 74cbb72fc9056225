//! Shared test helpers for `oauthbroker-core` integration tests.
//!
//! These helpers provide reusable fixtures and lightweight mocks so that
//! upcoming classification tests can focus on behaviour instead of boilerplate.

pub mod calendar;
pub mod wbs;
