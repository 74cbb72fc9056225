//! Infrastructure-side error conversions.

pub mod conversions;

pub use conversions::InfraError;
