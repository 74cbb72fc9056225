//! SQLCipher-backed storage for the integration/provider ports (`spec.md` §3).

pub mod integration_store;
pub mod manager;
pub mod sqlcipher_pool;

pub use integration_store::*;
pub use manager::*;
pub use sqlcipher_pool::*;
