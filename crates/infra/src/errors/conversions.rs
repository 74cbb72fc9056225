//! Conversions from external infrastructure errors into domain errors.

use keyring::Error as KeyringError;
use oauthbroker_common::storage::error::StorageError;
use oauthbroker_domain::OAuthBrokerError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub OAuthBrokerError);

impl From<InfraError> for OAuthBrokerError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<OAuthBrokerError> for InfraError {
    fn from(value: OAuthBrokerError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoOAuthBrokerError {
    fn into_oauthbroker(self) -> OAuthBrokerError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → OAuthBrokerError */
/* -------------------------------------------------------------------------- */

impl IntoOAuthBrokerError for SqlError {
    fn into_oauthbroker(self) -> OAuthBrokerError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        fn looks_like_wrong_key(message: &str) -> bool {
            let lower = message.to_ascii_lowercase();
            lower.contains("not a database") || lower.contains("encrypted")
        }

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        OAuthBrokerError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        OAuthBrokerError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        OAuthBrokerError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        OAuthBrokerError::Database("foreign key constraint violation".into())
                    }
                    (_, _) if looks_like_wrong_key(&message) => OAuthBrokerError::Security(
                        "SQLCipher key rejected or database not encrypted".into(),
                    ),
                    _ => OAuthBrokerError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => OAuthBrokerError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                OAuthBrokerError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                OAuthBrokerError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                OAuthBrokerError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidParameterName(parameter_name) => {
                OAuthBrokerError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => OAuthBrokerError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => OAuthBrokerError::Database("invalid SQL query".into()),
            other => OAuthBrokerError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_oauthbroker())
    }
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → OAuthBrokerError */
/* -------------------------------------------------------------------------- */

impl IntoOAuthBrokerError for KeyringError {
    fn into_oauthbroker(self) -> OAuthBrokerError {
        use KeyringError::*;

        let description = self.to_string();

        match self {
            NoEntry => OAuthBrokerError::NotFound("keychain entry not found".into()),
            BadEncoding(_) => {
                OAuthBrokerError::Security("credential in keychain is not valid UTF-8".into())
            }
            TooLong(name, limit) => OAuthBrokerError::Security(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            Invalid(attr, reason) => {
                OAuthBrokerError::Security(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            Ambiguous(entries) => OAuthBrokerError::Security(format!(
                "multiple keychain entries matched request ({} results)",
                entries.len()
            )),
            PlatformFailure(err) => {
                OAuthBrokerError::Security(format!("keychain platform error: {err}"))
            }
            NoStorageAccess(err) => {
                OAuthBrokerError::Security(format!("unable to access secure storage: {err}"))
            }
            _ => OAuthBrokerError::Security(description),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        InfraError(value.into_oauthbroker())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → OAuthBrokerError */
/* -------------------------------------------------------------------------- */

impl IntoOAuthBrokerError for HttpError {
    fn into_oauthbroker(self) -> OAuthBrokerError {
        if self.is_timeout() {
            return OAuthBrokerError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return OAuthBrokerError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => OAuthBrokerError::Auth(message),
                404 => OAuthBrokerError::NotFound(message),
                429 => OAuthBrokerError::Network(message),
                400..=499 => OAuthBrokerError::InvalidInput(message),
                500..=599 => OAuthBrokerError::Network(message),
                _ => OAuthBrokerError::Network(message),
            };
        }

        OAuthBrokerError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_oauthbroker())
    }
}

/* -------------------------------------------------------------------------- */
/* StorageError → OAuthBrokerError */
/* -------------------------------------------------------------------------- */

impl IntoOAuthBrokerError for StorageError {
    fn into_oauthbroker(self) -> OAuthBrokerError {
        match self {
            StorageError::Connection(msg) => {
                OAuthBrokerError::Database(format!("connection error: {}", msg))
            }
            StorageError::Query(msg) => OAuthBrokerError::Database(format!("query error: {}", msg)),
            StorageError::DatabaseError(msg) => {
                OAuthBrokerError::Database(format!("database error: {}", msg))
            }
            StorageError::Encryption(msg) => {
                OAuthBrokerError::Security(format!("encryption error: {}", msg))
            }
            StorageError::Migration(msg) => {
                OAuthBrokerError::Database(format!("migration error: {}", msg))
            }
            StorageError::Keychain(msg) => {
                OAuthBrokerError::Security(format!("keychain error: {}", msg))
            }
            StorageError::WrongKeyOrNotEncrypted => {
                OAuthBrokerError::Security("wrong encryption key or database not encrypted".into())
            }
            StorageError::PoolExhausted => {
                OAuthBrokerError::Database("connection pool exhausted".into())
            }
            StorageError::Timeout(seconds) => {
                OAuthBrokerError::Database(format!("database timeout after {}s", seconds))
            }
            StorageError::InvalidConfig(msg) => {
                OAuthBrokerError::Config(format!("invalid config: {}", msg))
            }
            StorageError::SchemaVersionMismatch { expected, found } => OAuthBrokerError::Database(
                format!("schema version mismatch (expected {}, found {})", expected, found),
            ),
            StorageError::Common(common_err) => OAuthBrokerError::Database(common_err.to_string()),
            StorageError::Io(io_err) => OAuthBrokerError::Database(format!("IO error: {}", io_err)),
            StorageError::Rusqlite(sql_err) => sql_err.into_oauthbroker(),
            StorageError::R2d2(r2d2_err) => {
                OAuthBrokerError::Database(format!("connection pool error: {}", r2d2_err))
            }
            StorageError::SerdeJson(json_err) => {
                OAuthBrokerError::Database(format!("JSON error: {}", json_err))
            }
        }
    }
}

impl From<StorageError> for InfraError {
    fn from(value: StorageError) -> Self {
        InfraError(value.into_oauthbroker())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
