//! Error types for keystore loading, entry access and persistence.

use std::path::Path;

use thiserror::Error;

use trellis_pki::CryptoError;

/// Errors from the store I/O and format layer.
///
/// Always fatal to startup, never retried: a missing store or a wrong
/// password is an operator error, not a transient condition.
#[derive(Error, Debug)]
pub enum KeystoreError {
    /// No store file at the configured path.
    #[error("keystore not found at {path}")]
    NotFound { path: String },

    /// The store password does not decrypt the container.
    #[error("keystore password is incorrect")]
    BadPassword,

    /// The file exists but is not a valid store.
    #[error("keystore is corrupt: {reason}")]
    Corrupt { reason: String },

    /// Filesystem failure while reading or writing the store.
    #[error("keystore io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Key derivation or a signing primitive failed.
    #[error("keystore crypto operation failed: {0}")]
    Crypto(String),
}

impl KeystoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl From<CryptoError> for KeystoreError {
    fn from(e: CryptoError) -> Self {
        Self::Crypto(e.to_string())
    }
}

/// Errors from individual entry access.
#[derive(Error, Debug)]
pub enum EntryError {
    /// No entry under this alias.
    #[error("no keystore entry for alias '{alias}'")]
    NotFound { alias: String },

    /// The entry password does not decrypt the private key.
    #[error("wrong password for keystore entry '{alias}'")]
    WrongPassword { alias: String },
}
