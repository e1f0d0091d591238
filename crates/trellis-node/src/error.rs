//! Error types for node identity establishment.

use thiserror::Error;

use trellis_keystore::KeystoreError;
use trellis_pki::TrustError;

/// Errors that reject node startup.
///
/// Two messages are an external contract and are reproduced verbatim:
/// `"Identity certificate not found. "` (prefix, trailing space included)
/// and, via [`TrustError::UntrustedRoot`],
/// `"Client CA certificate must chain to the trusted root."`.
#[derive(Error, Debug)]
pub enum NodeError {
    /// No usable keystore or identity certificate. External consumers
    /// match on the message prefix.
    #[error("Identity certificate not found. {detail}")]
    IdentityNotFound { detail: String },

    /// The identity chain failed trust validation.
    #[error(transparent)]
    Trust(#[from] TrustError),

    /// Keystore failure outside the load path (dev bootstrap).
    #[error(transparent)]
    Keystore(#[from] KeystoreError),

    /// Configuration is invalid or contradicts the provisioned identity.
    #[error("config error: {0}")]
    Config(String),
}
