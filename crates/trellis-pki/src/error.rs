//! Error types for certificate issuance and trust-chain validation.

use thiserror::Error;

use crate::cert::CertificateRole;

/// Failures in the signing/verification primitives.
///
/// These indicate malformed key material or a broken cryptographic
/// operation, not a trust decision.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The key pair handed to the factory does not own the issuer
    /// certificate's public key.
    #[error("issuer key pair does not match the issuer certificate's public key")]
    IssuerKeyMismatch,

    /// The bytes do not form a valid Ed25519 point.
    #[error("invalid public key: not a valid Ed25519 point")]
    InvalidPublicKey,

    /// Signature blob has the wrong length.
    #[error("signature has invalid length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// Cryptographic verification failed.
    #[error("signature verification failed")]
    VerificationFailed,
}

/// Security-decision failures from trust-chain validation.
///
/// Every variant is fatal to node startup and is never downgraded to a
/// warning. A broken trust chain is a configuration/security fact, not a
/// transient condition.
#[derive(Error, Debug)]
pub enum TrustError {
    /// No usable identity certificate was provided.
    #[error("identity certificate not found: {detail}")]
    IdentityNotFound {
        /// Distinguishes "nothing present" from "present but unusable".
        detail: String,
    },

    /// Signature or issuer/subject linkage broke somewhere along the walk.
    #[error("certificate chain is broken: {reason}")]
    ChainBroken { reason: String },

    /// The chain is internally consistent but anchored in a root other
    /// than the configured one. The message is a user-facing contract;
    /// external consumers match on it verbatim.
    #[error("Client CA certificate must chain to the trusted root.")]
    UntrustedRoot,

    /// A certificate's role does not permit its position in the chain.
    #[error("certificate '{subject}' has role {role}, which is not permitted at its chain position")]
    InvalidRole {
        subject: String,
        role: CertificateRole,
    },
}
