//! Certificate issuance.
//!
//! Two operations: mint a self-signed root, and issue a subordinate
//! certificate under an existing issuer. Ed25519 signing is deterministic,
//! so identical inputs produce byte-identical certificates.

use tracing::debug;

use crate::cert::{Certificate, CertificateRole, KeyPair, PublicKey};
use crate::error::CryptoError;
use crate::sign::{encode_tbs, sign_with_domain, CERT_SIGNATURE_DOMAIN};

/// Create a self-signed root CA certificate.
///
/// The certificate names itself as issuer and is signed by its own key.
#[must_use]
pub fn self_signed_root(subject: &str, key_pair: &KeyPair) -> Certificate {
    let public_key = key_pair.public_key();
    let tbs = encode_tbs(subject, &public_key, CertificateRole::RootCa, subject);
    let signature = sign_with_domain(key_pair, CERT_SIGNATURE_DOMAIN, &tbs);

    debug!(subject, "created self-signed root certificate");

    Certificate {
        subject: subject.to_string(),
        issuer: subject.to_string(),
        public_key,
        role: CertificateRole::RootCa,
        signature,
    }
}

/// Issue a certificate for `subject_public_key` under an existing issuer.
///
/// The issuer name is taken from the issuer certificate's subject. The
/// supplied key pair must own the issuer certificate's public key.
///
/// # Errors
///
/// Returns [`CryptoError::IssuerKeyMismatch`] when `issuer_key_pair` does
/// not match `issuer_cert`.
pub fn issue(
    role: CertificateRole,
    issuer_cert: &Certificate,
    issuer_key_pair: &KeyPair,
    subject: &str,
    subject_public_key: &PublicKey,
) -> Result<Certificate, CryptoError> {
    if !issuer_key_pair.public_key().ct_eq(&issuer_cert.public_key) {
        return Err(CryptoError::IssuerKeyMismatch);
    }

    let issuer = issuer_cert.subject.clone();
    let tbs = encode_tbs(subject, subject_public_key, role, &issuer);
    let signature = sign_with_domain(issuer_key_pair, CERT_SIGNATURE_DOMAIN, &tbs);

    debug!(subject, issuer = %issuer, %role, "issued certificate");

    Ok(Certificate {
        subject: subject.to_string(),
        issuer,
        public_key: *subject_public_key,
        role,
        signature,
    })
}
