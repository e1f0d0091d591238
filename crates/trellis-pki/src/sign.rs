//! Domain-separated signing over the canonical certificate encoding.
//!
//! Certificate signatures cover a length-prefixed concatenation of
//! `(subject, public_key, role, issuer)` under a fixed domain prefix.
//! Domain separation ensures a certificate signature can never be replayed
//! as any other kind of signed record, and the length prefixes make the
//! encoding injective: no two distinct tuples share an encoding.

use ed25519_dalek::Signature;

use crate::cert::{CertificateRole, KeyPair, PublicKey, SignatureBytes};
use crate::error::CryptoError;

/// Domain separation prefix for certificate signatures.
pub const CERT_SIGNATURE_DOMAIN: &[u8] = b"trellis-cert-v1:";

/// Ed25519 signature length in bytes.
const SIGNATURE_LEN: usize = 64;

/// Canonical to-be-signed encoding of a certificate tuple.
///
/// Layout: `len(subject) || subject || public_key || role_tag ||
/// len(issuer) || issuer`, with `u32` big-endian length prefixes on the
/// variable-width fields.
#[must_use]
pub fn encode_tbs(
    subject: &str,
    public_key: &PublicKey,
    role: CertificateRole,
    issuer: &str,
) -> Vec<u8> {
    let subject = subject.as_bytes();
    let issuer = issuer.as_bytes();

    let mut out = Vec::with_capacity(subject.len() + issuer.len() + 32 + 9);
    out.extend_from_slice(&u32::try_from(subject.len()).unwrap_or(u32::MAX).to_be_bytes());
    out.extend_from_slice(subject);
    out.extend_from_slice(public_key.as_bytes());
    out.push(role.tag());
    out.extend_from_slice(&u32::try_from(issuer.len()).unwrap_or(u32::MAX).to_be_bytes());
    out.extend_from_slice(issuer);
    out
}

/// Sign `data` with domain separation.
///
/// Prepends the domain prefix before signing so signatures from different
/// contexts can never be confused.
#[must_use]
pub fn sign_with_domain(key_pair: &KeyPair, domain: &[u8], data: &[u8]) -> SignatureBytes {
    let mut prefixed = Vec::with_capacity(domain.len() + data.len());
    prefixed.extend_from_slice(domain);
    prefixed.extend_from_slice(data);
    SignatureBytes::new(key_pair.sign(&prefixed).to_bytes().to_vec())
}

/// Verify a domain-separated signature.
///
/// Reconstructs the prefixed message and verifies the Ed25519 signature
/// under `public_key` using strict verification.
pub fn verify_with_domain(
    public_key: &PublicKey,
    domain: &[u8],
    data: &[u8],
    signature: &SignatureBytes,
) -> Result<(), CryptoError> {
    let raw = signature.as_bytes();
    if raw.len() != SIGNATURE_LEN {
        return Err(CryptoError::InvalidSignatureLength(raw.len()));
    }
    let sig_bytes: [u8; SIGNATURE_LEN] = raw
        .try_into()
        .map_err(|_| CryptoError::InvalidSignatureLength(raw.len()))?;
    let sig = Signature::from_bytes(&sig_bytes);

    let verifying_key = public_key.verifying_key()?;

    let mut prefixed = Vec::with_capacity(domain.len() + data.len());
    prefixed.extend_from_slice(domain);
    prefixed.extend_from_slice(data);

    verifying_key
        .verify_strict(&prefixed, &sig)
        .map_err(|_| CryptoError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_round_trip() {
        let kp = KeyPair::generate();
        let sig = sign_with_domain(&kp, CERT_SIGNATURE_DOMAIN, b"payload");
        verify_with_domain(&kp.public_key(), CERT_SIGNATURE_DOMAIN, b"payload", &sig).unwrap();
    }

    #[test]
    fn wrong_domain_rejected() {
        let kp = KeyPair::generate();
        let sig = sign_with_domain(&kp, CERT_SIGNATURE_DOMAIN, b"payload");
        let err = verify_with_domain(&kp.public_key(), b"other-domain:", b"payload", &sig)
            .unwrap_err();
        assert!(matches!(err, CryptoError::VerificationFailed));
    }

    #[test]
    fn wrong_key_rejected() {
        let kp = KeyPair::generate();
        let other = KeyPair::generate();
        let sig = sign_with_domain(&kp, CERT_SIGNATURE_DOMAIN, b"payload");
        let err = verify_with_domain(&other.public_key(), CERT_SIGNATURE_DOMAIN, b"payload", &sig)
            .unwrap_err();
        assert!(matches!(err, CryptoError::VerificationFailed));
    }

    #[test]
    fn truncated_signature_rejected() {
        let kp = KeyPair::generate();
        let sig = SignatureBytes::new(vec![0u8; 12]);
        let err = verify_with_domain(&kp.public_key(), CERT_SIGNATURE_DOMAIN, b"payload", &sig)
            .unwrap_err();
        assert!(matches!(err, CryptoError::InvalidSignatureLength(12)));
    }

    #[test]
    fn tbs_encoding_is_injective_across_field_boundaries() {
        let key = KeyPair::generate().public_key();
        // Without length prefixes these two would encode identically.
        let a = encode_tbs("AB", &key, CertificateRole::ClientCa, "C");
        let b = encode_tbs("A", &key, CertificateRole::ClientCa, "BC");
        assert_ne!(a, b);
    }

    #[test]
    fn tbs_encoding_binds_role() {
        let key = KeyPair::generate().public_key();
        let a = encode_tbs("N", &key, CertificateRole::ClientCa, "R");
        let b = encode_tbs("N", &key, CertificateRole::RootCa, "R");
        assert_ne!(a, b);
    }
}
