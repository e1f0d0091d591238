//! Certificate and key material types.
//!
//! - [`KeyPair`]: Ed25519 signing keypair (secret + public key)
//! - [`Certificate`]: immutable signed binding of a subject name to a
//!   public key and a role
//! - [`CertificateChain`]: leaf-first ordered sequence of certificates
//!
//! Certificates are created once (by the factory) and never mutated.
//! Public keys and signatures serialize as lowercase hex strings so a
//! persisted store stays greppable.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use ring::digest::{digest, SHA256};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use subtle::ConstantTimeEq;

use crate::error::CryptoError;
use crate::sign::{encode_tbs, verify_with_domain, CERT_SIGNATURE_DOMAIN};

/// Ed25519 signing keypair.
///
/// Owned exclusively by the entity that requested it until handed to a
/// keystore. `Debug` never prints key material.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a fresh keypair from the OS RNG.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Rebuild a keypair from its 32 secret bytes (keystore unsealing).
    #[must_use]
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(bytes),
        }
    }

    /// The 32 secret bytes (keystore sealing). Handle with care.
    #[must_use]
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// The public half of this keypair.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    pub(crate) fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Wrap raw key bytes. Point validity is checked at verification time.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Constant-time equality, for trust decisions.
    #[must_use]
    pub fn ct_eq(&self, other: &Self) -> bool {
        bool::from(self.0.ct_eq(&other.0))
    }

    pub(crate) fn verifying_key(&self) -> Result<VerifyingKey, CryptoError> {
        VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(D::Error::custom)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| D::Error::custom("expected a 32-byte hex public key"))?;
        Ok(Self(arr))
    }
}

/// 64-byte Ed25519 signature, hex on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct SignatureBytes(Vec<u8>);

impl SignatureBytes {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SignatureBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SignatureBytes({})", hex::encode(&self.0))
    }
}

impl Serialize for SignatureBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for SignatureBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map(Self).map_err(D::Error::custom)
    }
}

/// Role a certificate plays in the trust hierarchy.
///
/// Determines which basic-constraints policy applies during validation:
/// only CA roles may issue, and only a root CA may terminate a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateRole {
    /// Self-signed trust anchor.
    RootCa,
    /// Intermediate issuing authority.
    IntermediateCa,
    /// A node's own issuing identity, itself issued by the root.
    ClientCa,
    /// TLS endpoint certificate.
    Tls,
    /// Well-known node identity certificate.
    Identity,
}

impl CertificateRole {
    /// Whether this role may issue other certificates.
    #[must_use]
    pub const fn is_ca(self) -> bool {
        matches!(self, Self::RootCa | Self::IntermediateCa | Self::ClientCa)
    }

    /// Stable single-byte tag used in the canonical signed encoding.
    #[must_use]
    pub(crate) const fn tag(self) -> u8 {
        match self {
            Self::RootCa => 0,
            Self::IntermediateCa => 1,
            Self::ClientCa => 2,
            Self::Tls => 3,
            Self::Identity => 4,
        }
    }
}

impl std::fmt::Display for CertificateRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RootCa => write!(f, "ROOT_CA"),
            Self::IntermediateCa => write!(f, "INTERMEDIATE_CA"),
            Self::ClientCa => write!(f, "CLIENT_CA"),
            Self::Tls => write!(f, "TLS"),
            Self::Identity => write!(f, "IDENTITY"),
        }
    }
}

/// An immutable signed binding of a subject name to a public key.
///
/// The signature covers the canonical encoding of
/// `(subject, public_key, role, issuer)` under the certificate signing
/// domain; see [`crate::sign`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Subject distinguished name.
    pub subject: String,
    /// Issuer distinguished name (equals `subject` for a self-signed cert).
    pub issuer: String,
    /// Subject's public key.
    pub public_key: PublicKey,
    /// Role in the trust hierarchy.
    pub role: CertificateRole,
    /// Issuer's signature over the canonical encoding.
    pub signature: SignatureBytes,
}

impl Certificate {
    /// The canonical bytes this certificate's signature covers.
    #[must_use]
    pub fn to_be_signed(&self) -> Vec<u8> {
        encode_tbs(&self.subject, &self.public_key, self.role, &self.issuer)
    }

    /// Verify this certificate's signature under the given issuer key.
    pub fn verify_issued_by(&self, issuer_key: &PublicKey) -> Result<(), CryptoError> {
        verify_with_domain(
            issuer_key,
            CERT_SIGNATURE_DOMAIN,
            &self.to_be_signed(),
            &self.signature,
        )
    }

    /// A certificate is self-signed when it names itself as issuer and its
    /// signature verifies under its own key. A self-*named* certificate
    /// whose signature does not verify is not self-signed.
    #[must_use]
    pub fn is_self_signed(&self) -> bool {
        self.subject == self.issuer && self.verify_issued_by(&self.public_key).is_ok()
    }

    /// SHA-256 fingerprint (lowercase hex) of the canonical encoding plus
    /// signature. Stable across processes for identical certificates.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut material = self.to_be_signed();
        material.extend_from_slice(self.signature.as_bytes());
        hex::encode(digest(&SHA256, &material).as_ref())
    }
}

/// Leaf-first ordered sequence of certificates, ending (optionally) at a
/// self-signed root.
///
/// The container does not enforce the adjacent-pair linkage invariant;
/// that is the validator's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateChain {
    certs: Vec<Certificate>,
}

impl CertificateChain {
    #[must_use]
    pub fn new(certs: Vec<Certificate>) -> Self {
        Self { certs }
    }

    /// The leaf certificate, if the chain is non-empty.
    #[must_use]
    pub fn leaf(&self) -> Option<&Certificate> {
        self.certs.first()
    }

    /// All certificates, leaf-first.
    #[must_use]
    pub fn certs(&self) -> &[Certificate] {
        &self.certs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Certificate> {
        self.certs.iter()
    }
}

impl From<Vec<Certificate>> for CertificateChain {
    fn from(certs: Vec<Certificate>) -> Self {
        Self::new(certs)
    }
}

impl<'a> IntoIterator for &'a CertificateChain {
    type Item = &'a Certificate;
    type IntoIter = std::slice::Iter<'a, Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;

    #[test]
    fn keypair_debug_redacts_secret() {
        let kp = KeyPair::generate();
        let dbg = format!("{kp:?}");
        assert!(dbg.contains("[REDACTED]"));
        assert!(!dbg.contains(&hex::encode(kp.secret_bytes())));
    }

    #[test]
    fn keypair_secret_round_trip() {
        let kp = KeyPair::generate();
        let restored = KeyPair::from_secret_bytes(&kp.secret_bytes());
        assert_eq!(kp.public_key(), restored.public_key());
    }

    #[test]
    fn certificate_serde_round_trip() {
        let key = KeyPair::generate();
        let cert = factory::self_signed_root("Trellis Root CA", &key);

        let json = serde_json::to_string(&cert).unwrap();
        let parsed: Certificate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cert);
        assert!(parsed.is_self_signed());
    }

    #[test]
    fn public_key_serializes_as_hex() {
        let key = KeyPair::generate().public_key();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json.len(), 64 + 2);
        assert!(json.trim_matches('"').chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_is_stable_hex() {
        let key = KeyPair::generate();
        let cert = factory::self_signed_root("Trellis Root CA", &key);
        let fp = cert.fingerprint();
        assert_eq!(fp, cert.fingerprint());
        assert_eq!(fp.len(), 64);
    }

    #[test]
    fn self_named_but_foreign_signed_is_not_self_signed() {
        let key = KeyPair::generate();
        let other = KeyPair::generate();
        let mut cert = factory::self_signed_root("Impostor Root", &key);
        // Re-sign the same tuple with an unrelated key.
        cert.signature = crate::sign::sign_with_domain(
            &other,
            crate::sign::CERT_SIGNATURE_DOMAIN,
            &cert.to_be_signed(),
        );
        assert_eq!(cert.subject, cert.issuer);
        assert!(!cert.is_self_signed());
    }

    #[test]
    fn ca_role_policy() {
        assert!(CertificateRole::RootCa.is_ca());
        assert!(CertificateRole::IntermediateCa.is_ca());
        assert!(CertificateRole::ClientCa.is_ca());
        assert!(!CertificateRole::Tls.is_ca());
        assert!(!CertificateRole::Identity.is_ca());
    }
}
