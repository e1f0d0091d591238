//! Trust-chain validation against a single configured root.
//!
//! The walk starts at the leaf and moves toward the root, verifying at
//! every hop that the current certificate names the next one as issuer
//! and that its signature verifies under the next one's key. The terminal
//! self-signed certificate must then be *identical* to the configured
//! trust root -- same subject and same public key, not merely the same
//! name. Anything less is a rejection; there is no partial trust and no
//! trust-on-first-use fallback.
//!
//! Validation is a pure read: it never mutates the chain, the root, or
//! any hidden state, so repeated calls on the same inputs always agree.

use tracing::{debug, warn};

use crate::cert::{Certificate, CertificateChain, CertificateRole};
use crate::error::TrustError;

/// Validate `chain` (leaf-first) against the configured trust root.
///
/// The chain may include the self-signed root as its final element or end
/// at a certificate issued directly by the configured root. Candidate
/// issuers are taken in positional order only; the walk does not search.
///
/// # Errors
///
/// - [`TrustError::IdentityNotFound`]: the chain is empty.
/// - [`TrustError::ChainBroken`]: signature or name linkage fails at any
///   hop, or the chain ends without reaching any root.
/// - [`TrustError::UntrustedRoot`]: the chain is internally consistent but
///   anchored in a root other than the configured one.
/// - [`TrustError::InvalidRole`]: an issuing certificate lacks a CA role,
///   or the terminal certificate is not a root CA.
pub fn validate(chain: &CertificateChain, trust_root: &Certificate) -> Result<(), TrustError> {
    let certs = chain.certs();
    if certs.is_empty() {
        return Err(TrustError::IdentityNotFound {
            detail: "no identity certificate present in the provided chain".to_string(),
        });
    }

    for (idx, cert) in certs.iter().enumerate() {
        if cert.is_self_signed() {
            return check_terminal(cert, trust_root);
        }

        match certs.get(idx + 1) {
            Some(issuer) => check_link(cert, issuer)?,
            // Chain ends before any self-signed certificate. The root may
            // legitimately be omitted, so try to anchor the final
            // certificate directly in the configured trust root.
            None => return check_dangling_tail(cert, trust_root),
        }
    }

    unreachable!("every iteration either returns or advances to an existing successor")
}

/// Verify one leaf-toward-root hop: name linkage, issuer role, signature.
fn check_link(cert: &Certificate, issuer: &Certificate) -> Result<(), TrustError> {
    if cert.issuer != issuer.subject {
        warn!(
            subject = %cert.subject,
            expected_issuer = %cert.issuer,
            found = %issuer.subject,
            "issuer name mismatch in certificate chain"
        );
        return Err(TrustError::ChainBroken {
            reason: format!(
                "certificate '{}' names issuer '{}' but is followed by '{}'",
                cert.subject, cert.issuer, issuer.subject
            ),
        });
    }

    if !issuer.role.is_ca() {
        return Err(TrustError::InvalidRole {
            subject: issuer.subject.clone(),
            role: issuer.role,
        });
    }

    if cert.verify_issued_by(&issuer.public_key).is_err() {
        warn!(
            subject = %cert.subject,
            issuer = %issuer.subject,
            "certificate signature does not verify under issuer key"
        );
        return Err(TrustError::ChainBroken {
            reason: format!(
                "signature of '{}' does not verify under issuer '{}'",
                cert.subject, issuer.subject
            ),
        });
    }

    Ok(())
}

/// Compare the terminal self-signed certificate to the configured root.
///
/// Identity means subject *and* public key; the key compare is constant
/// time. Name collisions with a foreign key are exactly the attack this
/// check exists for.
fn check_terminal(terminal: &Certificate, trust_root: &Certificate) -> Result<(), TrustError> {
    if terminal.role != CertificateRole::RootCa {
        return Err(TrustError::InvalidRole {
            subject: terminal.subject.clone(),
            role: terminal.role,
        });
    }

    let key_matches = terminal.public_key.ct_eq(&trust_root.public_key);
    if terminal.subject != trust_root.subject || !key_matches {
        warn!(
            terminal = %terminal.subject,
            configured = %trust_root.subject,
            "chain terminates in a root other than the configured trust root"
        );
        return Err(TrustError::UntrustedRoot);
    }

    debug!(root = %trust_root.subject, "certificate chain anchored in trusted root");
    Ok(())
}

/// Anchor a chain whose final certificate is not self-signed.
fn check_dangling_tail(last: &Certificate, trust_root: &Certificate) -> Result<(), TrustError> {
    if last.subject == last.issuer {
        // Claims to be self-signed but its signature does not verify.
        return Err(TrustError::ChainBroken {
            reason: format!(
                "self-signed certificate '{}' has an invalid signature",
                last.subject
            ),
        });
    }

    if last.issuer != trust_root.subject {
        return Err(TrustError::ChainBroken {
            reason: format!(
                "chain ends at '{}' without reaching a self-signed certificate",
                last.subject
            ),
        });
    }

    if !trust_root.is_self_signed() || last.verify_issued_by(&trust_root.public_key).is_err() {
        // Names the trusted root but was signed by someone else.
        return Err(TrustError::UntrustedRoot);
    }

    debug!(root = %trust_root.subject, "certificate chain anchored directly in trusted root");
    Ok(())
}
