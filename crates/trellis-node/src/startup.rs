//! The startup identity gate.
//!
//! One-shot: a gate is constructed from config, runs exactly once per
//! startup attempt, and either yields the accepted [`NodeIdentity`] or a
//! terminal rejection. There is no retry -- a broken identity is a
//! configuration/security fact, not a transient condition -- and a
//! rejected node must not proceed to open listeners or join any protocol.
//!
//! The trust root comes from the trust store, never from the keystore
//! under validation.

use std::path::Path;

use tracing::{debug, info, warn};

use trellis_keystore::names::{CLIENT_CA_ALIAS, TRUSTED_ROOT_ALIAS};
use trellis_keystore::{bootstrap_dev, KeyStore};
use trellis_pki::{validator, Certificate, CertificateChain, TrustError};

use crate::config::NodeConfig;
use crate::error::NodeError;

/// The identity a node starts with once the gate has passed.
#[derive(Debug, Clone)]
pub struct NodeIdentity {
    /// Subject of the identity certificate.
    pub subject: String,
    /// The validated chain, leaf-first.
    pub chain: CertificateChain,
}

/// Gate between node construction and every other subsystem.
pub struct StartupIdentityGate {
    config: NodeConfig,
}

impl StartupIdentityGate {
    #[must_use]
    pub fn new(config: NodeConfig) -> Self {
        Self { config }
    }

    /// Run the gate. Consumes the gate: the decision is terminal for this
    /// startup attempt.
    ///
    /// # Errors
    ///
    /// [`NodeError::IdentityNotFound`] when no usable keystore, trust
    /// store or identity entry exists; [`NodeError::Trust`] when the chain
    /// fails validation against the configured trust root.
    pub fn establish(self) -> crate::Result<NodeIdentity> {
        let config = self.config;
        let keystore_path = config.node_keystore_path();

        if config.dev_mode && !keystore_path.exists() {
            debug!(node = %config.node_name, "dev mode: provisioning identity stores");
            bootstrap_dev(
                &config.certificates_directory,
                &config.key_store_password,
                &config.trust_store_password,
                &config.node_name,
            )?;
        }

        let trust_root = load_trust_root(&config)?;
        let keystore = load_node_keystore(&keystore_path, &config.key_store_password)?;

        let chain = keystore.certificate_chain(CLIENT_CA_ALIAS).map_err(|e| {
            warn!(alias = CLIENT_CA_ALIAS, error = %e, "identity entry missing from keystore");
            NodeError::IdentityNotFound {
                detail: format!("keystore is present but unusable: {e}"),
            }
        })?;

        if let Some(expected) = &config.expected_subject {
            let subject = chain.leaf().map_or("", |c| c.subject.as_str());
            if subject != expected {
                return Err(NodeError::Config(format!(
                    "identity certificate subject '{subject}' does not match configured subject '{expected}'"
                )));
            }
        }

        match validator::validate(chain, &trust_root) {
            Ok(()) => {
                let leaf = chain
                    .leaf()
                    .expect("validated chain has a leaf certificate");
                info!(
                    subject = %leaf.subject,
                    fingerprint = %leaf.fingerprint(),
                    root = %trust_root.subject,
                    "node identity accepted"
                );
                Ok(NodeIdentity {
                    subject: leaf.subject.clone(),
                    chain: chain.clone(),
                })
            }
            Err(TrustError::IdentityNotFound { detail }) => {
                Err(NodeError::IdentityNotFound { detail })
            }
            Err(e) => {
                warn!(error = %e, "node identity rejected");
                Err(NodeError::Trust(e))
            }
        }
    }
}

/// Load the configured trust root from the trust store.
///
/// Any failure here means the node has no trust anchor to validate
/// against, which surfaces as the identity-not-found diagnostic.
fn load_trust_root(config: &NodeConfig) -> crate::Result<Certificate> {
    let path = config.trust_store_path();
    let truststore =
        KeyStore::load(&path, &config.trust_store_password).map_err(|e| {
            warn!(path = %path.display(), error = %e, "trust store unavailable");
            NodeError::IdentityNotFound {
                detail: format!("trust store unavailable: {e}"),
            }
        })?;

    let chain = truststore
        .certificate_chain(TRUSTED_ROOT_ALIAS)
        .map_err(|e| NodeError::IdentityNotFound {
            detail: format!("trust store has no trusted root entry: {e}"),
        })?;

    chain
        .leaf()
        .cloned()
        .ok_or_else(|| NodeError::IdentityNotFound {
            detail: "trust store root entry holds no certificate".to_string(),
        })
}

/// Load the node keystore, folding every load failure into the
/// identity-not-found diagnostic contract.
fn load_node_keystore(path: &Path, password: &str) -> crate::Result<KeyStore> {
    KeyStore::load(path, password).map_err(|e| {
        warn!(path = %path.display(), error = %e, "node keystore unavailable");
        NodeError::IdentityNotFound {
            detail: format!("node keystore unavailable: {e}"),
        }
    })
}
