//! Dev-mode identity provisioning.
//!
//! Generates the trust material a node would otherwise receive from an
//! operational CA: a self-signed root and a client CA issued by it. The
//! node keystore gets both private keys; the trust store gets the root
//! certificate only. Intended for development and test flows -- production
//! provisioning happens outside this crate.

use std::fs;
use std::path::Path;

use tracing::info;

use trellis_pki::{factory, CertificateChain, CertificateRole, KeyPair};

use crate::error::KeystoreError;
use crate::names::{
    CLIENT_CA_ALIAS, NODE_KEYSTORE_FILENAME, ROOT_CA_ALIAS, TRUSTED_ROOT_ALIAS,
    TRUSTSTORE_FILENAME,
};
use crate::store::KeyStore;

/// Provision dev identity stores under `certificates_dir`.
///
/// Overwrites any existing stores at that location. Returns the node
/// keystore that was written.
///
/// The generated chain for the client CA entry is `[client CA, root]`,
/// leaf-first, and validates against the root placed in the trust store.
pub fn bootstrap_dev(
    certificates_dir: &Path,
    key_store_password: &str,
    trust_store_password: &str,
    node_name: &str,
) -> Result<KeyStore, KeystoreError> {
    fs::create_dir_all(certificates_dir).map_err(|e| KeystoreError::io(certificates_dir, e))?;

    let root_key = KeyPair::generate();
    let root = factory::self_signed_root(&format!("{node_name} Dev Root CA"), &root_key);

    let ca_key = KeyPair::generate();
    let client_ca = factory::issue(
        CertificateRole::ClientCa,
        &root,
        &root_key,
        node_name,
        &ca_key.public_key(),
    )?;

    let mut keystore = KeyStore::empty();
    keystore.set_entry(
        ROOT_CA_ALIAS,
        &root_key,
        key_store_password,
        CertificateChain::new(vec![root.clone()]),
    )?;
    keystore.set_entry(
        CLIENT_CA_ALIAS,
        &ca_key,
        key_store_password,
        CertificateChain::new(vec![client_ca, root.clone()]),
    )?;
    keystore.save(
        &certificates_dir.join(NODE_KEYSTORE_FILENAME),
        key_store_password,
    )?;

    let mut truststore = KeyStore::empty();
    truststore.set_certificate_entry(TRUSTED_ROOT_ALIAS, CertificateChain::new(vec![root]));
    truststore.save(
        &certificates_dir.join(TRUSTSTORE_FILENAME),
        trust_store_password,
    )?;

    info!(
        node = node_name,
        dir = %certificates_dir.display(),
        "provisioned dev identity stores"
    );
    Ok(keystore)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use trellis_pki::validator;

    #[test]
    fn bootstrap_writes_both_stores() {
        let dir = tempdir().unwrap();
        bootstrap_dev(dir.path(), "key-pw", "trust-pw", "ALICE").unwrap();

        assert!(dir.path().join(NODE_KEYSTORE_FILENAME).exists());
        assert!(dir.path().join(TRUSTSTORE_FILENAME).exists());
    }

    #[test]
    fn bootstrapped_chain_validates_against_trust_store_root() {
        let dir = tempdir().unwrap();
        bootstrap_dev(dir.path(), "key-pw", "trust-pw", "ALICE").unwrap();

        let keystore =
            KeyStore::load(&dir.path().join(NODE_KEYSTORE_FILENAME), "key-pw").unwrap();
        let truststore =
            KeyStore::load(&dir.path().join(TRUSTSTORE_FILENAME), "trust-pw").unwrap();

        let chain = keystore.certificate_chain(CLIENT_CA_ALIAS).unwrap();
        let root = truststore
            .certificate_chain(TRUSTED_ROOT_ALIAS)
            .unwrap()
            .leaf()
            .unwrap();

        validator::validate(chain, root).unwrap();
        assert_eq!(chain.leaf().unwrap().subject, "ALICE");
    }

    #[test]
    fn client_ca_entry_holds_its_private_key() {
        let dir = tempdir().unwrap();
        let keystore = bootstrap_dev(dir.path(), "key-pw", "trust-pw", "ALICE").unwrap();

        let entry = keystore.get_entry(CLIENT_CA_ALIAS, "key-pw").unwrap();
        let key_pair = entry.key_pair.unwrap();
        assert_eq!(
            key_pair.public_key(),
            entry.chain.leaf().unwrap().public_key
        );
    }

    #[test]
    fn rebootstrap_overwrites_existing_stores() {
        let dir = tempdir().unwrap();
        bootstrap_dev(dir.path(), "key-pw", "trust-pw", "ALICE").unwrap();
        let first = KeyStore::load(&dir.path().join(NODE_KEYSTORE_FILENAME), "key-pw")
            .unwrap()
            .certificate_chain(CLIENT_CA_ALIAS)
            .unwrap()
            .leaf()
            .unwrap()
            .fingerprint();

        bootstrap_dev(dir.path(), "key-pw", "trust-pw", "ALICE").unwrap();
        let second = KeyStore::load(&dir.path().join(NODE_KEYSTORE_FILENAME), "key-pw")
            .unwrap()
            .certificate_chain(CLIENT_CA_ALIAS)
            .unwrap()
            .leaf()
            .unwrap()
            .fingerprint();

        // Fresh keys each run.
        assert_ne!(first, second);
    }
}
