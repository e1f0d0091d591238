//! The keystore container: alias-addressed entries, sealed on disk.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroize;

use trellis_pki::{CertificateChain, KeyPair};

use crate::crypto::{self, SealedBlob};
use crate::error::{EntryError, KeystoreError};

/// On-disk store format version.
const STORE_FORMAT_VERSION: u32 = 1;

/// The outer JSON envelope persisted to disk.
#[derive(Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    sealed: SealedBlob,
}

/// One persisted entry: an optionally present sealed private key plus the
/// certificate chain for the alias.
#[derive(Clone, Serialize, Deserialize)]
struct StoredEntry {
    /// Private key sealed under the entry password; trust-store entries
    /// carry certificates only.
    private_key: Option<SealedBlob>,
    chain: CertificateChain,
    created_at: DateTime<Utc>,
}

/// Decrypted view of one keystore entry.
#[derive(Debug)]
pub struct KeyStoreEntry {
    pub alias: String,
    /// `None` for certificate-only entries.
    pub key_pair: Option<KeyPair>,
    pub chain: CertificateChain,
    pub created_at: DateTime<Utc>,
}

/// In-memory keystore, mutable only through explicit entry updates and
/// re-persisted with [`KeyStore::save`].
#[derive(Default)]
pub struct KeyStore {
    entries: BTreeMap<String, StoredEntry>,
}

impl KeyStore {
    /// A store with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load and decrypt a store from disk.
    ///
    /// # Errors
    ///
    /// [`KeystoreError::NotFound`] when no file exists at `path`;
    /// [`KeystoreError::BadPassword`] when `password` does not decrypt the
    /// container; [`KeystoreError::Corrupt`] when the file is not a valid
    /// store.
    pub fn load(path: &Path, password: &str) -> Result<Self, KeystoreError> {
        let raw = fs::read(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                KeystoreError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                KeystoreError::io(path, e)
            }
        })?;

        let file: StoreFile = serde_json::from_slice(&raw).map_err(|e| KeystoreError::Corrupt {
            reason: format!("not a keystore file: {e}"),
        })?;
        if file.version != STORE_FORMAT_VERSION {
            return Err(KeystoreError::Corrupt {
                reason: format!(
                    "unsupported store format version {} (expected {STORE_FORMAT_VERSION})",
                    file.version
                ),
            });
        }

        let plaintext = crypto::open(password, &file.sealed)?;
        let entries: BTreeMap<String, StoredEntry> =
            serde_json::from_slice(&plaintext).map_err(|e| KeystoreError::Corrupt {
                reason: format!("entry map does not parse: {e}"),
            })?;

        debug!(path = %path.display(), entries = entries.len(), "loaded keystore");
        Ok(Self { entries })
    }

    /// Persist the store to `path`, sealed under `password`.
    ///
    /// Writes a temporary sibling file first and renames it into place, so
    /// an interrupted save never leaves a torn store observable.
    pub fn save(&self, path: &Path, password: &str) -> Result<(), KeystoreError> {
        let plaintext = serde_json::to_vec(&self.entries).map_err(|e| KeystoreError::Corrupt {
            reason: format!("entry map does not serialize: {e}"),
        })?;
        let file = StoreFile {
            version: STORE_FORMAT_VERSION,
            sealed: crypto::seal(password, &plaintext)?,
        };
        let encoded = serde_json::to_vec_pretty(&file).map_err(|e| KeystoreError::Corrupt {
            reason: format!("store envelope does not serialize: {e}"),
        })?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &encoded).map_err(|e| KeystoreError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| KeystoreError::io(path, e))?;

        debug!(path = %path.display(), entries = self.entries.len(), "saved keystore");
        Ok(())
    }

    /// Insert or overwrite an entry holding a private key and its chain.
    ///
    /// The chain is stored as given; validating it is the caller's
    /// responsibility.
    pub fn set_entry(
        &mut self,
        alias: &str,
        key_pair: &KeyPair,
        entry_password: &str,
        chain: CertificateChain,
    ) -> Result<(), KeystoreError> {
        let mut secret = key_pair.secret_bytes();
        let sealed = crypto::seal(entry_password, &secret);
        secret.zeroize();

        self.entries.insert(
            alias.to_string(),
            StoredEntry {
                private_key: Some(sealed?),
                chain,
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    /// Insert or overwrite a certificate-only entry (no private key).
    pub fn set_certificate_entry(&mut self, alias: &str, chain: CertificateChain) {
        self.entries.insert(
            alias.to_string(),
            StoredEntry {
                private_key: None,
                chain,
                created_at: Utc::now(),
            },
        );
    }

    /// Fetch an entry and unseal its private key with `entry_password`.
    pub fn get_entry(&self, alias: &str, entry_password: &str) -> Result<KeyStoreEntry, EntryError> {
        let stored = self.entries.get(alias).ok_or_else(|| EntryError::NotFound {
            alias: alias.to_string(),
        })?;

        let key_pair = match &stored.private_key {
            None => None,
            Some(sealed) => {
                let mut secret =
                    crypto::open(entry_password, sealed).map_err(|_| EntryError::WrongPassword {
                        alias: alias.to_string(),
                    })?;
                let mut bytes: [u8; 32] =
                    secret
                        .as_slice()
                        .try_into()
                        .map_err(|_| EntryError::WrongPassword {
                            alias: alias.to_string(),
                        })?;
                secret.zeroize();
                let key_pair = KeyPair::from_secret_bytes(&bytes);
                bytes.zeroize();
                Some(key_pair)
            }
        };

        Ok(KeyStoreEntry {
            alias: alias.to_string(),
            key_pair,
            chain: stored.chain.clone(),
            created_at: stored.created_at,
        })
    }

    /// The certificate chain for an alias. Chains are public material, so
    /// no entry password is required.
    pub fn certificate_chain(&self, alias: &str) -> Result<&CertificateChain, EntryError> {
        self.entries
            .get(alias)
            .map(|e| &e.chain)
            .ok_or_else(|| EntryError::NotFound {
                alias: alias.to_string(),
            })
    }

    /// Whether an entry exists for `alias`.
    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    /// All entry aliases, sorted.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("aliases", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use trellis_pki::{factory, CertificateRole};

    fn sample_chain(subject: &str) -> (KeyPair, CertificateChain) {
        let root_key = KeyPair::generate();
        let root = factory::self_signed_root("Test Root CA", &root_key);
        let key = KeyPair::generate();
        let cert = factory::issue(
            CertificateRole::ClientCa,
            &root,
            &root_key,
            subject,
            &key.public_key(),
        )
        .unwrap();
        (key, CertificateChain::new(vec![cert, root]))
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nodekeystore.json");

        let (key, chain) = sample_chain("ALICE");
        let mut store = KeyStore::empty();
        store.set_entry("client-ca", &key, "entry-pw", chain.clone()).unwrap();
        store.save(&path, "store-pw").unwrap();

        let loaded = KeyStore::load(&path, "store-pw").unwrap();
        let entry = loaded.get_entry("client-ca", "entry-pw").unwrap();
        assert_eq!(entry.chain, chain);
        assert_eq!(
            entry.key_pair.unwrap().public_key(),
            key.public_key()
        );
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = KeyStore::load(&dir.path().join("absent.json"), "pw").unwrap_err();
        assert!(matches!(err, KeystoreError::NotFound { .. }));
    }

    #[test]
    fn load_wrong_store_password_is_bad_password() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nodekeystore.json");
        let store = KeyStore::empty();
        store.save(&path, "store-pw").unwrap();

        let err = KeyStore::load(&path, "wrong").unwrap_err();
        assert!(matches!(err, KeystoreError::BadPassword));
    }

    #[test]
    fn load_garbage_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nodekeystore.json");
        fs::write(&path, b"not a keystore at all").unwrap();

        let err = KeyStore::load(&path, "pw").unwrap_err();
        assert!(matches!(err, KeystoreError::Corrupt { .. }));
    }

    #[test]
    fn get_entry_wrong_password() {
        let (key, chain) = sample_chain("ALICE");
        let mut store = KeyStore::empty();
        store.set_entry("client-ca", &key, "entry-pw", chain).unwrap();

        let err = store.get_entry("client-ca", "wrong").unwrap_err();
        assert!(matches!(err, EntryError::WrongPassword { .. }));
    }

    #[test]
    fn get_entry_unknown_alias() {
        let store = KeyStore::empty();
        let err = store.get_entry("nope", "pw").unwrap_err();
        assert!(matches!(err, EntryError::NotFound { .. }));
    }

    #[test]
    fn set_entry_overwrites() {
        let (key_a, chain_a) = sample_chain("ALICE");
        let (key_b, chain_b) = sample_chain("BOB");
        let mut store = KeyStore::empty();
        store.set_entry("client-ca", &key_a, "pw", chain_a).unwrap();
        store.set_entry("client-ca", &key_b, "pw", chain_b.clone()).unwrap();

        assert_eq!(store.len(), 1);
        let entry = store.get_entry("client-ca", "pw").unwrap();
        assert_eq!(entry.chain, chain_b);
        assert_eq!(
            entry.key_pair.unwrap().public_key(),
            key_b.public_key()
        );
    }

    #[test]
    fn chain_access_needs_no_entry_password() {
        let (key, chain) = sample_chain("ALICE");
        let mut store = KeyStore::empty();
        store.set_entry("client-ca", &key, "entry-pw", chain.clone()).unwrap();

        assert_eq!(store.certificate_chain("client-ca").unwrap(), &chain);
    }

    #[test]
    fn certificate_only_entry_has_no_key() {
        let (_, chain) = sample_chain("ALICE");
        let mut store = KeyStore::empty();
        store.set_certificate_entry("trusted-root", chain);

        let entry = store.get_entry("trusted-root", "irrelevant").unwrap();
        assert!(entry.key_pair.is_none());
    }

    #[test]
    fn save_replaces_previous_store_atomically() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nodekeystore.json");

        let (key_a, chain_a) = sample_chain("ALICE");
        let mut store = KeyStore::empty();
        store.set_entry("client-ca", &key_a, "pw", chain_a).unwrap();
        store.save(&path, "store-pw").unwrap();

        let (key_b, chain_b) = sample_chain("BOB");
        store.set_entry("client-ca", &key_b, "pw", chain_b.clone()).unwrap();
        store.save(&path, "store-pw").unwrap();

        // No temp file left behind, and the latest contents win.
        assert!(!path.with_extension("tmp").exists());
        let loaded = KeyStore::load(&path, "store-pw").unwrap();
        assert_eq!(loaded.certificate_chain("client-ca").unwrap(), &chain_b);
    }
}
