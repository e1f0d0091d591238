//! # trellis-keystore
//!
//! Password-protected on-disk container of private keys and their
//! certificate chains, addressable by alias.
//!
//! ## Format
//!
//! A store is a JSON envelope holding a version number and a sealed blob:
//! the entry map is serialized, then encrypted with ChaCha20-Poly1305
//! under an Argon2id key derived from the store password. Entry private
//! keys are sealed a second time under their own entry password, so
//! loading a store never exposes key material by itself.
//!
//! ## Durability
//!
//! `save` writes a temporary sibling file and renames it into place, so a
//! crash mid-write leaves either the previous store or the new one on
//! disk -- never a torn intermediate state.
//!
//! The store makes no internal concurrency guarantee; hosts that share a
//! store across threads must serialize mutations against reads.

pub mod bootstrap;
pub mod error;
pub mod names;
pub mod store;

mod crypto;

pub use bootstrap::bootstrap_dev;
pub use error::{EntryError, KeystoreError};
pub use store::{KeyStore, KeyStoreEntry};

/// Result type for keystore operations.
pub type Result<T> = std::result::Result<T, KeystoreError>;
