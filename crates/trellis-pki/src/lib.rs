//! # trellis-pki
//!
//! Certificate infrastructure for trellis node identity.
//!
//! ## Architecture
//!
//! ```text
//! TRUST ROOT (self-signed, configured out-of-band)
//!        │
//!        └── Client CA (node's own issuing identity, signed by the root)
//!               │
//!               └── leaf certs (TLS, identity) -- future use
//! ```
//!
//! ## Security Model
//!
//! - Exactly one trust root; a chain either anchors in it or is rejected
//! - No trust-on-first-use, no partial trust, no retry
//! - Certificate signatures cover a domain-separated canonical encoding,
//!   so a certificate signature can never be replayed as any other kind
//!   of signed record
//! - Validation is a pure read-and-decide walk over the provided chain;
//!   it never mutates state and never searches beyond positional order
//!
//! ## Example
//!
//! ```rust,ignore
//! use trellis_pki::{factory, validator, CertificateChain, CertificateRole, KeyPair};
//!
//! let root_key = KeyPair::generate();
//! let root = factory::self_signed_root("Root CA", &root_key);
//!
//! let ca_key = KeyPair::generate();
//! let client_ca = factory::issue(
//!     CertificateRole::ClientCa,
//!     &root,
//!     &root_key,
//!     "ALICE",
//!     &ca_key.public_key(),
//! )?;
//!
//! let chain = CertificateChain::new(vec![client_ca, root.clone()]);
//! validator::validate(&chain, &root)?;
//! ```

pub mod cert;
pub mod error;
pub mod factory;
pub mod sign;
pub mod validator;

pub use cert::{Certificate, CertificateChain, CertificateRole, KeyPair, PublicKey, SignatureBytes};
pub use error::{CryptoError, TrustError};
