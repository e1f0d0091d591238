//! # trellis-node
//!
//! Node identity establishment at startup.
//!
//! A trellis node proves who it is before it does anything else: the
//! startup gate loads the node keystore, extracts the client CA
//! certificate chain, and validates it against the trust root from the
//! trust store. A node whose chain is broken, missing, or anchored in the
//! wrong root never reaches the point of opening a listener.
//!
//! # Flow
//!
//! ```text
//! NodeConfig ──> StartupIdentityGate ──> TrustChainValidator ──> STARTED
//!                      │                                           or
//!                      └── (dev mode, first run) bootstrap ──> REJECTED
//! ```

pub mod config;
pub mod error;
pub mod startup;

// Re-exports for convenience.
pub use config::NodeConfig;
pub use error::NodeError;
pub use startup::{NodeIdentity, StartupIdentityGate};

/// Result type for trellis-node operations.
pub type Result<T> = std::result::Result<T, NodeError>;
