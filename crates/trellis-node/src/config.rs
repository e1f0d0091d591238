//! Node identity configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use trellis_keystore::names::{NODE_KEYSTORE_FILENAME, TRUSTSTORE_FILENAME};

use crate::error::NodeError;

/// Configuration consumed by the startup identity gate.
///
/// Read-only input: the gate never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// The node's legal name; the identity certificate subject in dev mode.
    pub node_name: String,

    /// When true, missing identity stores are self-generated at startup.
    /// When false, a pre-provisioned store is required.
    #[serde(default)]
    pub dev_mode: bool,

    /// Password for the node keystore and its entries.
    pub key_store_password: String,

    /// Password for the trust store.
    pub trust_store_password: String,

    /// Directory holding the node keystore and trust store files.
    pub certificates_directory: PathBuf,

    /// When set, the identity certificate's subject must match exactly.
    #[serde(default)]
    pub expected_subject: Option<String>,
}

impl NodeConfig {
    /// Load config from a TOML file.
    ///
    /// Unlike ambient server settings, identity config has no usable
    /// defaults (passwords, store locations), so the file must exist and
    /// parse.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            NodeError::Config(format!("cannot read config at {}: {e}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Path of the node keystore file.
    #[must_use]
    pub fn node_keystore_path(&self) -> PathBuf {
        self.certificates_directory.join(NODE_KEYSTORE_FILENAME)
    }

    /// Path of the trust store file.
    #[must_use]
    pub fn trust_store_path(&self) -> PathBuf {
        self.certificates_directory.join(TRUSTSTORE_FILENAME)
    }
}
