//! Standard filenames and aliases used in a node's certificates directory.
//!
//! Centralized so the bootstrapper and the startup gate can never drift
//! apart on naming.

/// Node keystore file (client CA key and chain).
pub const NODE_KEYSTORE_FILENAME: &str = "nodekeystore.json";

/// Trust store file (the configured trust root, certificate only).
pub const TRUSTSTORE_FILENAME: &str = "truststore.json";

/// Alias of the node's root CA entry (dev mode only).
pub const ROOT_CA_ALIAS: &str = "root-ca";

/// Alias of the node's client CA entry.
pub const CLIENT_CA_ALIAS: &str = "client-ca";

/// Alias of the trust root entry in the trust store.
pub const TRUSTED_ROOT_ALIAS: &str = "trusted-root";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_filenames_are_distinct() {
        assert_ne!(NODE_KEYSTORE_FILENAME, TRUSTSTORE_FILENAME);
    }

    #[test]
    fn aliases_are_distinct() {
        let aliases = [ROOT_CA_ALIAS, CLIENT_CA_ALIAS, TRUSTED_ROOT_ALIAS];
        for i in 0..aliases.len() {
            for j in (i + 1)..aliases.len() {
                assert_ne!(aliases[i], aliases[j]);
            }
        }
    }
}
