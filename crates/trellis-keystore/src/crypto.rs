//! Password sealing: Argon2id key derivation + ChaCha20-Poly1305 AEAD.
//!
//! Derived keys are zeroized as soon as the cipher is constructed. An
//! AEAD authentication failure on open is reported as a bad password --
//! with an authenticated cipher the two are indistinguishable.

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::KeystoreError;

// Argon2id parameters (memory in KiB).
const ARGON2_M_COST: u32 = 19_456;
const ARGON2_T_COST: u32 = 2;
const ARGON2_P_COST: u32 = 1;

const KEY_LEN: usize = 32;
const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// A password-sealed blob as it appears on disk, all fields hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SealedBlob {
    /// Argon2id salt.
    pub kdf_salt: String,
    /// AEAD nonce.
    pub nonce: String,
    /// Ciphertext with appended authentication tag.
    pub ciphertext: String,
}

/// Derive a 32-byte key from a password with Argon2id.
fn derive_key(password: &str, salt: &[u8]) -> Result<[u8; KEY_LEN], KeystoreError> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(KEY_LEN))
        .map_err(|e| KeystoreError::Crypto(format!("argon2 parameters: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut output)
        .map_err(|e| KeystoreError::Crypto(format!("key derivation failed: {e}")))?;
    Ok(output)
}

/// Seal `plaintext` under `password` with a fresh salt and nonce.
pub(crate) fn seal(password: &str, plaintext: &[u8]) -> Result<SealedBlob, KeystoreError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let mut key = derive_key(password, &salt)?;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
    key.zeroize();

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| KeystoreError::Crypto("encryption failed".to_string()))?;

    Ok(SealedBlob {
        kdf_salt: hex::encode(salt),
        nonce: hex::encode(nonce_bytes),
        ciphertext: hex::encode(ciphertext),
    })
}

/// Open a sealed blob with `password`.
///
/// # Errors
///
/// [`KeystoreError::Corrupt`] when the blob fields are not valid hex or
/// have impossible sizes; [`KeystoreError::BadPassword`] when AEAD
/// authentication fails.
pub(crate) fn open(password: &str, blob: &SealedBlob) -> Result<Vec<u8>, KeystoreError> {
    let salt = hex::decode(&blob.kdf_salt).map_err(|e| KeystoreError::Corrupt {
        reason: format!("kdf salt is not valid hex: {e}"),
    })?;
    let nonce_bytes = hex::decode(&blob.nonce).map_err(|e| KeystoreError::Corrupt {
        reason: format!("nonce is not valid hex: {e}"),
    })?;
    if nonce_bytes.len() != NONCE_LEN {
        return Err(KeystoreError::Corrupt {
            reason: format!("nonce has length {}, expected {NONCE_LEN}", nonce_bytes.len()),
        });
    }
    let ciphertext = hex::decode(&blob.ciphertext).map_err(|e| KeystoreError::Corrupt {
        reason: format!("ciphertext is not valid hex: {e}"),
    })?;

    let mut key = derive_key(password, &salt)?;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
    key.zeroize();

    cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_slice())
        .map_err(|_| KeystoreError::BadPassword)
}
