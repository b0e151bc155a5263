//! The server-held symmetric vault (§4.F.1): AES-256-GCM tokens keyed by a
//! shared secret, issued and decrypted only by the process that holds the
//! secret.

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{
        Aead, KeyInit,
        rand_core::{OsRng, RngCore},
    },
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use zeroize::Zeroize;

use crate::error::CryptoError;

const NONCE_LEN: usize = 12;
const PAD_BYTE: u8 = b'$';
const SEPARATOR: &str = "%EQUALS%";

/// Right-pads (or truncates) `secret` to exactly 32 bytes with `$` (`0x24`),
/// the AES-256-GCM key for the vault.
#[must_use]
pub fn derive_key(secret: &[u8]) -> [u8; 32] {
    let mut key = [PAD_BYTE; 32];
    let n = secret.len().min(32);
    key[..n].copy_from_slice(&secret[..n]);
    key
}

/// A server's vault: wraps the derived key and performs authenticated
/// encryption/decryption of `key%EQUALS%value` tokens.
pub struct Vault {
    key: [u8; 32],
}

impl Vault {
    /// Derives a vault from the configured shared secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self { key: derive_key(secret) }
    }

    /// Encrypts `(key, value)` into a base64 wire token:
    /// `base64(nonce || AES-256-GCM_seal(key + "%EQUALS%" + value))`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::VaultAuthFailure`] if the underlying AEAD
    /// fails to seal (this should not happen given a valid key, but the
    /// cipher API is fallible).
    pub fn encrypt(&self, key: &str, value: &str) -> Result<String, CryptoError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let plaintext = format!("{key}{SEPARATOR}{value}");
        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::VaultAuthFailure)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(out))
    }

    /// Decrypts a base64 wire token back into its `(key, value)` pair.
    ///
    /// Per §4.E, vault failures are non-fatal to the caller: the caller is
    /// expected to log and drop the header on `Err`, not abort the
    /// exchange.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::VaultBase64Failure`] if `token` is not valid base64.
    /// - [`CryptoError::VaultAuthFailure`] if the token is shorter than a
    ///   nonce or fails AEAD authentication.
    /// - [`CryptoError::VaultPlaintextMalformed`] if the decrypted plaintext
    ///   has no `%EQUALS%` separator.
    pub fn decrypt(&self, token: &str) -> Result<(String, String), CryptoError> {
        let raw = BASE64.decode(token).map_err(|_| CryptoError::VaultBase64Failure)?;
        if raw.len() < NONCE_LEN {
            return Err(CryptoError::VaultAuthFailure);
        }
        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CryptoError::VaultAuthFailure)?;
        let plaintext =
            String::from_utf8(plaintext).map_err(|_| CryptoError::VaultPlaintextMalformed)?;

        plaintext
            .split_once(SEPARATOR)
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .ok_or(CryptoError::VaultPlaintextMalformed)
    }
}

impl Drop for Vault {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}
