//! Crypto-layer errors.

use thiserror::Error;

/// Errors raised by [`crate::vault`] and [`crate::client_vault`].
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The server vault token was not valid base64.
    #[error("vault token is not valid base64")]
    VaultBase64Failure,

    /// AES-GCM authentication failed, or the token was shorter than a nonce.
    #[error("vault token failed authentication")]
    VaultAuthFailure,

    /// The decrypted vault plaintext had no `%EQUALS%` separator.
    #[error("vault plaintext is malformed")]
    VaultPlaintextMalformed,

    /// RSA-OAEP decryption failed.
    #[error("RSA decryption failed")]
    RsaDecryptFailure,

    /// A client-vault plaintext exceeds what the configured key size can
    /// encrypt in one OAEP block. Fatal: the caller must not silently drop
    /// the secret.
    #[error("plaintext is too large for this RSA key")]
    MessageTooLargeForKey,

    /// A PEM file failed to parse as a PKCS#8 private key or SPKI public
    /// key.
    #[error("failed to load PEM key: {0}")]
    KeyLoad(String),

    /// Writing a PEM key to disk failed.
    #[error("failed to write PEM key: {0}")]
    KeyWrite(String),
}
