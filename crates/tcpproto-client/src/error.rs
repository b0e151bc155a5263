//! Client-level errors.

use thiserror::Error;

/// Errors raised by [`crate::Client`].
#[derive(Error, Debug)]
pub enum ClientError {
    /// Failed to connect to the server.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// The address the client attempted to dial.
        addr: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A protocol-, framing-, or crypto-level error in the exchange.
    #[error(transparent)]
    Core(#[from] tcpproto_core::CoreError),

    /// A client-vault plaintext didn't fit in one RSA-OAEP block (§4.F.2,
    /// fatal on send).
    #[error(transparent)]
    Crypto(#[from] tcpproto_crypto::CryptoError),

    /// Failed to load the server's SubjectPublicKeyInfo PEM public key.
    #[error("failed to load public key: {0}")]
    PublicKey(#[source] tcpproto_crypto::CryptoError),
}
