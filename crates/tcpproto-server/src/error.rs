//! Server-level errors.

use thiserror::Error;

/// Errors raised binding or running a [`crate::Server`].
#[derive(Error, Debug)]
pub enum ServerError {
    /// Failed to bind the listening socket.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address the server attempted to bind.
        addr: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The accept loop's listener returned a fatal error.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// Failed to load the server's PKCS#8 private key for the client
    /// vault.
    #[error("failed to load private key: {0}")]
    PrivateKey(#[source] tcpproto_crypto::CryptoError),
}
