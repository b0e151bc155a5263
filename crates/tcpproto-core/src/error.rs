//! The umbrella error type for everything above the wire layer: framing,
//! session transport, and the parts of the exchange lifecycle that are
//! fatal to a connection.

use thiserror::Error;
use tcpproto_crypto::CryptoError;
use tcpproto_proto::ProtocolError;

/// Errors that abort the current exchange and close the connection.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A framing or header/file parse error (§7: fatal).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A plaintext RSA-OAEP message did not fit in one block. Fatal only on
    /// the client send path; server-side client-vault decrypt failures are
    /// non-fatal and handled via [`crate::session::server_ingest`].
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The default authenticator rejected the request (§4.G step 2).
    #[error("authentication rejected")]
    AuthRejected,

    /// An I/O error on the connection's byte stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
