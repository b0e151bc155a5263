//! Wire-level protocol errors.
//!
//! These cover the byte framer, header codec, and file extractor. Session
//! and transport errors live in `tcpproto-core` and `tcpproto-server`/
//! `tcpproto-client`, which wrap these via `#[from]`.

use thiserror::Error;

/// Errors raised while framing, parsing, or generating a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The header section exceeded the configured maximum before the
    /// `CRLF CRLF` terminator was found.
    #[error("header exceeded maximum size before terminator was found")]
    HeaderTooLarge,

    /// The declared `CONTENT_LENGTH` exceeded the configured maximum body
    /// size.
    #[error("content length {declared} exceeds maximum body size {max}")]
    BodyTooLarge {
        /// The `CONTENT_LENGTH` value declared by the peer.
        declared: usize,
        /// The configured maximum.
        max: usize,
    },

    /// The stream closed before the declared number of body bytes arrived.
    #[error("connection closed before the full body was read")]
    UnexpectedEof,

    /// A header line had no `:` separator.
    #[error("malformed header line: {0:?}")]
    MalformedHeader(String),

    /// `CONTENT_LENGTH` was absent or not a valid decimal integer.
    #[error("missing or invalid CONTENT_LENGTH header")]
    MissingContentLength,

    /// A header value contained a literal CR or LF byte.
    #[error("header value for {key:?} contains CR or LF")]
    IllegalHeaderValue {
        /// The offending header key.
        key: String,
    },

    /// `FILE_SIZE`, `FILE_NAME`, or `FILE_BOUNDARY` was present but
    /// malformed (not the "boundary entirely absent" case, which is
    /// non-fatal and handled by treating the message as fileless).
    #[error("invalid file header: {0}")]
    InvalidFileHeader(String),

    /// The end boundary occurred before the start boundary in the body.
    #[error("file end boundary occurs before its start boundary")]
    FileBoundaryOrder,

    /// The bytes between the boundaries did not match the declared
    /// `FILE_SIZE`.
    #[error("file size mismatch: declared {declared}, actual {actual}")]
    FileSizeMismatch {
        /// The `FILE_SIZE` header value.
        declared: usize,
        /// The number of bytes actually found between the boundaries.
        actual: usize,
    },
}
