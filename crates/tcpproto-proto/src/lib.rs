//! Wire-level building blocks for the tcpproto protocol: the header codec,
//! the embedded-file extractor, and the request/response message model.
//!
//! This crate is sans-IO: it never touches a socket. The byte framer that
//! reads header and body bytes off a stream lives in `tcpproto-core`, since
//! both the server and the client share it.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod file;
pub mod header;
pub mod message;

pub use error::ProtocolError;
pub use file::FilePayload;
pub use header::HeaderMap;
pub use message::{Request, Response};
