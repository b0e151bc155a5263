//! tcpproto client: a single connected send/receive exchange over raw TCP.
//!
//! [`Client`] owns the socket and the session state (cookie jar,
//! client-vault queue, vault-token replay cache) that must survive across
//! exchanges on the same connection. One [`Client::send`] call is one full
//! request/response round trip (§4.H); this crate does not pool or
//! multiplex connections.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod error;

pub use client::Client;
pub use error::ClientError;
