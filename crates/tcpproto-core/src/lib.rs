//! Configuration, the shared byte framer, and session-state transport for
//! the tcpproto protocol.
//!
//! This crate sits between the sans-IO wire model in `tcpproto-proto` and
//! the runtime glue in `tcpproto-server`/`tcpproto-client`: it owns the
//! parts of the protocol that need an async byte stream (the framer) or
//! cryptographic key material (session ingest/emit), but not a TCP listener
//! or dialer.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod cookie;
pub mod error;
pub mod framer;
pub mod session;
pub mod sysinfo;
pub mod user;

pub use config::{Authenticator, Configuration, LogLevel};
pub use cookie::{Cookie, CookieJar};
pub use error::CoreError;
pub use session::{ClientState, Request, client_emit, client_ingest, server_ingest};
pub use sysinfo::SysInfo;
pub use user::User;
