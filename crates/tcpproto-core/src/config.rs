//! Process-wide configuration.
//!
//! Constructed once before any server or client call and treated as
//! immutable thereafter (§3, §9 "Global configuration"). Unlike the source
//! this protocol is modeled on, which keeps a single mutable package-level
//! variable, this is a plain value passed into [`crate::session`] and into
//! the server/client constructors — reimplemented as a constructed context
//! rather than global state, per the design note's guidance.

use std::sync::Arc;

use tcpproto_proto::Response;

use crate::{error::CoreError, session::Request};

/// Logging verbosity. Maps directly onto a `tracing` filter string; kept as
/// its own type so configuration can be expressed without pulling in
/// `tracing-subscriber` at the core layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Verbose output intended for test runs.
    Test,
    /// Developer-facing diagnostic detail.
    Debug,
    /// Default operational logging.
    #[default]
    Info,
    /// Recoverable anomalies worth operator attention.
    Warning,
    /// Failures that aborted an exchange.
    Error,
}

impl LogLevel {
    /// The `tracing`/`EnvFilter` directive this level corresponds to.
    #[must_use]
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Test | LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// A default authenticator: invoked once per accepted request, before
/// middleware or the command callback (§4.G step 2). Returning `Err` closes
/// the connection without a response. Takes the request mutably so it can
/// populate `request.user` (§3 "a user record, opaque to the core").
pub type Authenticator =
    Arc<dyn Fn(&mut Request, &mut Response) -> Result<(), CoreError> + Send + Sync>;

fn accept_all(_request: &mut Request, _response: &mut Response) -> Result<(), CoreError> {
    Ok(())
}

/// Process-wide configuration (§3, §6).
#[derive(Clone)]
pub struct Configuration {
    /// The shared secret the server vault derives its AES-256-GCM key from.
    pub secret_key: Vec<u8>,
    /// Logging verbosity.
    pub log_level: LogLevel,
    /// Bytes read per `stream.read` call in the byte framer.
    pub buffer_size: usize,
    /// Maximum header-block size in bytes; `0` means unlimited.
    pub max_header_size: usize,
    /// Maximum declared `CONTENT_LENGTH` in bytes; `0` means unlimited.
    pub max_content_length: usize,
    /// Whether vault/client-vault cryptography is active. When `false`,
    /// `VAULT-`/`CLIENT_VAULT-` headers are left untouched rather than
    /// decrypted.
    pub use_crypto: bool,
    /// Whether outbound client requests attach a `SYSINFO` header.
    pub include_sysinfo: bool,
    /// Invoked once per accepted request (§4.G step 2).
    pub default_auth: Authenticator,
}

impl Configuration {
    /// A configuration with a given secret key and otherwise permissive
    /// defaults: an accept-all authenticator, crypto and sysinfo both
    /// enabled, and unlimited header/body sizes.
    #[must_use]
    pub fn new(secret_key: impl Into<Vec<u8>>) -> Self {
        Self {
            secret_key: secret_key.into(),
            log_level: LogLevel::default(),
            buffer_size: 4096,
            max_header_size: 0,
            max_content_length: 0,
            use_crypto: true,
            include_sysinfo: true,
            default_auth: Arc::new(accept_all),
        }
    }
}
