//! tcpproto server: accept loop and per-connection dispatch over raw TCP.
//!
//! # Architecture
//!
//! [`Server`] owns the listener, the [`Registry`] of command callbacks and
//! middleware, the shared [`Vault`], and an optional RSA private key for
//! the client vault. Each accepted connection is handled by
//! [`connection::handle_connection`], spawned as an independent task; no
//! state is shared between connections except these read-only handles.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod connection;
mod error;
mod registry;

use std::sync::Arc;

use rsa::RsaPrivateKey;
use tcpproto_core::Configuration;
use tcpproto_crypto::vault::Vault;
use tokio::net::TcpListener;

pub use connection::handle_connection;
pub use error::ServerError;
pub use registry::{Callback, Middleware, Registry};

/// A bound tcpproto server, ready to accept connections.
pub struct Server {
    listener: TcpListener,
    config: Configuration,
    vault: Arc<Vault>,
    private_key: Option<Arc<RsaPrivateKey>>,
    registry: Arc<Registry>,
}

impl Server {
    /// Binds `addr` and constructs a server with the given configuration,
    /// registry, and optional client-vault private key.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address can't be bound.
    pub async fn bind(
        addr: &str,
        config: Configuration,
        registry: Registry,
        private_key: Option<RsaPrivateKey>,
    ) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr: addr.to_string(), source })?;
        let vault = Arc::new(Vault::new(&config.secret_key));
        Ok(Self {
            listener,
            config,
            vault,
            private_key: private_key.map(Arc::new),
            registry: Arc::new(registry),
        })
    }

    /// The address the server ended up bound to.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error from querying the socket.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop (§4.G `Listening` state): one task per accepted
    /// connection, running until `accept` itself returns a fatal error.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Accept`] if the listener's `accept` call
    /// fails.
    pub async fn run(self) -> Result<(), ServerError> {
        loop {
            let (stream, peer) = self.listener.accept().await.map_err(ServerError::Accept)?;
            tracing::debug!(%peer, "accepted connection");

            let config = self.config.clone();
            let vault = Arc::clone(&self.vault);
            let private_key = self.private_key.clone();
            let registry = Arc::clone(&self.registry);

            tokio::spawn(async move {
                connection::handle_connection(stream, config, vault, private_key, registry).await;
            });
        }
    }
}
