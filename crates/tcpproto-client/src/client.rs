//! A tcpproto client session (§4.H).
//!
//! The server closes the connection after every exchange (§4.G step 8), so
//! a client that wants to hold cookies or replay a vault token across
//! exchanges must dial a fresh connection per [`Client::send`] while
//! keeping its session state between calls. That's what this type does: it
//! holds the server address and the accumulated [`ClientState`], not a
//! long-lived socket. Send operations on the same client must still be
//! externally serialised (§4.H) — `send` takes `&mut self`.

use rsa::RsaPublicKey;
use tcpproto_core::{ClientState, Configuration, client_emit, client_ingest, framer};
use tcpproto_proto::{Request, Response, header};
use tokio::{io::AsyncWriteExt, net::TcpStream};

use crate::error::ClientError;

/// A tcpproto client session: a server address plus the cookie/vault state
/// accumulated across exchanges.
pub struct Client {
    addr: String,
    config: Configuration,
    state: ClientState,
    public_key: Option<RsaPublicKey>,
}

impl Client {
    /// Creates a client targeting `addr` with empty session state. Does not
    /// connect until the first [`Client::send`].
    #[must_use]
    pub fn new(addr: impl Into<String>, config: Configuration, public_key: Option<RsaPublicKey>) -> Self {
        Self { addr: addr.into(), config, state: ClientState::new(), public_key }
    }

    /// The client's cookie jar and vault-replay state, read-only.
    #[must_use]
    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// Mutable access to the client's session state, for seeding or
    /// inspecting cookies and vault tokens directly.
    pub fn state_mut(&mut self) -> &mut ClientState {
        &mut self.state
    }

    /// Queues a client-vault entry, to be RSA-OAEP-SHA512 encrypted to the
    /// server's public key on every subsequent [`Client::send`].
    pub fn vault(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.state.vault(key, value);
    }

    /// Dials a fresh connection, sends `request`, waits for the matching
    /// response, and applies client-side session ingest (§4.E) before
    /// returning it. File extraction (§4.C) runs on the response body, not
    /// the request.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Connect`] if the connection can't be established.
    /// - [`ClientError::Crypto`] if a queued client-vault entry doesn't fit
    ///   in one RSA-OAEP block.
    /// - [`ClientError::Core`] for any framing, header, or I/O failure.
    pub async fn send(&mut self, mut request: Request) -> Result<Response, ClientError> {
        let mut stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|source| ClientError::Connect { addr: self.addr.clone(), source })?;

        let extra = client_emit(&self.state, self.public_key.as_ref(), self.config.include_sysinfo)?;
        for (key, value) in extra {
            request.headers.insert(key, value);
        }

        let wire = request.generate().map_err(tcpproto_core::CoreError::from)?;
        stream.write_all(&wire).await.map_err(tcpproto_core::CoreError::from)?;

        let (header_bytes, prefix) = framer::read_header(
            &mut stream,
            self.config.buffer_size,
            self.config.max_header_size,
        )
        .await?;
        let headers = header::parse(&header_bytes).map_err(tcpproto_core::CoreError::from)?;
        let content_length =
            header::content_length(&headers).map_err(tcpproto_core::CoreError::from)?;
        let body = framer::read_body(
            &mut stream,
            prefix,
            content_length,
            self.config.max_content_length,
        )
        .await?;

        let headers = client_ingest(headers, &mut self.state);
        Response::from_parts(headers, &body).map_err(|err| tcpproto_core::CoreError::from(err).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vault_queues_a_client_vault_entry() {
        let mut client = Client::new("127.0.0.1:0", Configuration::new("secret"), None);
        client.vault("pw", "hunter2");
        assert_eq!(client.state().client_vault.get("pw").map(String::as_str), Some("hunter2"));
    }

    #[test]
    fn state_mut_allows_seeding_cookies_before_the_first_send() {
        let mut client = Client::new("127.0.0.1:0", Configuration::new("secret"), None);
        client.state_mut().cookies.set("sid", "preseeded");
        assert_eq!(client.state().cookies.get("sid").map(|c| c.value.as_str()), Some("preseeded"));
    }
}
