//! Per-connection exchange lifecycle (§4.G).
//!
//! Implemented as a single sequential task per connection rather than the
//! wait-group-inside-the-accept-loop shape the protocol's source exhibits —
//! the two are observationally identical (one connection handled at a
//! time, in full, before the task ends) and the plain shape is simpler to
//! read and to reason about panics in.

use std::sync::Arc;

use rsa::RsaPrivateKey;
use tcpproto_core::{Configuration, framer, server_ingest};
use tcpproto_crypto::vault::Vault;
use tcpproto_proto::{Request as WireRequest, Response, header};
use tokio::{io::AsyncWriteExt, net::TcpStream};

use crate::registry::Registry;

/// Runs one full request/response exchange over `stream`, then lets it
/// close on drop.
///
/// Framing, header, and file errors abort the exchange with no response
/// written (§7); vault and client-vault errors are absorbed inside
/// [`server_ingest`] and never reach here.
pub async fn handle_connection(
    mut stream: TcpStream,
    config: Configuration,
    vault: Arc<Vault>,
    private_key: Option<Arc<RsaPrivateKey>>,
    registry: Arc<Registry>,
) {
    if let Err(err) =
        run_exchange(&mut stream, &config, &vault, private_key.as_deref(), &registry).await
    {
        tracing::debug!(%err, "exchange aborted");
    }
}

async fn run_exchange(
    stream: &mut TcpStream,
    config: &Configuration,
    vault: &Vault,
    private_key: Option<&RsaPrivateKey>,
    registry: &Registry,
) -> Result<(), tcpproto_core::CoreError> {
    // 1. Parse one request (4.A+4.B+4.C+4.E ingest).
    let (header_bytes, prefix) =
        framer::read_header(stream, config.buffer_size, config.max_header_size).await?;
    let headers = header::parse(&header_bytes)?;
    let content_length = header::content_length(&headers)?;
    let body = framer::read_body(stream, prefix, content_length, config.max_content_length).await?;
    let wire_request = WireRequest::from_parts(headers, &body)?;

    let mut response = Response::new();
    let mut request = server_ingest(wire_request, &mut response, vault, private_key, config.use_crypto);

    // 2. Default authenticator; on failure, close with no response.
    (config.default_auth)(&mut request, &mut response)?;

    // 3. Before-response middleware.
    if registry.run_before(&mut request, &mut response).is_err() {
        return Ok(());
    }

    // 4. Command dispatch.
    registry.dispatch(&mut request, &mut response);

    // 5. After-response middleware.
    if registry.run_after(&mut request, &mut response).is_err() {
        return Ok(());
    }

    // 6. Replace with an ERROR-only response if anything failed.
    if !response.errors.is_empty() {
        let mut error_response = Response::new();
        error_response.headers.insert("ERROR".to_string(), "Internal Server Error".to_string());
        error_response.body = response.errors.join("\n").into_bytes();
        response = error_response;
    }

    // 7. Serialize and write.
    let wire = response.generate(|key, value| vault.encrypt(key, value).ok())?;
    stream.write_all(&wire).await?;

    // 8. Close the connection (drop at end of scope).
    Ok(())
}
