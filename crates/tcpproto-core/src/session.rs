//! Reserved-prefix demultiplexing and re-emission (§4.E): the rules by
//! which `REMEMBER-`, `FORGET-`, `VAULT-`, and `CLIENT_VAULT-` headers are
//! lifted out of a raw header map and turned into cookie updates, a
//! decrypted vault view, and a decrypted client-data map — and, in the
//! other direction, how a client's held state is turned back into headers.

use indexmap::IndexMap;
use rsa::{RsaPrivateKey, RsaPublicKey};
use tcpproto_crypto::{client_vault, vault::Vault};
use tcpproto_proto::{FilePayload, header, header::HeaderMap};

use crate::{cookie::CookieJar, sysinfo::SysInfo, user::User};

/// The full request entity (§3): wire headers and body, plus the
/// session-level views the wire model alone can't populate.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Headers with every reserved-prefix entry already removed.
    pub headers: HeaderMap,
    /// The opaque body, file already extracted.
    pub body: Vec<u8>,
    /// The embedded file, if one was attached.
    pub file: Option<FilePayload>,
    /// Decrypted server-vault entries (`VAULT-*`), keyed by their plaintext
    /// key.
    pub vault: HeaderMap,
    /// Decrypted client-vault entries (`CLIENT_VAULT-*`), keyed by the
    /// plaintext key embedded in the header name.
    pub data: HeaderMap,
    /// The request's associated user, if any authenticator has set one.
    pub user: User,
}

impl Request {
    /// The dispatch key from the `COMMAND` header, if present.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        self.headers.get("COMMAND").map(String::as_str)
    }
}

/// Splits a freshly parsed wire request into its clean headers and session
/// views, per §4.E "Server ingest". Cookie updates carried by stray
/// `REMEMBER-`/`FORGET-` headers on the request are folded into `response`
/// so they continue to round-trip; this mirrors how the same headers are
/// produced on the way out (§4.D) rather than dropping them.
///
/// Vault and client-vault failures are logged and the offending header
/// dropped, per §7's non-fatal propagation policy; they never fail this
/// call.
pub fn server_ingest(
    wire: tcpproto_proto::Request,
    response: &mut tcpproto_proto::Response,
    vault: &Vault,
    private_key: Option<&RsaPrivateKey>,
    use_crypto: bool,
) -> Request {
    let mut headers = HeaderMap::new();
    let mut vault_view = HeaderMap::new();
    let mut data = HeaderMap::new();

    for (key, value) in wire.headers {
        if key.starts_with("VAULT-") {
            if use_crypto {
                match vault.decrypt(&value) {
                    Ok((k, v)) => {
                        vault_view.insert(k, v);
                    },
                    Err(err) => tracing::debug!(header = %key, %err, "dropping unreadable vault header"),
                }
            }
        } else if key.strip_prefix("REMEMBER-").is_some() {
            if let Some((name, value)) = header::decode_remember_value(&value) {
                response.set_values.insert(name, value);
            }
        } else if key.strip_prefix("FORGET-").is_some() {
            let name = value.trim().to_string();
            response.set_values.shift_remove(&name);
            response.forget.push(name);
        } else if let Some(stripped) = key.strip_prefix("CLIENT_VAULT-") {
            if use_crypto {
                match private_key {
                    Some(private_key) => match client_vault::decrypt(private_key, &value) {
                        Ok(plaintext) => match String::from_utf8(plaintext) {
                            Ok(text) => {
                                data.insert(stripped.to_string(), text);
                            },
                            Err(_) => tracing::debug!(
                                header = %key,
                                "dropping client-vault header with non-UTF-8 plaintext"
                            ),
                        },
                        Err(err) => tracing::debug!(
                            header = %key,
                            %err,
                            "dropping unreadable client-vault header"
                        ),
                    },
                    None => tracing::debug!(
                        header = %key,
                        "dropping client-vault header: no private key loaded"
                    ),
                }
            }
        } else {
            headers.insert(key, value);
        }
    }

    Request { headers, body: wire.body, file: wire.file, vault: vault_view, data, user: User::default() }
}

/// A client's held session state: its cookies, the raw server-vault tokens
/// it has been told to replay, and the plaintext client-vault entries it
/// re-encrypts on every send.
#[derive(Debug, Clone, Default)]
pub struct ClientState {
    /// Cookies the client replays on every request until forgotten.
    pub cookies: CookieJar,
    /// Server-vault tokens received via `VAULT-*`, stored verbatim and
    /// replayed unmodified (the client never decrypts these).
    pub vault_tokens: IndexMap<String, String>,
    /// Plaintext client-vault entries, re-encrypted to the server's public
    /// key on every send.
    pub client_vault: IndexMap<String, String>,
}

impl ClientState {
    /// An empty client state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a client-vault entry to be encrypted and attached on the next
    /// send.
    pub fn vault(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.client_vault.insert(key.into(), value.into());
    }
}

/// Applies §4.E "Client ingest" to a freshly parsed wire response, updating
/// `state`'s cookies and stored vault tokens in place, and returns the
/// remaining application-visible headers.
pub fn client_ingest(wire_headers: HeaderMap, state: &mut ClientState) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (key, value) in wire_headers {
        if key.strip_prefix("REMEMBER-").is_some() {
            if let Some((name, value)) = header::decode_remember_value(&value) {
                state.cookies.set(name, value);
            }
        } else if key.strip_prefix("FORGET-").is_some() {
            state.cookies.forget(value.trim());
        } else if let Some(stripped) = key.strip_prefix("VAULT-") {
            state.vault_tokens.insert(stripped.to_string(), value);
        } else {
            headers.insert(key, value);
        }
    }

    headers
}

/// Builds the headers a client attaches to every outbound request (§4.E
/// "Client emit"): replayed cookies, replayed server-vault tokens,
/// freshly-encrypted client-vault entries, and an optional `SYSINFO`
/// snapshot.
///
/// # Errors
///
/// Propagates [`tcpproto_crypto::CryptoError::MessageTooLargeForKey`] if a
/// client-vault plaintext doesn't fit in one RSA-OAEP block — fatal on the
/// client send path per §4.F.2.
pub fn client_emit(
    state: &ClientState,
    public_key: Option<&RsaPublicKey>,
    include_sysinfo: bool,
) -> Result<HeaderMap, tcpproto_crypto::CryptoError> {
    let mut headers = HeaderMap::new();

    for cookie in state.cookies.iter() {
        headers.insert(cookie.name.clone(), cookie.value.clone());
    }
    for (key, token) in &state.vault_tokens {
        headers.insert(format!("VAULT-{key}"), token.clone());
    }
    if let Some(public_key) = public_key {
        for (key, value) in &state.client_vault {
            let token = client_vault::encrypt(public_key, value.as_bytes())?;
            headers.insert(format!("CLIENT_VAULT-{key}"), token);
        }
    }
    if include_sysinfo {
        headers.insert("SYSINFO".to_string(), SysInfo::collect().to_json());
    }

    Ok(headers)
}
