//! Request and response entities: their wire-level invariants and
//! serialization.
//!
//! The session-state fields described alongside these entities in the
//! surrounding specification — the client-vault data map, the decrypted
//! server-vault view, and the opaque user record — are session concepts and
//! live one layer up, in `tcpproto-core::session`, since populating them
//! requires the vault crypto this crate deliberately does not depend on.
//! What lives here is the wire shape: headers, body, and the optional file
//! envelope, plus the cookie/vault *header groups* a response emits.

use crate::{
    error::ProtocolError,
    file::{self, FilePayload},
    header::{self, HeaderMap},
};

/// An inbound or outbound request.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// The request's header map, as parsed (or as set by the caller before
    /// [`Request::generate`]).
    pub headers: HeaderMap,
    /// The opaque body, with any embedded file already removed.
    pub body: Vec<u8>,
    /// The embedded file, if one was attached.
    pub file: Option<FilePayload>,
}

impl Request {
    /// A fresh request with no headers, body, or file, dispatching to
    /// `command`.
    #[must_use]
    pub fn with_command(command: impl Into<String>) -> Self {
        let mut req = Self::default();
        // COMMAND never contains CR/LF in practice; a malformed command is
        // a caller bug, not a runtime condition worth propagating here.
        req.headers.insert("COMMAND".to_string(), command.into());
        req
    }

    /// Reconstructs a request from parsed headers and a raw body, running
    /// file extraction (§4.C) over the body.
    ///
    /// # Errors
    ///
    /// Propagates [`ProtocolError`] from [`file::extract`].
    pub fn from_parts(headers: HeaderMap, raw_body: &[u8]) -> Result<Self, ProtocolError> {
        let (body, file) = file::extract(raw_body, &headers)?;
        Ok(Self { headers, body, file })
    }

    /// Attaches a file, to be spliced into the body on [`Request::generate`].
    pub fn attach_file(&mut self, file: FilePayload) {
        self.file = Some(file);
    }

    /// Serializes the request: splices in the file envelope if attached,
    /// sets the file headers and `CONTENT_LENGTH`, then emits the header
    /// block followed by the body.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::IllegalHeaderValue`] if any header value
    /// contains CR or LF.
    pub fn generate(&mut self) -> Result<Vec<u8>, ProtocolError> {
        let mut body = self.body.clone();
        if let Some(file) = self.file.clone() {
            header::insert(&mut self.headers, "HAS_FILE", "true")?;
            header::insert(&mut self.headers, "FILE_NAME", file.name.clone())?;
            header::insert(&mut self.headers, "FILE_SIZE", file.size.to_string())?;
            header::insert(&mut self.headers, "FILE_BOUNDARY", file.boundary.clone())?;
            body = file::splice_in(&body, &file);
        }
        header::insert(&mut self.headers, "CONTENT_LENGTH", body.len().to_string())?;

        let mut wire = header::generate(&self.headers)?;
        wire.extend_from_slice(&body);
        Ok(wire)
    }
}

/// An outbound or inbound response.
#[derive(Debug, Clone, Default)]
pub struct Response {
    /// Plain headers (group i of §4.D generation).
    pub headers: HeaderMap,
    /// Queued cookie updates, emitted as `REMEMBER-<i>` (group ii).
    pub set_values: HeaderMap,
    /// Queued cookie invalidations, emitted as `FORGET-<i>` (group iv).
    pub forget: Vec<String>,
    /// Queued server-vault entries (plaintext key/value; ciphertext is
    /// produced at generation time), emitted as `VAULT-<key>` (group iii).
    pub vault: HeaderMap,
    /// The opaque body, with any embedded file already removed.
    pub body: Vec<u8>,
    /// The embedded file, if one was attached.
    pub file: Option<FilePayload>,
    /// Accumulated callback/middleware errors, consulted by the server loop
    /// at write time (§4.G step 6).
    pub errors: Vec<String>,
}

impl Response {
    /// A fresh response, optionally dispatching to `command`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstructs a response from parsed headers and a raw body, running
    /// file extraction (§4.C) over the body. Used by the client when
    /// decoding a server's reply.
    ///
    /// # Errors
    ///
    /// Propagates [`ProtocolError`] from [`file::extract`].
    pub fn from_parts(headers: HeaderMap, raw_body: &[u8]) -> Result<Self, ProtocolError> {
        let (body, file) = file::extract(raw_body, &headers)?;
        Ok(Self { headers, body, file, ..Self::default() })
    }

    /// Queues a cookie update; emitted as `REMEMBER-<i>:
    /// <key>%EQUALS%<base64(value)>` at generation time.
    pub fn remember(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.set_values.insert(key.into(), value.into());
        self
    }

    /// Queues a cookie invalidation; emitted as `FORGET-<i>: <key>`.
    pub fn forget_cookie(&mut self, key: impl Into<String>) -> &mut Self {
        let key = key.into();
        self.set_values.shift_remove(&key);
        self.forget.push(key);
        self
    }

    /// Queues a server-vault entry under plaintext `key` and `value`;
    /// encrypted at generation time by whoever calls [`Response::generate`]
    /// with a vault encryptor.
    pub fn lock(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.vault.insert(key.into(), value.into());
        self
    }

    /// Appends an error to the response's error list (§4.G step 4/6).
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Attaches a file, to be spliced into the body on
    /// [`Response::generate`].
    pub fn attach_file(&mut self, file: FilePayload) {
        self.file = Some(file);
    }

    /// Serializes the response: splices in the file envelope if attached,
    /// sets `CONTENT_LENGTH`, then emits the four header groups in the
    /// fixed order required by §4.D — plain headers, `REMEMBER-`, `VAULT-`,
    /// `FORGET-` — followed by the body.
    ///
    /// `vault_encrypt` is given each vault `(key, value)` pair and must
    /// return the ciphertext token to emit, or `None` to drop the entry
    /// (used when the configured secret is unusable, per §4.F.1 failure
    /// policy).
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::IllegalHeaderValue`] if any plain header
    /// value contains CR or LF.
    pub fn generate(
        &mut self,
        mut vault_encrypt: impl FnMut(&str, &str) -> Option<String>,
    ) -> Result<Vec<u8>, ProtocolError> {
        let mut body = self.body.clone();
        if let Some(file) = self.file.clone() {
            header::insert(&mut self.headers, "HAS_FILE", "true")?;
            header::insert(&mut self.headers, "FILE_NAME", file.name.clone())?;
            header::insert(&mut self.headers, "FILE_SIZE", file.size.to_string())?;
            header::insert(&mut self.headers, "FILE_BOUNDARY", file.boundary.clone())?;
            body = file::splice_in(&body, &file);
        }
        header::insert(&mut self.headers, "CONTENT_LENGTH", body.len().to_string())?;

        let mut out = String::new();
        for (key, value) in &self.headers {
            if value.contains('\r') || value.contains('\n') {
                return Err(ProtocolError::IllegalHeaderValue { key: key.clone() });
            }
            out.push_str(key);
            out.push(':');
            out.push_str(value);
            out.push_str("\r\n");
        }
        for (i, (key, value)) in self.set_values.iter().enumerate() {
            out.push_str(&format!(
                "REMEMBER-{}:{}\r\n",
                i + 1,
                header::encode_remember_value(key, value)
            ));
        }
        for (key, value) in &self.vault {
            if let Some(token) = vault_encrypt(key, value) {
                out.push_str(&format!("VAULT-{key}:{token}\r\n"));
            }
        }
        for (i, key) in self.forget.iter().enumerate() {
            out.push_str(&format!("FORGET-{i}:{key}\r\n"));
        }
        out.push_str("\r\n");

        let mut wire = out.into_bytes();
        wire.extend_from_slice(&body);
        Ok(wire)
    }
}
