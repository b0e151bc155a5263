//! The byte-level read loop shared by the server and the client (§4.A).
//!
//! Generic over [`tokio::io::AsyncRead`] so both sides reuse the identical
//! bounded read strategy instead of each hand-rolling their own
//! accumulation loop.

use tcpproto_proto::{ProtocolError, header};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::CoreError;

/// Reads bytes until the first `CRLF CRLF`, repeatedly reading up to
/// `buf_size` bytes at a time. Returns the header block (excluding the
/// terminator) and whatever bytes past the terminator arrived in the same
/// read (the leading portion of the body, to be handed to [`read_body`] as
/// a prefix).
///
/// # Errors
///
/// - [`ProtocolError::HeaderTooLarge`] if `max_header > 0` and the
///   accumulator exceeds it before the terminator appears.
/// - [`ProtocolError::UnexpectedEof`] if the stream closes first.
/// - [`CoreError::Io`] on any underlying I/O error.
pub async fn read_header<R: AsyncRead + Unpin>(
    stream: &mut R,
    buf_size: usize,
    max_header: usize,
) -> Result<(Vec<u8>, Vec<u8>), CoreError> {
    let mut acc = Vec::new();
    let mut chunk = vec![0u8; buf_size];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(ProtocolError::UnexpectedEof.into());
        }
        acc.extend_from_slice(&chunk[..n]);

        if let Some((head, rest)) = header::split_on_terminator(&acc) {
            return Ok((head.to_vec(), rest.to_vec()));
        }
        if max_header > 0 && acc.len() > max_header {
            return Err(ProtocolError::HeaderTooLarge.into());
        }
    }
}

/// Reads exactly `content_length` bytes, starting from an already-read
/// `prefix` and reading further from `stream` as needed. Surplus bytes
/// already present in `prefix` beyond `content_length` are discarded
/// (sequential-exchange protocol; no pipelining).
///
/// # Errors
///
/// - [`ProtocolError::BodyTooLarge`] if `max_body > 0` and
///   `content_length > max_body`, checked before any further read.
/// - [`ProtocolError::UnexpectedEof`] if the stream closes before
///   `content_length` bytes have arrived.
/// - [`CoreError::Io`] on any underlying I/O error.
pub async fn read_body<R: AsyncRead + Unpin>(
    stream: &mut R,
    mut prefix: Vec<u8>,
    content_length: usize,
    max_body: usize,
) -> Result<Vec<u8>, CoreError> {
    if max_body > 0 && content_length > max_body {
        return Err(ProtocolError::BodyTooLarge { declared: content_length, max: max_body }.into());
    }

    if prefix.len() >= content_length {
        prefix.truncate(content_length);
        return Ok(prefix);
    }

    let mut body = prefix;
    let mut chunk = vec![0u8; 8192];
    while body.len() < content_length {
        let want = (content_length - body.len()).min(chunk.len());
        let n = stream.read(&mut chunk[..want]).await?;
        if n == 0 {
            return Err(ProtocolError::UnexpectedEof.into());
        }
        body.extend_from_slice(&chunk[..n]);
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[tokio::test]
    async fn read_header_stops_at_terminator_and_keeps_prefix() {
        let mut stream = Cursor::new(b"A:1\r\n\r\nBODY".to_vec());
        let (head, prefix) = read_header(&mut stream, 4096, 0).await.unwrap();
        assert_eq!(head, b"A:1");
        assert_eq!(prefix, b"BODY");
    }

    #[tokio::test]
    async fn read_header_rejects_oversized_header() {
        let mut stream = Cursor::new(vec![b'x'; 2048]);
        let err = read_header(&mut stream, 256, 512).await.unwrap_err();
        assert!(matches!(err, CoreError::Protocol(ProtocolError::HeaderTooLarge)));
    }

    #[tokio::test]
    async fn read_header_fails_on_eof_before_terminator() {
        let mut stream = Cursor::new(b"no terminator here".to_vec());
        let err = read_header(&mut stream, 4096, 0).await.unwrap_err();
        assert!(matches!(err, CoreError::Protocol(ProtocolError::UnexpectedEof)));
    }

    #[tokio::test]
    async fn read_body_consumes_prefix_then_stream() {
        let mut stream = Cursor::new(b"LLO".to_vec());
        let body = read_body(&mut stream, b"HE".to_vec(), 5, 0).await.unwrap();
        assert_eq!(body, b"HELLO");
    }

    #[tokio::test]
    async fn read_body_discards_surplus_prefix() {
        let mut stream = Cursor::new(Vec::new());
        let body = read_body(&mut stream, b"HELLO WORLD".to_vec(), 5, 0).await.unwrap();
        assert_eq!(body, b"HELLO");
    }

    #[tokio::test]
    async fn read_body_rejects_oversized_content_length() {
        let mut stream = Cursor::new(Vec::new());
        let err = read_body(&mut stream, Vec::new(), 100, 10).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Protocol(ProtocolError::BodyTooLarge { declared: 100, max: 10 })
        ));
    }

    #[tokio::test]
    async fn read_body_fails_on_eof_before_content_length() {
        let mut stream = Cursor::new(b"HI".to_vec());
        let err = read_body(&mut stream, Vec::new(), 10, 0).await.unwrap_err();
        assert!(matches!(err, CoreError::Protocol(ProtocolError::UnexpectedEof)));
    }
}
