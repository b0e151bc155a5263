//! Embedded file extraction and splicing.
//!
//! A file payload, when present, is wrapped in the body by a pair of
//! boundary markers derived from a caller-chosen token: `--boundary--`
//! starts the envelope, `----boundary----` ends it. The extractor locates
//! both markers, validates their order and the declared size, and removes
//! the envelope from the body; the splicer does the reverse for outbound
//! messages.

use crate::{error::ProtocolError, header::HeaderMap};

/// An embedded file payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePayload {
    /// The file's declared name.
    pub name: String,
    /// The file's declared size in bytes. Must equal `content.len()`.
    pub size: usize,
    /// The boundary token chosen to delimit this file in the body.
    pub boundary: String,
    /// Whether a file is actually attached.
    pub present: bool,
    /// The file's raw bytes.
    pub content: Vec<u8>,
}

impl FilePayload {
    /// Builds a present file payload from its name, content, and boundary
    /// token. `size` is derived from `content.len()`.
    #[must_use]
    pub fn new(name: impl Into<String>, content: Vec<u8>, boundary: impl Into<String>) -> Self {
        let size = content.len();
        Self { name: name.into(), size, boundary: boundary.into(), present: true, content }
    }

    /// The start-of-file marker: `--{boundary}--`.
    #[must_use]
    pub fn start_marker(&self) -> Vec<u8> {
        format!("--{}--", self.boundary).into_bytes()
    }

    /// The end-of-file marker: `----{boundary}----`.
    #[must_use]
    pub fn end_marker(&self) -> Vec<u8> {
        format!("----{}----", self.boundary).into_bytes()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Removes the first occurrence of `needle` from `haystack`, if present.
fn remove_first(haystack: &[u8], needle: &[u8]) -> Vec<u8> {
    match find(haystack, needle) {
        Some(idx) => {
            let mut out = Vec::with_capacity(haystack.len() - needle.len());
            out.extend_from_slice(&haystack[..idx]);
            out.extend_from_slice(&haystack[idx + needle.len()..]);
            out
        },
        None => haystack.to_vec(),
    }
}

/// Prepends a file envelope to `body`: `start_marker || content ||
/// end_marker || body`.
#[must_use]
pub fn splice_in(body: &[u8], file: &FilePayload) -> Vec<u8> {
    let mut out = file.start_marker();
    out.extend_from_slice(&file.content);
    out.extend_from_slice(&file.end_marker());
    out.extend_from_slice(body);
    out
}

/// Extracts an embedded file from `body` per the declared `HAS_FILE`,
/// `FILE_NAME`, `FILE_SIZE`, and `FILE_BOUNDARY` headers.
///
/// Returns the rewritten body (with the envelope removed) and the extracted
/// file, or `None` if no file is declared or its boundary markers are
/// absent (a missing boundary is non-fatal: the message is treated as
/// fileless).
///
/// # Errors
///
/// - [`ProtocolError::InvalidFileHeader`] if `HAS_FILE` is `true` but
///   `FILE_NAME`, `FILE_SIZE`, or `FILE_BOUNDARY` is missing or malformed.
/// - [`ProtocolError::FileBoundaryOrder`] if the end marker occurs at or
///   before the start marker.
/// - [`ProtocolError::FileSizeMismatch`] if the bytes between the markers
///   don't match the declared `FILE_SIZE`.
pub fn extract(
    body: &[u8],
    headers: &HeaderMap,
) -> Result<(Vec<u8>, Option<FilePayload>), ProtocolError> {
    let has_file = headers.get("HAS_FILE").is_some_and(|v| v == "true");
    if !has_file {
        return Ok((body.to_vec(), None));
    }

    let name = headers
        .get("FILE_NAME")
        .ok_or_else(|| ProtocolError::InvalidFileHeader("FILE_NAME missing".to_string()))?
        .clone();
    let size: usize = headers
        .get("FILE_SIZE")
        .ok_or_else(|| ProtocolError::InvalidFileHeader("FILE_SIZE missing".to_string()))?
        .parse()
        .map_err(|_| ProtocolError::InvalidFileHeader("FILE_SIZE is not an integer".to_string()))?;
    let boundary = headers
        .get("FILE_BOUNDARY")
        .ok_or_else(|| ProtocolError::InvalidFileHeader("FILE_BOUNDARY missing".to_string()))?
        .clone();
    if boundary.is_empty() {
        return Err(ProtocolError::InvalidFileHeader("FILE_BOUNDARY is empty".to_string()));
    }

    let probe = FilePayload { name, size, boundary, present: false, content: Vec::new() };
    let start_marker = probe.start_marker();
    let end_marker = probe.end_marker();

    let (Some(start_idx), Some(end_idx)) = (find(body, &start_marker), find(body, &end_marker))
    else {
        // Boundary entirely absent: treat as no file, not an error.
        return Ok((body.to_vec(), None));
    };

    if end_idx <= start_idx {
        return Err(ProtocolError::FileBoundaryOrder);
    }

    let content_start = start_idx + start_marker.len();
    let content = body[content_start..end_idx].to_vec();
    if content.len() != probe.size {
        return Err(ProtocolError::FileSizeMismatch { declared: probe.size, actual: content.len() });
    }

    let mut new_body = remove_first(body, &end_marker);
    new_body = remove_first(&new_body, &start_marker);
    new_body = remove_first(&new_body, &content);
    while new_body.first() == Some(&b'\n') {
        new_body.remove(0);
    }

    let file = FilePayload { present: true, content, ..probe };
    Ok((new_body, Some(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_then_extract_round_trips() {
        let file = FilePayload::new("hello.txt", b"hello, world!".to_vec(), "BND");
        let body = splice_in(b"rest of the message", &file);

        let mut headers = HeaderMap::new();
        headers.insert("HAS_FILE".to_string(), "true".to_string());
        headers.insert("FILE_NAME".to_string(), file.name.clone());
        headers.insert("FILE_SIZE".to_string(), file.size.to_string());
        headers.insert("FILE_BOUNDARY".to_string(), file.boundary.clone());

        let (new_body, extracted) = extract(&body, &headers).unwrap();
        let extracted = extracted.unwrap();
        assert_eq!(extracted.content, b"hello, world!");
        assert_eq!(extracted.name, "hello.txt");
        assert_eq!(new_body, b"rest of the message");
    }

    #[test]
    fn no_has_file_header_returns_none() {
        let headers = HeaderMap::new();
        let (body, file) = extract(b"plain body", &headers).unwrap();
        assert_eq!(body, b"plain body");
        assert!(file.is_none());
    }

    #[test]
    fn missing_markers_is_non_fatal() {
        let mut headers = HeaderMap::new();
        headers.insert("HAS_FILE".to_string(), "true".to_string());
        headers.insert("FILE_NAME".to_string(), "f".to_string());
        headers.insert("FILE_SIZE".to_string(), "3".to_string());
        headers.insert("FILE_BOUNDARY".to_string(), "BND".to_string());

        let (body, file) = extract(b"no markers here", &headers).unwrap();
        assert_eq!(body, b"no markers here");
        assert!(file.is_none());
    }

    #[test]
    fn reversed_markers_is_an_error() {
        let mut headers = HeaderMap::new();
        headers.insert("HAS_FILE".to_string(), "true".to_string());
        headers.insert("FILE_NAME".to_string(), "f".to_string());
        headers.insert("FILE_SIZE".to_string(), "3".to_string());
        headers.insert("FILE_BOUNDARY".to_string(), "BND".to_string());

        let body = b"----BND---- reversed --BND--".to_vec();
        assert!(matches!(extract(&body, &headers), Err(ProtocolError::FileBoundaryOrder)));
    }

    #[test]
    fn size_mismatch_is_an_error() {
        let file = FilePayload::new("f", b"0123456789".to_vec(), "BND");
        let body = splice_in(b"", &file);

        let mut headers = HeaderMap::new();
        headers.insert("HAS_FILE".to_string(), "true".to_string());
        headers.insert("FILE_NAME".to_string(), "f".to_string());
        headers.insert("FILE_SIZE".to_string(), "3".to_string());
        headers.insert("FILE_BOUNDARY".to_string(), "BND".to_string());

        assert!(matches!(extract(&body, &headers), Err(ProtocolError::FileSizeMismatch { .. })));
    }

    proptest::proptest! {
        // Invariant 2 (§8): splicing a file payload into a body and then
        // extracting it back yields the same name/size/content, and the
        // non-file body is restored. Content and the surrounding body are
        // kept to a marker-free alphabet so they can't be mistaken for a
        // boundary marker themselves.
        #[test]
        fn splice_then_extract_round_trips_for_arbitrary_payloads(
            name in "[A-Za-z0-9_.]{1,12}",
            content in "[A-Za-z0-9]{0,64}",
            rest in "[A-Za-z0-9 ]{0,64}",
        ) {
            let file = FilePayload::new(name.clone(), content.clone().into_bytes(), "BND");
            let body = splice_in(rest.as_bytes(), &file);

            let mut headers = HeaderMap::new();
            headers.insert("HAS_FILE".to_string(), "true".to_string());
            headers.insert("FILE_NAME".to_string(), file.name.clone());
            headers.insert("FILE_SIZE".to_string(), file.size.to_string());
            headers.insert("FILE_BOUNDARY".to_string(), file.boundary.clone());

            let (new_body, extracted) = extract(&body, &headers).unwrap();
            let extracted = extracted.unwrap();
            proptest::prop_assert_eq!(extracted.name, name);
            proptest::prop_assert_eq!(extracted.content, content.into_bytes());
            proptest::prop_assert_eq!(new_body, rest.into_bytes());
        }
    }
}
