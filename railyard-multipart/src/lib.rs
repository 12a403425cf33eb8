// SPDX-FileCopyrightText: 2026 Railyard contributors
// SPDX-License-Identifier: MIT

//! Decoder for `multipart/form-data` request bodies.
//!
//! The decoder works directly on the raw body bytes: it locates the boundary
//! delimiters, splits the body into segments and reads the
//! `Content-Disposition` header of each segment. Payloads are returned as
//! zero-copy slices of the original body.
//!
//! # Tolerance
//!
//! Only a missing boundary fails the whole request. Segments that cannot be
//! understood (no blank line between headers and payload, no `name`
//! attribute, or a final segment that is never closed) are dropped so that
//! the parts which did parse are still surfaced.
//!
//! # Known limitation
//!
//! This is a naive decoder. A payload that contains the exact delimiter byte
//! sequence (`--` followed by the boundary) is cut at that point, and the
//! remainder is treated as a new segment. Browsers pick boundaries that are
//! very unlikely to occur in file contents, which is what makes this
//! acceptable; the decoder does not try to detect it.

use bytes::Bytes;
use memchr::memmem;
use thiserror::Error;

/// Result type for multipart decoding.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding a multipart body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The content type does not describe a multipart body with a boundary.
    #[error("malformed multipart request: {reason}")]
    MalformedRequest { reason: String },
}

/// One named field of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// The `name` attribute of the `Content-Disposition` header.
    pub name: String,
    /// The `filename` attribute, absent for plain form fields.
    pub filename: Option<String>,
    /// The part's own `Content-Type` header, if sent.
    pub content_type: Option<String>,
    /// Raw payload bytes.
    pub data: Bytes,
}

impl Part {
    /// Whether this part carries a file upload.
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }
}

/// Extract the boundary token from a request's `Content-Type` header value.
pub fn boundary(content_type: &str) -> Result<String> {
    let mime: mime::Mime = content_type
        .parse()
        .map_err(|e: mime::FromStrError| Error::MalformedRequest {
            reason: format!("invalid content type '{content_type}': {e}"),
        })?;

    if mime.type_() != mime::MULTIPART {
        return Err(Error::MalformedRequest {
            reason: format!("content type '{content_type}' is not multipart"),
        });
    }

    mime.get_param(mime::BOUNDARY)
        .map(|b| b.as_str().trim_matches('"').to_owned())
        .filter(|b| !b.is_empty())
        .ok_or_else(|| Error::MalformedRequest {
            reason: format!("no boundary in content type '{content_type}'"),
        })
}

/// Decode a multipart body using the boundary from `content_type`.
///
/// Parts are returned in body order.
pub fn parse(content_type: &str, body: &Bytes) -> Result<Vec<Part>> {
    let boundary = boundary(content_type)?;
    Ok(parse_with_boundary(&boundary, body))
}

/// Decode a multipart body with an already extracted boundary token.
pub fn parse_with_boundary(boundary: &str, body: &Bytes) -> Vec<Part> {
    let delimiter = format!("--{boundary}");
    let finder = memmem::Finder::new(delimiter.as_bytes());
    let mut parts = Vec::new();

    // Anything before the first delimiter is preamble.
    let Some(first) = finder.find(body) else {
        return parts;
    };
    let mut cursor = first + delimiter.len();

    loop {
        if body[cursor..].starts_with(b"--") {
            break;
        }
        let start = cursor + leading_line_break(&body[cursor..]);
        let Some(offset) = finder.find(&body[start..]) else {
            // never closed: truncated upload
            break;
        };
        let next = start + offset;
        let end = next - trailing_line_break(&body[start..next]);

        if let Some(part) = parse_segment(body.slice(start..end)) {
            parts.push(part);
        }
        cursor = next + delimiter.len();
    }

    parts
}

fn leading_line_break(bytes: &[u8]) -> usize {
    if bytes.starts_with(b"\r\n") {
        2
    } else if bytes.starts_with(b"\n") {
        1
    } else {
        0
    }
}

fn trailing_line_break(bytes: &[u8]) -> usize {
    if bytes.ends_with(b"\r\n") {
        2
    } else if bytes.ends_with(b"\n") {
        1
    } else {
        0
    }
}

/// Split a segment at its first blank line. Returns `(headers_end, payload_start)`.
fn header_split(segment: &[u8]) -> Option<(usize, usize)> {
    if let Some(i) = memmem::find(segment, b"\r\n\r\n") {
        return Some((i, i + 4));
    }
    memmem::find(segment, b"\n\n").map(|i| (i, i + 2))
}

fn parse_segment(segment: Bytes) -> Option<Part> {
    let (headers_end, payload_start) = header_split(&segment)?;
    let headers = String::from_utf8_lossy(&segment[..headers_end]);

    let mut name = None;
    let mut filename = None;
    let mut content_type = None;

    for line in headers.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.eq_ignore_ascii_case("content-disposition") {
            for (param, value) in disposition_params(value) {
                match param.as_str() {
                    "name" => name = Some(value),
                    "filename" => filename = Some(value),
                    _ => {}
                }
            }
        } else if key.eq_ignore_ascii_case("content-type") {
            content_type = Some(value.trim().to_owned());
        }
    }

    Some(Part {
        name: name?,
        filename,
        content_type,
        data: segment.slice(payload_start..),
    })
}

/// Parameters of a `Content-Disposition` value, keys lowercased.
///
/// The leading disposition type (`form-data`) is skipped.
fn disposition_params(value: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let Some(first) = value.find(';') else {
        return params;
    };
    let mut rest = &value[first + 1..];

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let Some(sep) = rest.find(['=', ';']) else {
            break;
        };
        if rest.as_bytes()[sep] == b';' {
            // valueless token
            rest = &rest[sep + 1..];
            continue;
        }

        let key = rest[..sep].trim().to_ascii_lowercase();
        rest = rest[sep + 1..].trim_start();

        let value = if let Some(quoted) = rest.strip_prefix('"') {
            let (value, consumed) = unquote(quoted);
            rest = &quoted[consumed..];
            rest = match rest.find(';') {
                Some(i) => &rest[i + 1..],
                None => "",
            };
            value
        } else {
            let end = rest.find(';').unwrap_or(rest.len());
            let value = rest[..end].trim().to_owned();
            rest = rest.get(end + 1..).unwrap_or("");
            value
        };

        params.push((key, value));
    }

    params
}

/// Read a quoted-string body (opening quote already consumed).
///
/// Returns the unescaped value and the number of bytes consumed, including
/// the closing quote. A backslash only escapes `"` and `\`, so Windows paths
/// sent by old browsers survive unchanged.
fn unquote(input: &str) -> (String, usize) {
    let mut value = String::new();
    let mut chars = input.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return (value, i + 1),
            '\\' => match chars.peek() {
                Some(&(_, next @ ('"' | '\\'))) => {
                    value.push(next);
                    chars.next();
                }
                _ => value.push('\\'),
            },
            c => value.push(c),
        }
    }

    (value, input.len())
}
