//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe an outbound call and its raw result as plain data.
//! `ApiRequest::call_options` produces a `CallOptions`, a `Transport` turns it
//! into a `RawResponse`, and `ApiResponse::from_raw` interprets that. Nothing
//! here touches the network.
//!
//! `ResponseHeaders` is created fresh for every call and handed to the
//! transport by `&mut`, so captured headers never leak between calls.

use std::fmt;
use std::path::PathBuf;

/// HTTP verb of an `ApiRequest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file attached to a multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub path: PathBuf,
    pub mime_type: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartValue {
    Text(String),
    File(FileRef),
}

/// One named field of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartField {
    pub name: String,
    pub value: MultipartValue,
}

impl MultipartField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: MultipartValue::Text(value.into()),
        }
    }

    pub fn file(name: impl Into<String>, file: FileRef) -> Self {
        Self {
            name: name.into(),
            value: MultipartValue::File(file),
        }
    }
}

/// Encoded request body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Form-encoded or JSON-encoded text, sent as-is.
    Encoded(String),
    /// Field list; the transport picks the boundary.
    Multipart(Vec<MultipartField>),
}

impl RequestBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }
}

/// Everything a transport needs to perform one call.
///
/// TLS verification is always off: the caller trusts every peer, so it must
/// only be pointed at internal or otherwise known servers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOptions {
    pub url: String,
    pub verb: Verb,
    /// Method override sent instead of `verb` (set for PUT, PATCH and DELETE).
    pub custom_method: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub verify_tls: bool,
}

impl CallOptions {
    /// The method that goes on the wire.
    pub fn method(&self) -> &str {
        self.custom_method.as_deref().unwrap_or(self.verb.as_str())
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// What a transport hands back after a completed round-trip.
///
/// `buffer` holds the raw header block followed by the body; `header_size` is
/// the number of leading bytes that belong to the header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub header_size: usize,
    pub buffer: Vec<u8>,
}

impl RawResponse {
    pub fn body(&self) -> &[u8] {
        self.buffer.get(self.header_size..).unwrap_or_default()
    }
}

/// Response headers captured during a single call, keyed by lower-cased name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: Vec<(String, Vec<String>)>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header-line callback. Lines without a `:` (status line, blank line)
    /// are skipped. Always returns the byte length of `line`.
    pub fn record_line(&mut self, line: &str) -> usize {
        if let Some((name, value)) = line.split_once(':') {
            self.append(name.trim().to_lowercase(), value.trim().to_string());
        }
        line.len()
    }

    fn append(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// All values received for `name`, in arrival order.
    pub fn get(&self, name: &str) -> &[String] {
        let name = name.to_lowercase();
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, values)| values.as_slice())
            .unwrap_or_default()
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
