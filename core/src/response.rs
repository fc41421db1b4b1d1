//! Interpretation of raw transport output.
//!
//! # Design
//! Failures of the remote side are data here. A transport failure becomes
//! status 418 with a message; a status of 400 or more records the first
//! JSON:API error title (or the raw body) in `error`. The body is parsed into
//! a `Document` on a best-effort basis independently of the status, so an
//! error message and a parsed document can both be present. Only the
//! document accessors fail, and only when there is nothing to return.

use http::StatusCode;
use tracing::{debug, trace};

use crate::document::{Document, ResourceObject};
use crate::error::ApiError;
use crate::http::{RawResponse, ResponseHeaders};

/// The interpreted result of one call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    http_code: StatusCode,
    raw_response: String,
    document: Option<Document>,
    headers: ResponseHeaders,
    error: String,
}

impl ApiResponse {
    /// Status used when no response was received at all.
    pub const TRANSPORT_FAILURE_STATUS: StatusCode = StatusCode::IM_A_TEAPOT;

    /// Result of a call whose transport failed before a response arrived.
    pub fn from_transport_error(error: &ApiError, headers: ResponseHeaders) -> Self {
        Self {
            http_code: Self::TRANSPORT_FAILURE_STATUS,
            raw_response: String::new(),
            document: None,
            headers,
            error: error.to_string(),
        }
    }

    /// Interpret a completed round-trip.
    pub fn from_raw(raw: RawResponse, headers: ResponseHeaders) -> Self {
        let Ok(http_code) = StatusCode::from_u16(raw.status) else {
            let error = ApiError::Transport(format!("invalid status code {}", raw.status));
            return Self::from_transport_error(&error, headers);
        };
        let raw_response = String::from_utf8_lossy(raw.body()).into_owned();
        debug!(status = http_code.as_u16(), bytes = raw_response.len(), "response received");

        let parsed = Document::parse(&raw_response);

        let mut error = String::new();
        if http_code.as_u16() >= 400 {
            error = match parsed.as_ref().ok().and_then(Document::first_error_title) {
                Some(title) => title.to_string(),
                None => format!("API returned error: {raw_response}"),
            };
        }

        let document = match parsed {
            Ok(document) => Some(document),
            Err(_) if raw_response.is_empty() => None,
            Err(e) => {
                trace!(error = %e, "response body is not a JSON:API document");
                None
            }
        };

        Self {
            http_code,
            raw_response,
            document,
            headers,
            error,
        }
    }

    pub fn http_code(&self) -> StatusCode {
        self.http_code
    }

    pub fn is_success(&self) -> bool {
        self.http_code.is_success()
    }

    /// Response body without the header block. Empty after a transport failure.
    pub fn raw_response(&self) -> &str {
        &self.raw_response
    }

    pub fn http_headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    /// Empty when the call succeeded.
    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn first_resource(&self) -> Result<&ResourceObject, ApiError> {
        self.document
            .as_ref()
            .and_then(|document| document.resources.first())
            .ok_or_else(|| ApiError::empty_response(&self.raw_response))
    }

    /// Fails only when no document was parsed; a document without resources
    /// yields an empty slice.
    pub fn resources(&self) -> Result<&[ResourceObject], ApiError> {
        Ok(&self.document()?.resources)
    }

    /// Number of resources; 0 when no document was parsed.
    pub fn resource_count(&self) -> usize {
        self.document
            .as_ref()
            .map_or(0, |document| document.resources.len())
    }

    pub fn document(&self) -> Result<&Document, ApiError> {
        self.document
            .as_ref()
            .ok_or_else(|| ApiError::empty_response(&self.raw_response))
    }

    pub fn into_document(self) -> Result<Document, ApiError> {
        match self.document {
            Some(document) => Ok(document),
            None => Err(ApiError::empty_response(&self.raw_response)),
        }
    }
}
