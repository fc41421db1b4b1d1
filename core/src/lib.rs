//! Minimal HTTP client for service-to-service calls against JSON:API backends.
//!
//! # Overview
//! An `ApiRequest` describes a call: verb, endpoint, form body, JSON payload,
//! files, bearer token and extra headers. `ApiRequest::call_options` turns it
//! into transport-ready `CallOptions`; a `Transport` performs the round-trip;
//! `ApiResponse::from_raw` interprets status, headers and body into resources,
//! errors and a normalised error string. `ApiCaller` runs the three steps.
//!
//! # Design
//! - Building and interpreting never touch the network (host-does-IO), so
//!   both are deterministic and tested without a server.
//! - Transport and HTTP failures are data on `ApiResponse`; `Err` is reserved
//!   for requests that cannot be built and for document accessors with
//!   nothing to return.
//! - Response headers are captured per call and returned with the response.
//! - TLS verification is disabled: only point the caller at trusted,
//!   internal servers.
//! - The `ureq` feature (default) provides a blocking `UreqTransport`.

pub mod builder;
pub mod caller;
pub mod config;
pub mod document;
pub mod error;
pub mod files;
pub mod form;
pub mod http;
mod json;
pub mod multipart;
pub mod request;
pub mod response;
#[cfg(feature = "ureq")]
pub mod transport;

pub use builder::normalize_server_url;
pub use caller::{ApiCaller, Transport};
pub use config::CallerConfig;
pub use document::{Document, ErrorObject, ResourceObject};
pub use error::ApiError;
pub use files::{FileDescriptor, FileNode, FileSource, FileTree};
pub use crate::http::{
    CallOptions, FileRef, MultipartField, MultipartValue, RawResponse, RequestBody,
    ResponseHeaders, Verb,
};
pub use request::{ApiRequest, CallContext};
pub use response::ApiResponse;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
