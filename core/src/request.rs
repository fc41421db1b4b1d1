//! Declarative description of one outbound call.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::files::FileTree;
use crate::http::Verb;
use crate::json;

/// What to call and with which data. Everything except the bearer token is
/// fixed once the request is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    verb: Verb,
    endpoint: String,
    body: Option<Map<String, Value>>,
    payload: Option<Value>,
    bearer: Option<String>,
    files: FileTree,
    headers: Vec<(String, String)>,
}

impl ApiRequest {
    /// Leading slashes are stripped from `endpoint`.
    pub fn new(verb: Verb, endpoint: impl Into<String>) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            verb,
            endpoint: endpoint.trim_start_matches('/').to_string(),
            body: None,
            payload: None,
            bearer: None,
            files: FileTree::new(),
            headers: Vec::new(),
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Verb::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Verb::Post, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Verb::Put, endpoint)
    }

    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(Verb::Patch, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Verb::Delete, endpoint)
    }

    /// Form fields, sent as query string (GET) or form-encoded body.
    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(body);
        self
    }

    /// Like `with_body`, from any value that serializes to a JSON object.
    pub fn with_form<T: Serialize>(self, form: &T) -> Result<Self, ApiError> {
        match json::to_value(form)? {
            Value::Object(body) => Ok(self.with_body(body)),
            other => Err(ApiError::Encoding(format!(
                "form body must serialize to an object, got {other}"
            ))),
        }
    }

    /// Structured data sent JSON-encoded. Non-finite numbers are an
    /// `ApiError::Encoding`.
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Result<Self, ApiError> {
        self.payload = Some(json::to_value(payload)?);
        Ok(self)
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn set_bearer(&mut self, token: impl Into<String>) {
        self.bearer = Some(token.into());
    }

    pub fn with_files(mut self, files: FileTree) -> Self {
        self.files = files;
        self
    }

    /// Appended after every computed header; duplicates are kept.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn body(&self) -> Option<&Map<String, Value>> {
        self.body.as_ref()
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn bearer(&self) -> Option<&str> {
        self.bearer.as_deref()
    }

    pub fn files(&self) -> &FileTree {
        &self.files
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// Per-call settings that are not part of the request itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Sent as `Host`; falls back to the configured default host name.
    pub host_name: Option<String>,
    /// Adds `Test-Environment: 1`.
    pub test_environment: bool,
    pub custom_headers: Vec<(String, String)>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host_name(mut self, host_name: impl Into<String>) -> Self {
        self.host_name = Some(host_name.into());
        self
    }

    pub fn with_test_environment(mut self, test_environment: bool) -> Self {
        self.test_environment = test_environment;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }
}
