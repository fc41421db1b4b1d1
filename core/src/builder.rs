//! Translation of an `ApiRequest` into transport-ready `CallOptions`.
//!
//! # Design
//! Header order is fixed: `Host`, `Test-Environment`, `Content-Type`,
//! `Authorization`, per-call custom headers, then the request's own headers.
//! Nothing is de-duplicated.
//!
//! Body placement depends on the verb:
//! - GET: form fields go into the query string, there is no body.
//! - POST: files become multipart fields, form fields are merged into them
//!   (or form-encoded when there are no files), and the JSON payload is
//!   either the whole body or a `payload` field next to the others.
//! - PUT, PATCH, DELETE: a method override plus either the form-encoded body
//!   or the JSON payload.

use serde_json::Value;

use crate::error::ApiError;
use crate::form;
use crate::http::{CallOptions, MultipartField, RequestBody, Verb};
use crate::request::{ApiRequest, CallContext};

const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";
const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// Ensure `server_url` ends with exactly one `/`.
pub fn normalize_server_url(server_url: &str) -> String {
    format!("{}/", server_url.trim_end_matches('/'))
}

/// POST body under construction.
enum PostFields {
    Empty,
    Form(Vec<(String, String)>),
    Multipart(Vec<MultipartField>),
}

impl ApiRequest {
    /// Build the options a transport needs to perform this request against
    /// `server_url`.
    ///
    /// `default_host_name` is used for the `Host` header when `context` does
    /// not name one. Fails with `ApiError::Encoding` if the payload cannot be
    /// JSON-encoded.
    pub fn call_options(
        &self,
        server_url: &str,
        context: &CallContext,
        default_host_name: Option<&str>,
    ) -> Result<CallOptions, ApiError> {
        let mut endpoint = self.endpoint().to_string();
        let mut custom_method = None;
        let mut body = RequestBody::Empty;

        match self.verb() {
            Verb::Get => {
                if let Some(fields) = self.body() {
                    let query = form::encode(fields);
                    if !query.is_empty() {
                        let separator = if endpoint.contains('?') { '&' } else { '?' };
                        endpoint.push(separator);
                        endpoint.push_str(&query);
                    }
                }
            }
            Verb::Post => body = self.post_body()?,
            Verb::Put | Verb::Patch | Verb::Delete => {
                custom_method = Some(self.verb().as_str().to_string());
                if let Some(fields) = self.body() {
                    body = RequestBody::Encoded(form::encode(fields));
                } else if let Some(payload) = self.payload() {
                    body = RequestBody::Encoded(encode_payload(payload)?);
                }
            }
        }

        Ok(CallOptions {
            url: format!("{}{endpoint}", normalize_server_url(server_url)),
            verb: self.verb(),
            custom_method,
            headers: self.header_list(context, default_host_name),
            body,
            verify_tls: false,
        })
    }

    fn header_list(
        &self,
        context: &CallContext,
        default_host_name: Option<&str>,
    ) -> Vec<(String, String)> {
        let mut headers = Vec::new();

        if let Some(host) = context.host_name.as_deref().or(default_host_name) {
            headers.push(("Host".to_string(), host.to_string()));
        }
        if context.test_environment {
            headers.push(("Test-Environment".to_string(), "1".to_string()));
        }
        let content_type = if self.files().is_empty() {
            JSON_API_CONTENT_TYPE
        } else {
            MULTIPART_CONTENT_TYPE
        };
        headers.push(("Content-Type".to_string(), content_type.to_string()));
        if let Some(token) = self.bearer() {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        headers.extend(context.custom_headers.iter().cloned());
        headers.extend(self.headers().iter().cloned());

        headers
    }

    fn post_body(&self) -> Result<RequestBody, ApiError> {
        let mut fields = if self.files().is_empty() {
            PostFields::Empty
        } else {
            PostFields::Multipart(self.files().flatten())
        };

        if let Some(body) = self.body() {
            let pairs = form::flatten(body);
            fields = match fields {
                PostFields::Empty if pairs.is_empty() => PostFields::Empty,
                PostFields::Empty | PostFields::Form(_) => PostFields::Form(pairs),
                PostFields::Multipart(mut multipart) => {
                    for (name, value) in pairs {
                        upsert(&mut multipart, MultipartField::text(name, value));
                    }
                    PostFields::Multipart(multipart)
                }
            };
        }

        if let Some(payload) = self.payload() {
            let encoded = encode_payload(payload)?;
            fields = match fields {
                PostFields::Empty => return Ok(RequestBody::Encoded(encoded)),
                PostFields::Form(mut pairs) => {
                    pairs.retain(|(name, _)| name != "payload");
                    pairs.push(("payload".to_string(), encoded));
                    PostFields::Form(pairs)
                }
                PostFields::Multipart(mut multipart) => {
                    upsert(&mut multipart, MultipartField::text("payload", encoded));
                    PostFields::Multipart(multipart)
                }
            };
        }

        Ok(match fields {
            PostFields::Empty => RequestBody::Empty,
            PostFields::Form(pairs) => RequestBody::Encoded(form::encode_pairs(&pairs)),
            PostFields::Multipart(multipart) => RequestBody::Multipart(multipart),
        })
    }
}

fn encode_payload(payload: &Value) -> Result<String, ApiError> {
    serde_json::to_string(payload).map_err(|e| ApiError::Encoding(e.to_string()))
}

/// Replace the field with the same name in place, or append.
fn upsert(fields: &mut Vec<MultipartField>, field: MultipartField) {
    match fields.iter_mut().find(|existing| existing.name == field.name) {
        Some(existing) => *existing = field,
        None => fields.push(field),
    }
}
