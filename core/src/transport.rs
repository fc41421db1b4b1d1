//! Blocking transport on top of `ureq`.
//!
//! # Design
//! A fresh `ureq::Agent` is built for every call and dropped when `execute`
//! returns, so no connection outlives its call and nothing is pooled. 4xx and
//! 5xx statuses are returned as data rather than `Err`, letting
//! `ApiResponse` interpret them. Redirects are not followed, so a 3xx reaches
//! `ApiResponse` as it was sent, and the response body is read without a size
//! limit. ureq hands headers over already parsed; they are rendered back into
//! header lines so the header block and its size can be reported the same way
//! for every transport.

use std::iter;
use std::time::Duration;

use http::{Method, Request};
use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::caller::Transport;
use crate::error::ApiError;
use crate::http::{CallOptions, RawResponse, RequestBody, ResponseHeaders};
use crate::multipart::MultipartBody;

#[derive(Debug, Clone, Default)]
pub struct UreqTransport {
    timeout: Option<Duration>,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    fn agent(&self, verify_tls: bool) -> Agent {
        Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .timeout_global(self.timeout)
            .tls_config(
                TlsConfig::builder()
                    .disable_verification(!verify_tls)
                    .build(),
            )
            .build()
            .new_agent()
    }
}

fn transport_error(e: impl std::fmt::Display) -> ApiError {
    ApiError::Transport(e.to_string())
}

impl Transport for UreqTransport {
    fn execute(
        &self,
        options: &CallOptions,
        headers: &mut ResponseHeaders,
    ) -> Result<RawResponse, ApiError> {
        let agent = self.agent(options.verify_tls);
        let method = Method::from_bytes(options.method().as_bytes()).map_err(transport_error)?;

        let multipart = match &options.body {
            RequestBody::Multipart(fields) => Some(MultipartBody::encode(fields)?),
            _ => None,
        };

        let mut builder = Request::builder().method(method).uri(&options.url);
        for (name, value) in &options.headers {
            match &multipart {
                // The boundary is only known once the body is encoded.
                Some(body) if name.eq_ignore_ascii_case("content-type") => {
                    builder = builder.header(name.as_str(), body.content_type());
                }
                _ => builder = builder.header(name.as_str(), value.as_str()),
            }
        }

        let result = match (multipart, &options.body) {
            (Some(body), _) => agent.run(builder.body(body.bytes).map_err(transport_error)?),
            (None, RequestBody::Encoded(text)) => {
                agent.run(builder.body(text.clone().into_bytes()).map_err(transport_error)?)
            }
            (None, _) => agent.run(builder.body(()).map_err(transport_error)?),
        };
        let mut response = result.map_err(transport_error)?;

        let status = response.status();
        let status_line = format!(
            "{:?} {} {}\r\n",
            response.version(),
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        );
        let header_lines = response.headers().iter().map(|(name, value)| {
            format!("{}: {}\r\n", name, String::from_utf8_lossy(value.as_bytes()))
        });

        let mut buffer = Vec::new();
        let mut header_size = 0;
        for line in iter::once(status_line)
            .chain(header_lines)
            .chain(iter::once("\r\n".to_string()))
        {
            header_size += headers.record_line(&line);
            buffer.extend_from_slice(line.as_bytes());
        }

        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(transport_error)?;
        buffer.extend_from_slice(&body);

        Ok(RawResponse {
            status: status.as_u16(),
            header_size,
            buffer,
        })
    }
}
