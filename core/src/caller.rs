//! Orchestration of one outbound call.
//!
//! # Design
//! `ApiCaller` owns a `Transport` and a `CallerConfig` and nothing else; it
//! carries no state between calls. Each call gets its own `ResponseHeaders`
//! accumulator, which the transport fills and the caller moves into the
//! returned `ApiResponse`. Concurrent calls through one `ApiCaller` therefore
//! never see each other's headers.

use tracing::{debug, instrument, warn};

use crate::builder::normalize_server_url;
use crate::config::CallerConfig;
use crate::error::ApiError;
use crate::http::{CallOptions, RawResponse, ResponseHeaders};
use crate::request::{ApiRequest, CallContext};
use crate::response::ApiResponse;

/// Performs the network round-trip for a `CallOptions`.
///
/// Implementations must pass every received header line (status line
/// included) through `headers.record_line` and report the summed return
/// values as `RawResponse::header_size`. Connection-level resources belong to
/// the `execute` call and must be released before it returns, on success and
/// on failure alike. Failures to get any response at all are reported as
/// `ApiError::Transport`.
pub trait Transport {
    fn execute(
        &self,
        options: &CallOptions,
        headers: &mut ResponseHeaders,
    ) -> Result<RawResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(
        &self,
        options: &CallOptions,
        headers: &mut ResponseHeaders,
    ) -> Result<RawResponse, ApiError> {
        (**self).execute(options, headers)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(
        &self,
        options: &CallOptions,
        headers: &mut ResponseHeaders,
    ) -> Result<RawResponse, ApiError> {
        (**self).execute(options, headers)
    }
}

/// Builds, sends and interprets `ApiRequest`s.
#[derive(Debug, Clone)]
pub struct ApiCaller<T> {
    transport: T,
    config: CallerConfig,
}

impl<T: Transport> ApiCaller<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, CallerConfig::default())
    }

    pub fn with_config(transport: T, config: CallerConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &CallerConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Call `request` on `server_url`, optionally overriding the `Host` header.
    ///
    /// Transport and HTTP failures are reported on the returned response;
    /// `Err` means the request could not be built.
    pub fn call(
        &self,
        request: &ApiRequest,
        server_url: &str,
        host_name: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let context = CallContext {
            host_name: host_name.map(str::to_string),
            ..CallContext::default()
        };
        self.call_with(request, server_url, &context)
    }

    #[instrument(skip_all, fields(verb = %request.verb(), endpoint = request.endpoint()))]
    pub fn call_with(
        &self,
        request: &ApiRequest,
        server_url: &str,
        context: &CallContext,
    ) -> Result<ApiResponse, ApiError> {
        let server_url = normalize_server_url(server_url);
        let options = request.call_options(
            &server_url,
            context,
            self.config.default_host_name.as_deref(),
        )?;
        debug!(method = options.method(), url = %options.url, "sending request");

        let mut headers = ResponseHeaders::new();
        let response = match self.transport.execute(&options, &mut headers) {
            Ok(raw) => ApiResponse::from_raw(raw, headers),
            Err(e) => {
                warn!(url = %options.url, error = %e, "transport failed");
                ApiResponse::from_transport_error(&e, headers)
            }
        };
        Ok(response)
    }
}

#[cfg(feature = "ureq")]
impl ApiCaller<crate::transport::UreqTransport> {
    /// A caller on the default ureq transport, configured from the environment.
    pub fn from_env() -> Self {
        let config = CallerConfig::from_env();
        let transport = crate::transport::UreqTransport::new(config.timeout);
        Self::with_config(transport, config)
    }
}
