//! Process configuration for `ApiCaller`.

use std::env;
use std::time::Duration;

/// Environment variable naming the default `Host` header value, used to route
/// calls to test or staging deployments.
pub const DEFAULT_HOSTNAME_VAR: &str = "SERVICE_TESTER_HOSTNAME";

/// Older name of `DEFAULT_HOSTNAME_VAR`, read when the current one is unset.
pub const LEGACY_HOSTNAME_VAR: &str = "MINIMALISM_SERVICE_TESTER_HOSTNAME";

/// Environment variable with the transport timeout in whole seconds.
pub const TIMEOUT_VAR: &str = "API_CALLER_TIMEOUT_SECS";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerConfig {
    /// `Host` header sent when a call does not name one.
    pub default_host_name: Option<String>,
    /// Overall timeout handed to transports that support one.
    pub timeout: Option<Duration>,
}

impl CallerConfig {
    /// Read the configuration from the process environment. Empty or
    /// unparsable values count as unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            default_host_name: read(DEFAULT_HOSTNAME_VAR).or_else(|| read(LEGACY_HOSTNAME_VAR)),
            timeout: read(TIMEOUT_VAR)
                .and_then(|secs| secs.trim().parse::<u64>().ok())
                .map(Duration::from_secs),
        }
    }

    pub fn with_default_host_name(mut self, host_name: impl Into<String>) -> Self {
        self.default_host_name = Some(host_name.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
