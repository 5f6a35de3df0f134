//! Client configuration.
//!
//! Settings can be assembled in code or read from the environment
//! (`YAPI_BASE_URL`, `YAPI_TOKEN`, `YAPI_TIMEOUT_SECS`).

use std::fmt;
use std::time::Duration;

use crate::error::ApiError;

pub const ENV_BASE_URL: &str = "YAPI_BASE_URL";
pub const ENV_TOKEN: &str = "YAPI_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "YAPI_TIMEOUT_SECS";

/// Redirect limit used when none is configured.
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Largest response body read when none is configured (10 MiB).
pub const DEFAULT_BODY_LIMIT: u64 = 10 * 1024 * 1024;

#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: String,
    /// Global per-request timeout. `None` leaves the call unbounded.
    pub timeout: Option<Duration>,
    /// Redirects followed before the call fails with
    /// `ureq::Error::TooManyRedirects`. With 0 the redirect response itself
    /// is returned and classified by its status.
    pub max_redirects: u32,
    /// Bodies larger than this fail with a transport error.
    pub body_limit: u64,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token.is_empty() { "<empty>" } else { "<redacted>" };
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &token)
            .field("timeout", &self.timeout)
            .field("max_redirects", &self.max_redirects)
            .field("body_limit", &self.body_limit)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn body_limit(mut self, body_limit: u64) -> Self {
        self.body_limit = body_limit;
        self
    }

    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ApiError::Config(format!("{key} is not set")))
        };

        let mut config = Self::new(required(ENV_BASE_URL)?.trim(), required(ENV_TOKEN)?.trim());

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ApiError::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got {raw:?}"))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Build the `ureq` agent these settings describe.
    ///
    /// Status codes are not turned into errors by the agent; the transport
    /// classifies them itself.
    pub(crate) fn agent(&self) -> ureq::Agent {
        ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(self.max_redirects)
            .timeout_global(self.timeout)
            .build()
            .new_agent()
    }
}
