//! Per-run collector configuration.
//!
//! Configuration is an immutable value handed to every resolver and dispatch
//! call. Two runs with different proxies can proceed side by side without
//! observing each other.
//!
//! # Environment Variables
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `SHARECOUNT_PROXY` | Forward proxy URL |
//! | `PROXY` | Fallback when `SHARECOUNT_PROXY` is unset |
//! | `PROXY_MESH` | Overrides both of the above |
//! | `SHARECOUNT_TIMEOUT_MS` | Per-dispatch timeout in milliseconds |
//! | `SHARECOUNT_STRICT_TLS` | `1`/`true` re-enables certificate verification |

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::CollectError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(4);
pub const DEFAULT_ORIGIN_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_REDIRECTS: usize = 10;
pub const DEFAULT_USER_AGENT_PREFIX: &str = "Mozilla/5.0 (sharecount)";
pub const DEFAULT_ORIGIN_USER_AGENT: &str = "Googlebot-News";

/// Settings shared by every request of one collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    pub proxy: Option<String>,
    pub request_timeout: Duration,
    pub origin_timeout: Duration,
    /// Share-count endpoints are best-effort lookups, so certificate checks
    /// are relaxed unless a caller opts back in.
    pub accept_invalid_certs: bool,
    pub max_redirects: usize,
    pub user_agent_prefix: String,
    pub origin_user_agent: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            origin_timeout: DEFAULT_ORIGIN_TIMEOUT,
            accept_invalid_certs: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent_prefix: String::from(DEFAULT_USER_AGENT_PREFIX),
            origin_user_agent: String::from(DEFAULT_ORIGIN_USER_AGENT),
        }
    }
}

impl CollectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from process environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        let proxy = env::var("SHARECOUNT_PROXY")
            .or_else(|_| env::var("PROXY"))
            .ok();
        config = config.with_proxy(proxy);

        if let Ok(mesh) = env::var("PROXY_MESH") {
            if !mesh.trim().is_empty() {
                config = config.with_proxy(Some(mesh));
            }
        }

        if let Some(timeout_ms) = env::var("SHARECOUNT_TIMEOUT_MS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
        {
            config = config.with_request_timeout(Duration::from_millis(timeout_ms));
        }

        if env::var("SHARECOUNT_STRICT_TLS").is_ok_and(|raw| is_truthy(&raw)) {
            config = config.with_accept_invalid_certs(false);
        }

        config
    }

    /// Sets the forward proxy; blank strings clear it.
    pub fn with_proxy(mut self, proxy: Option<impl Into<String>>) -> Self {
        self.proxy = proxy
            .map(Into::into)
            .map(|proxy: String| proxy.trim().to_owned())
            .filter(|proxy| !proxy.is_empty());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_origin_timeout(mut self, timeout: Duration) -> Self {
        self.origin_timeout = timeout;
        self
    }

    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = prefix.into();
        self
    }

    /// Client settings for platform dispatches.
    pub fn dispatch_settings(&self, platform: &str) -> Result<ClientSettings, CollectError> {
        Ok(ClientSettings {
            proxy: self.parsed_proxy(platform)?,
            timeout: self.request_timeout,
            accept_invalid_certs: self.accept_invalid_certs,
            redirects: RedirectPolicy::Follow(self.max_redirects),
        })
    }

    /// Client settings for origin resolution, which follows redirects itself.
    pub fn origin_settings(&self, platform: &str) -> Result<ClientSettings, CollectError> {
        Ok(ClientSettings {
            proxy: self.parsed_proxy(platform)?,
            timeout: self.origin_timeout,
            accept_invalid_certs: self.accept_invalid_certs,
            redirects: RedirectPolicy::Manual,
        })
    }

    /// Random user agent so naive per-agent blocking does not trip.
    pub fn user_agent(&self) -> String {
        format!("{} {}", self.user_agent_prefix, fastrand::u32(0..1000))
    }

    fn parsed_proxy(&self, platform: &str) -> Result<Option<Url>, CollectError> {
        let Some(proxy) = &self.proxy else {
            return Ok(None);
        };

        let parsed = Url::parse(proxy).map_err(|error| CollectError::Config {
            platform: platform.to_owned(),
            proxy: proxy.clone(),
            message: error.to_string(),
        })?;

        if parsed.host_str().is_none() {
            return Err(CollectError::Config {
                platform: platform.to_owned(),
                proxy: proxy.clone(),
                message: String::from("proxy URL has no host"),
            });
        }

        Ok(Some(parsed))
    }
}

/// How a client treats 3xx responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectPolicy {
    /// Follow up to the given number of hops transparently.
    Follow(usize),
    /// Return 3xx responses to the caller untouched.
    Manual,
}

/// Transport settings for one HTTP client instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub proxy: Option<Url>,
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
    pub redirects: RedirectPolicy,
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
