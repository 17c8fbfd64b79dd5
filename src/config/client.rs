//! HTTP client configuration and its builder.
//!
//! # URL precedence
//!
//! 1. An explicit URL set with [`HttpClientConfigBuilder::with_url`] is used verbatim
//! 2. Otherwise the URL is derived as `scheme://host:port/path`
//!
//! Either way the final URL must parse, or [`HttpClientConfigBuilder::build`]
//! returns [`Error::InvalidConfiguration`].
//!
//! # Example
//!
//! ```
//! use riak_http::config::HttpClientConfig;
//!
//! let config = HttpClientConfig::builder()
//!     .with_host("10.0.0.7")
//!     .with_riak_path("riak")
//!     .build()
//!     .expect("valid config");
//! assert_eq!(config.url(), "http://10.0.0.7:8098/riak");
//! ```

use crate::error::{Error, Result};
use crate::retry::{HandlerDebug, RetryHandler};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SCHEME: &str = "http";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8098;
pub const DEFAULT_RIAK_PATH: &str = "/riak";
pub const DEFAULT_MAPREDUCE_PATH: &str = "/mapred";

static HOST_PORT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"//(.*):(\d+)/").expect("Invalid regex pattern"));

/// Connection parameters for an HTTP Riak client.
#[derive(Clone)]
pub struct HttpClientConfig {
    url: String,
    mapreduce_path: String,
    http_client: Option<reqwest::Client>,
    timeout: Option<Duration>,
    max_connections: Option<usize>,
    retry_handler: Option<Arc<dyn RetryHandler>>,
}

impl HttpClientConfig {
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::new()
    }

    /// A config with every default, `http://127.0.0.1:8098/riak`.
    pub fn defaults() -> Self {
        let builder = HttpClientConfigBuilder::new();
        builder.assemble(builder.resolve_url())
    }

    /// The URL of Riak's REST interface.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn mapreduce_path(&self) -> &str {
        &self.mapreduce_path
    }

    /// The caller supplied transport, if any.
    pub fn http_client(&self) -> Option<&reqwest::Client> {
        self.http_client.as_ref()
    }

    /// Connect and read timeout. `None` leaves it to the transport.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn max_connections(&self) -> Option<usize> {
        self.max_connections
    }

    pub fn retry_handler(&self) -> Option<&Arc<dyn RetryHandler>> {
        self.retry_handler.as_ref()
    }

    /// Location of the map-reduce resource, served from the server root.
    ///
    /// The path always resolves against the origin of [`url`](Self::url):
    /// leading slashes collapse to one, so `mapred` and `//mapred` both land
    /// on `/mapred` of the same host.
    pub fn mapreduce_url(&self) -> Result<Url> {
        let base = Url::parse(&self.url).map_err(|e| Error::invalid_url(&self.url, e))?;
        let path = format!("/{}", self.mapreduce_path.trim_start_matches('/'));
        base.join(&path).map_err(|e| Error::invalid_url(path, e))
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            url: self.url.clone(),
            mapreduce_path: self.mapreduce_path.clone(),
            mapreduce_url: self.mapreduce_url().ok().map(String::from),
            timeout_ms: self
                .timeout
                .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX)),
            max_connections: self.max_connections,
            has_http_client: self.http_client.is_some(),
            has_retry_handler: self.retry_handler.is_some(),
        }
    }
}

impl fmt::Debug for HttpClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientConfig")
            .field("url", &self.url)
            .field("mapreduce_path", &self.mapreduce_path)
            .field("http_client", &self.http_client)
            .field("timeout", &self.timeout)
            .field("max_connections", &self.max_connections)
            .field("retry_handler", &HandlerDebug(self.retry_handler.as_ref()))
            .finish()
    }
}

/// Serializable view of a resolved config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSummary {
    pub url: String,
    pub mapreduce_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapreduce_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<usize>,
    pub has_http_client: bool,
    pub has_retry_handler: bool,
}

/// Builder for [`HttpClientConfig`].
///
/// Defaults:
///
/// | field | default |
/// |---|---|
/// | url | none, derived from `scheme://host:port/path` |
/// | scheme | `http` |
/// | host | `127.0.0.1` |
/// | port | `8098` |
/// | riak path | `/riak` |
/// | mapreduce path | `/mapred` |
/// | http client | none, the transport creates one |
/// | timeout | none, transport default |
/// | max connections | none, transport default |
/// | retry handler | none, transport default |
#[derive(Clone)]
pub struct HttpClientConfigBuilder {
    url: Option<String>,
    scheme: String,
    host: String,
    port: u16,
    riak_path: String,
    mapreduce_path: String,
    http_client: Option<reqwest::Client>,
    timeout: Option<Duration>,
    max_connections: Option<usize>,
    retry_handler: Option<Arc<dyn RetryHandler>>,
}

impl Default for HttpClientConfigBuilder {
    fn default() -> Self {
        Self {
            url: None,
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            riak_path: DEFAULT_RIAK_PATH.to_string(),
            mapreduce_path: DEFAULT_MAPREDUCE_PATH.to_string(),
            http_client: None,
            timeout: None,
            max_connections: None,
            retry_handler: None,
        }
    }
}

impl HttpClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same as [`new`](Self::new).
    pub fn defaults() -> Self {
        Self::default()
    }

    /// Start from an existing config.
    ///
    /// Only the URL is stored in a config, so host and port are recovered by
    /// matching `//<host>:<port>/` against it. A later `with_host` or
    /// `with_port` then overrides just that part. When the URL has no such
    /// segment (no explicit port, for instance) host and port stay at
    /// `127.0.0.1:8098`. Scheme and riak path always start from defaults.
    pub fn from_config(config: &HttpClientConfig) -> Self {
        let mut builder = Self {
            mapreduce_path: config.mapreduce_path.clone(),
            http_client: config.http_client.clone(),
            timeout: config.timeout,
            max_connections: config.max_connections,
            retry_handler: config.retry_handler.clone(),
            ..Self::default()
        };

        match extract_host_port(&config.url) {
            Some((host, port)) => {
                builder.host = host;
                builder.port = port;
            }
            None => {
                tracing::debug!(
                    url = %config.url,
                    "No host:port in source URL, keeping default {}:{}",
                    DEFAULT_HOST,
                    DEFAULT_PORT
                );
            }
        }

        builder
    }

    /// The URL of Riak's REST interface.
    ///
    /// Takes precedence over scheme, host, port and riak path.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// `http` or `https`. Ignored when a URL is set.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Path to the base Riak resource, e.g. `/riak`. A missing leading slash is added.
    pub fn with_riak_path(mut self, path: impl Into<String>) -> Self {
        self.riak_path = path.into();
        self
    }

    pub fn with_mapreduce_path(mut self, path: impl Into<String>) -> Self {
        self.mapreduce_path = path.into();
        self
    }

    /// A preconfigured transport to delegate requests to.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Connect, read and pooled connection acquisition timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = Some(max_connections);
        self
    }

    pub fn with_retry_handler(mut self, handler: impl RetryHandler + 'static) -> Self {
        self.retry_handler = Some(Arc::new(handler));
        self
    }

    pub fn with_shared_retry_handler(mut self, handler: Arc<dyn RetryHandler>) -> Self {
        self.retry_handler = Some(handler);
        self
    }

    /// Build the config. The builder is left untouched and can be reused.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the final URL does not parse.
    pub fn build(&self) -> Result<HttpClientConfig> {
        let url = self.resolve_url();
        if let Err(e) = Url::parse(&url) {
            tracing::debug!(%url, error = %e, "Rejected client URL");
            return Err(Error::invalid_url(url, e));
        }
        tracing::debug!(%url, explicit = self.url.is_some(), "Resolved client URL");
        Ok(self.assemble(url))
    }

    fn resolve_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => {
                let separator = if self.riak_path.starts_with('/') { "" } else { "/" };
                format!(
                    "{}://{}:{}{}{}",
                    self.scheme, self.host, self.port, separator, self.riak_path
                )
            }
        }
    }

    fn assemble(&self, url: String) -> HttpClientConfig {
        HttpClientConfig {
            url,
            mapreduce_path: self.mapreduce_path.clone(),
            http_client: self.http_client.clone(),
            timeout: self.timeout,
            max_connections: self.max_connections,
            retry_handler: self.retry_handler.clone(),
        }
    }
}

impl From<&HttpClientConfig> for HttpClientConfigBuilder {
    fn from(config: &HttpClientConfig) -> Self {
        Self::from_config(config)
    }
}

impl fmt::Debug for HttpClientConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientConfigBuilder")
            .field("url", &self.url)
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("riak_path", &self.riak_path)
            .field("mapreduce_path", &self.mapreduce_path)
            .field("http_client", &self.http_client)
            .field("timeout", &self.timeout)
            .field("max_connections", &self.max_connections)
            .field("retry_handler", &HandlerDebug(self.retry_handler.as_ref()))
            .finish()
    }
}

fn extract_host_port(url: &str) -> Option<(String, u16)> {
    let caps = HOST_PORT_REGEX.captures(url)?;
    // Ports that do not fit a u16 are treated as no match.
    let port = caps[2].parse::<u16>().ok()?;
    Some((caps[1].to_string(), port))
}
