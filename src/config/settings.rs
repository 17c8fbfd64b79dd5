//! File and environment sourced settings for [`HttpClientConfigBuilder`].
//!
//! # Source Precedence
//!
//! 1. **Builder defaults** - see [`HttpClientConfigBuilder`]
//! 2. **Settings file** - TOML, or YAML for `.yml`/`.yaml` files
//! 3. **Environment variables** - `RIAK_*`
//! 4. **Explicit builder calls** made after [`HttpClientSettings::apply`]
//!
//! ```
//! use riak_http::config::{HttpClientConfigBuilder, HttpClientSettings};
//!
//! let settings = HttpClientSettings::from_toml_str(r#"
//! host = "10.0.0.3"
//! timeout = "1500ms"
//! "#).unwrap();
//!
//! let config = settings.apply(HttpClientConfigBuilder::new()).build().unwrap();
//! assert_eq!(config.url(), "http://10.0.0.3:8098/riak");
//! assert_eq!(config.timeout().unwrap().as_millis(), 1500);
//! ```

use super::client::HttpClientConfigBuilder;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const ENV_URL: &str = "RIAK_URL";
pub const ENV_SCHEME: &str = "RIAK_SCHEME";
pub const ENV_HOST: &str = "RIAK_HOST";
pub const ENV_PORT: &str = "RIAK_PORT";
pub const ENV_RIAK_PATH: &str = "RIAK_PATH";
pub const ENV_MAPREDUCE_PATH: &str = "RIAK_MAPRED_PATH";
pub const ENV_TIMEOUT_MS: &str = "RIAK_TIMEOUT_MS";
pub const ENV_MAX_CONNECTIONS: &str = "RIAK_MAX_CONNECTIONS";

/// Optional overrides for every plain-data builder field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpClientSettings {
    pub url: Option<String>,
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub riak_path: Option<String>,
    #[serde(alias = "mapred_path")]
    pub mapreduce_path: Option<String>,
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
    pub max_connections: Option<usize>,
}

impl HttpClientSettings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load a settings file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yml") | Some("yaml") => Self::from_yaml_str(&content)?,
            _ => Self::from_toml_str(&content)?,
        };
        tracing::debug!("Loaded client settings from {}", path.display());
        Ok(settings)
    }

    /// Overlay `RIAK_*` variables from the process environment.
    pub fn merge_env(&mut self) -> Result<()> {
        self.merge_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay `RIAK_*` variables resolved through `lookup`.
    ///
    /// A lower layer's `url` is split into its parts as soon as any of
    /// `RIAK_SCHEME`, `RIAK_HOST`, `RIAK_PORT` or `RIAK_PATH` is set without
    /// `RIAK_URL`, so those variables override just their part of it.
    pub fn merge_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_URL);
        let scheme = lookup(ENV_SCHEME);
        let host = lookup(ENV_HOST);
        let port = lookup(ENV_PORT)
            .map(|port| parse_env::<u16>(ENV_PORT, &port))
            .transpose()?;
        let riak_path = lookup(ENV_RIAK_PATH);

        match url {
            Some(url) => self.url = Some(url),
            None if scheme.is_some() || host.is_some() || port.is_some() || riak_path.is_some() => {
                self.split_url()?
            }
            None => {}
        }

        if scheme.is_some() {
            self.scheme = scheme;
        }
        if host.is_some() {
            self.host = host;
        }
        if port.is_some() {
            self.port = port;
        }
        if riak_path.is_some() {
            self.riak_path = riak_path;
        }
        if let Some(path) = lookup(ENV_MAPREDUCE_PATH) {
            self.mapreduce_path = Some(path);
        }
        if let Some(millis) = lookup(ENV_TIMEOUT_MS) {
            self.timeout = Some(Duration::from_millis(parse_env(ENV_TIMEOUT_MS, &millis)?));
        }
        if let Some(max) = lookup(ENV_MAX_CONNECTIONS) {
            self.max_connections = Some(parse_env(ENV_MAX_CONNECTIONS, &max)?);
        }
        Ok(())
    }

    /// Replace `url` with the scheme, host, port and path it names.
    ///
    /// Used before a higher precedence layer sets one of those parts, which
    /// would otherwise be shadowed by the whole URL. Query and fragment are
    /// dropped. Does nothing when no URL is set.
    pub fn split_url(&mut self) -> Result<()> {
        let Some(raw) = self.url.take() else {
            return Ok(());
        };
        let url = Url::parse(&raw).map_err(|e| Error::invalid_url(raw.as_str(), e))?;

        self.scheme = Some(url.scheme().to_string());
        if let Some(host) = url.host_str() {
            self.host = Some(host.to_string());
        }
        if let Some(port) = url.port_or_known_default() {
            self.port = Some(port);
        }
        self.riak_path = Some(url.path().to_string());
        tracing::debug!(url = %raw, "Split settings url into scheme/host/port/path");
        Ok(())
    }

    /// Copy every set field onto `builder`.
    pub fn apply(&self, mut builder: HttpClientConfigBuilder) -> HttpClientConfigBuilder {
        if let Some(url) = &self.url {
            builder = builder.with_url(url.clone());
            if self.scheme.is_some() || self.host.is_some() || self.port.is_some() {
                tracing::warn!("Both url and scheme/host/port are set, url takes precedence");
            }
        }
        if let Some(scheme) = &self.scheme {
            builder = builder.with_scheme(scheme.clone());
        }
        if let Some(host) = &self.host {
            builder = builder.with_host(host.clone());
        }
        if let Some(port) = self.port {
            builder = builder.with_port(port);
        }
        if let Some(path) = &self.riak_path {
            builder = builder.with_riak_path(path.clone());
        }
        if let Some(path) = &self.mapreduce_path {
            builder = builder.with_mapreduce_path(path.clone());
        }
        if let Some(timeout) = self.timeout {
            builder = builder.with_timeout(timeout);
        }
        if let Some(max) = self.max_connections {
            builder = builder.with_max_connections(max);
        }
        builder
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::invalid_setting(key, value, e))
}
