//! Client configuration for Riak's HTTP interface.
//!
//! - `client` - the immutable [`HttpClientConfig`] and its builder
//! - `settings` - TOML/YAML/environment overlays for the builder

pub mod client;
pub mod settings;

pub use client::{
    ConfigSummary, HttpClientConfig, HttpClientConfigBuilder, DEFAULT_HOST,
    DEFAULT_MAPREDUCE_PATH, DEFAULT_PORT, DEFAULT_RIAK_PATH, DEFAULT_SCHEME,
};
pub use settings::HttpClientSettings;

#[cfg(test)]
mod tests;
