//! # riak-http
//!
//! Configuration and key-filter construction for a Riak HTTP client.
//!
//! ## Modules
//!
//! - `config` - Immutable client configuration, its builder, and file/env settings
//! - `mapreduce` - Typed key filters that serialize to Riak's filter arrays
//! - `retry` - Retry decisions carried by the configuration
//! - `logging` - Tracing subscriber setup for binaries
//! - `legacy` - Deprecated paths for older callers
pub mod config;
pub mod error;
pub mod legacy;
pub mod logging;
pub mod mapreduce;
pub mod retry;

pub use config::{HttpClientConfig, HttpClientConfigBuilder, HttpClientSettings};
pub use error::{Error, Result};
pub use mapreduce::{FilterList, KeyFilter, MapReduceFilter, Operand};
pub use retry::{MaxRetries, NoRetry, RetryHandler};
