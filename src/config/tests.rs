use super::*;
use crate::error::Error;
use crate::retry::{MaxRetries, RetryHandler};
use proptest::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn write_test_config(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let path = dir.path().join(filename);
    fs::write(&path, content).unwrap();
    path
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_defaults() {
    let config = HttpClientConfig::defaults();

    assert_eq!(config.url(), "http://127.0.0.1:8098/riak");
    assert_eq!(config.mapreduce_path(), "/mapred");
    assert!(config.http_client().is_none());
    assert!(config.timeout().is_none());
    assert!(config.max_connections().is_none());
    assert!(config.retry_handler().is_none());
}

#[test]
fn test_defaults_match_builder() {
    let built = HttpClientConfigBuilder::defaults().build().unwrap();
    assert_eq!(built.url(), HttpClientConfig::defaults().url());
    assert!(url::Url::parse(HttpClientConfig::defaults().url()).is_ok());
}

#[test]
fn test_derived_url() {
    let config = HttpClientConfig::builder()
        .with_scheme("https")
        .with_host("riak.internal")
        .with_port(8443)
        .with_riak_path("riak")
        .build()
        .unwrap();

    assert_eq!(config.url(), "https://riak.internal:8443/riak");
}

#[test]
fn test_invalid_url_fails() {
    let result = HttpClientConfig::builder().with_url("not a url").build();

    match result {
        Err(Error::InvalidConfiguration { url, source }) => {
            assert_eq!(url, "not a url");
            assert_eq!(source, url::ParseError::RelativeUrlWithoutBase);
        }
        other => panic!("expected InvalidConfiguration, got {other:?}"),
    }
}

#[test]
fn test_invalid_derived_url_fails() {
    let result = HttpClientConfig::builder().with_host("bad host").build();
    assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
}

#[test]
fn test_explicit_url_takes_precedence() {
    let config = HttpClientConfig::builder()
        .with_scheme("https")
        .with_host("ignored")
        .with_port(1)
        .with_riak_path("/ignored")
        .with_url("http://example.com:9000/riak")
        .build()
        .unwrap();

    assert_eq!(config.url(), "http://example.com:9000/riak");
}

#[test]
fn test_explicit_url_is_not_normalized() {
    let config = HttpClientConfig::builder()
        .with_url("HTTP://Example.com:9000")
        .build()
        .unwrap();
    assert_eq!(config.url(), "HTTP://Example.com:9000");
}

#[test]
fn test_builder_reusable_after_build() {
    let builder = HttpClientConfig::builder().with_host("a");
    let first = builder.build().unwrap();
    let second = builder.clone().with_port(2).build().unwrap();
    let third = builder.build().unwrap();

    assert_eq!(first.url(), "http://a:8098/riak");
    assert_eq!(second.url(), "http://a:2/riak");
    assert_eq!(third.url(), first.url());
}

#[test]
fn test_from_config_overrides_port() {
    let c1 = HttpClientConfig::builder()
        .with_host("a")
        .with_port(1)
        .build()
        .unwrap();

    let c2 = HttpClientConfigBuilder::from_config(&c1)
        .with_port(2)
        .build()
        .unwrap();

    assert_eq!(c2.url(), "http://a:2/riak");
}

#[test]
fn test_from_config_overrides_host() {
    let c1 = HttpClientConfig::builder()
        .with_host("a")
        .with_port(1)
        .build()
        .unwrap();

    let c2 = HttpClientConfigBuilder::from(&c1)
        .with_host("b")
        .build()
        .unwrap();

    assert_eq!(c2.url(), "http://b:1/riak");
}

#[test]
fn test_from_config_copies_optionals() {
    let original = HttpClientConfig::builder()
        .with_mapreduce_path("/mapreduce")
        .with_http_client(reqwest::Client::new())
        .with_timeout(Duration::from_millis(2500))
        .with_max_connections(50)
        .with_retry_handler(MaxRetries::new(1))
        .build()
        .unwrap();

    let copy = HttpClientConfigBuilder::from_config(&original)
        .build()
        .unwrap();

    assert_eq!(copy.mapreduce_path(), "/mapreduce");
    assert!(copy.http_client().is_some());
    assert_eq!(copy.timeout(), Some(Duration::from_millis(2500)));
    assert_eq!(copy.max_connections(), Some(50));

    let handler = copy.retry_handler().expect("retry handler copied");
    let err = std::io::Error::other("boom");
    assert!(handler.retry_request(&err, 1));
    assert!(!handler.retry_request(&err, 2));
}

#[test]
fn test_from_config_without_port_falls_back() {
    let original = HttpClientConfig::builder()
        .with_url("http://riak.example.com/riak")
        .build()
        .unwrap();

    let copy = HttpClientConfigBuilder::from_config(&original)
        .build()
        .unwrap();

    assert_eq!(copy.url(), "http://127.0.0.1:8098/riak");
}

#[test]
fn test_from_config_resets_scheme_and_path() {
    let original = HttpClientConfig::builder()
        .with_scheme("https")
        .with_host("secure")
        .with_port(8443)
        .with_riak_path("/custom")
        .build()
        .unwrap();

    let copy = HttpClientConfigBuilder::from_config(&original)
        .build()
        .unwrap();

    assert_eq!(copy.url(), "http://secure:8443/riak");
}

#[test]
fn test_mapreduce_url() {
    let config = HttpClientConfig::builder()
        .with_host("10.0.0.1")
        .build()
        .unwrap();

    assert_eq!(
        config.mapreduce_url().unwrap().as_str(),
        "http://10.0.0.1:8098/mapred"
    );
}

#[test]
fn test_mapreduce_url_ignores_riak_path() {
    let config = HttpClientConfig::builder()
        .with_url("http://h:1/db/riak")
        .with_mapreduce_path("mapred")
        .build()
        .unwrap();

    assert_eq!(config.mapreduce_url().unwrap().as_str(), "http://h:1/mapred");
}

#[test]
fn test_mapreduce_url_stays_on_configured_host() {
    let config = HttpClientConfig::builder()
        .with_url("http://h:1/db/riak")
        .with_mapreduce_path("//elsewhere.example/x")
        .build()
        .unwrap();

    let url = config.mapreduce_url().unwrap();
    assert_eq!(url.host_str(), Some("h"));
    assert_eq!(url.as_str(), "http://h:1/elsewhere.example/x");
}

#[test]
fn test_summary() {
    let config = HttpClientConfig::builder()
        .with_timeout(Duration::from_secs(2))
        .with_max_connections(8)
        .build()
        .unwrap();

    let summary = config.summary();
    assert_eq!(summary.url, "http://127.0.0.1:8098/riak");
    assert_eq!(
        summary.mapreduce_url.as_deref(),
        Some("http://127.0.0.1:8098/mapred")
    );
    assert_eq!(summary.timeout_ms, Some(2000));
    assert_eq!(summary.max_connections, Some(8));
    assert!(!summary.has_http_client);
    assert!(!summary.has_retry_handler);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["timeout_ms"], 2000);
}

#[test]
fn test_config_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClientConfig>();
}

#[test]
fn test_load_toml_settings() {
    let temp_dir = setup_test_dir();
    let path = write_test_config(
        &temp_dir,
        "riak.toml",
        r#"
scheme = "https"
host = "db.local"
port = 8443
riak_path = "riak"
mapreduce_path = "/mapreduce"
timeout = "2s"
max_connections = 16
"#,
    );

    let settings = HttpClientSettings::load(&path).unwrap();
    let config = settings
        .apply(HttpClientConfigBuilder::new())
        .build()
        .unwrap();

    assert_eq!(config.url(), "https://db.local:8443/riak");
    assert_eq!(config.mapreduce_path(), "/mapreduce");
    assert_eq!(config.timeout(), Some(Duration::from_secs(2)));
    assert_eq!(config.max_connections(), Some(16));
}

#[test]
fn test_load_yaml_settings() {
    let temp_dir = setup_test_dir();
    let path = write_test_config(
        &temp_dir,
        "riak.yaml",
        r#"
url: "http://example.com:9000/riak"
mapred_path: /mr
"#,
    );

    let settings = HttpClientSettings::load(&path).unwrap();
    assert_eq!(settings.url.as_deref(), Some("http://example.com:9000/riak"));
    assert_eq!(settings.mapreduce_path.as_deref(), Some("/mr"));
    assert!(settings.timeout.is_none());
}

#[test]
fn test_unknown_setting_rejected() {
    let result = HttpClientSettings::from_toml_str("hots = \"typo\"");
    assert!(matches!(result, Err(Error::Toml(_))));
}

#[test]
fn test_missing_settings_file() {
    let temp_dir = setup_test_dir();
    let result = HttpClientSettings::load(&temp_dir.path().join("absent.toml"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_env_overrides_file() {
    let mut settings = HttpClientSettings::from_toml_str("host = \"file-host\"\nport = 1").unwrap();
    settings
        .merge_env_with(env_from(&[
            ("RIAK_HOST", "env-host"),
            ("RIAK_TIMEOUT_MS", "750"),
            ("RIAK_MAX_CONNECTIONS", "4"),
        ]))
        .unwrap();

    assert_eq!(settings.host.as_deref(), Some("env-host"));
    assert_eq!(settings.port, Some(1));
    assert_eq!(settings.timeout, Some(Duration::from_millis(750)));
    assert_eq!(settings.max_connections, Some(4));
}

#[test]
fn test_summary_saturates_huge_timeout() {
    let config = HttpClientConfig::builder()
        .with_timeout(Duration::MAX)
        .build()
        .unwrap();

    assert_eq!(config.summary().timeout_ms, Some(u64::MAX));
}

#[test]
fn test_env_host_overrides_part_of_file_url() {
    let temp_dir = setup_test_dir();
    let path = write_test_config(
        &temp_dir,
        "riak.toml",
        "url = \"http://file-host:1111/riak\"\n",
    );

    let mut settings = HttpClientSettings::load(&path).unwrap();
    settings
        .merge_env_with(env_from(&[("RIAK_HOST", "env-host")]))
        .unwrap();
    let config = settings
        .apply(HttpClientConfigBuilder::new())
        .with_port(2222)
        .build()
        .unwrap();

    assert_eq!(config.url(), "http://env-host:2222/riak");
}

#[test]
fn test_env_url_replaces_file_url() {
    let mut settings =
        HttpClientSettings::from_toml_str("url = \"http://file-host:1111/riak\"").unwrap();
    settings
        .merge_env_with(env_from(&[("RIAK_URL", "https://env-host/db")]))
        .unwrap();

    assert_eq!(settings.url.as_deref(), Some("https://env-host/db"));
    assert!(settings.host.is_none());
}

#[test]
fn test_split_url() {
    let mut settings = HttpClientSettings {
        url: Some("https://db.local/base/riak?x=1".to_string()),
        ..Default::default()
    };
    settings.split_url().unwrap();

    assert!(settings.url.is_none());
    assert_eq!(settings.scheme.as_deref(), Some("https"));
    assert_eq!(settings.host.as_deref(), Some("db.local"));
    assert_eq!(settings.port, Some(443));
    assert_eq!(settings.riak_path.as_deref(), Some("/base/riak"));

    let mut bad = HttpClientSettings {
        url: Some("not a url".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        bad.split_url(),
        Err(Error::InvalidConfiguration { .. })
    ));
}

#[test]
fn test_env_bad_port() {
    let mut settings = HttpClientSettings::default();
    let result = settings.merge_env_with(env_from(&[("RIAK_PORT", "abc")]));

    match result {
        Err(Error::InvalidSetting { key, value, .. }) => {
            assert_eq!(key, "RIAK_PORT");
            assert_eq!(value, "abc");
        }
        other => panic!("expected InvalidSetting, got {other:?}"),
    }
}

#[test]
fn test_apply_keeps_builder_values_for_unset_fields() {
    let settings = HttpClientSettings {
        port: Some(9999),
        ..Default::default()
    };
    let config = settings
        .apply(HttpClientConfigBuilder::new().with_host("kept"))
        .build()
        .unwrap();

    assert_eq!(config.url(), "http://kept:9999/riak");
}

#[test]
fn test_later_builder_calls_win_over_settings() {
    let settings = HttpClientSettings {
        host: Some("from-settings".to_string()),
        ..Default::default()
    };
    let config = settings
        .apply(HttpClientConfigBuilder::new())
        .with_host("from-flag")
        .build()
        .unwrap();

    assert_eq!(config.url(), "http://from-flag:8098/riak");
}

proptest! {
    #[test]
    fn test_riak_path_gets_exactly_one_slash(
        scheme in prop::sample::select(vec!["http", "https"]),
        host in "[a-z]{1,12}(\\.[a-z]{1,8}){0,2}",
        port in 1u16..=u16::MAX,
        leading_slash in any::<bool>(),
    ) {
        let path = if leading_slash { "/riak" } else { "riak" };
        let config = HttpClientConfig::builder()
            .with_scheme(scheme)
            .with_host(host.clone())
            .with_port(port)
            .with_riak_path(path)
            .build()
            .unwrap();

        prop_assert_eq!(config.url(), format!("{scheme}://{host}:{port}/riak"));
    }

    #[test]
    fn test_copy_recovers_host_and_port(
        host in "[a-z]{1,12}",
        port in 1u16..=u16::MAX,
    ) {
        let original = HttpClientConfig::builder()
            .with_host(host.clone())
            .with_port(port)
            .build()
            .unwrap();

        let copy = HttpClientConfigBuilder::from_config(&original).build().unwrap();
        prop_assert_eq!(copy.url(), original.url());
    }
}
