use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: `{url}` is not a valid URL: {source}")]
    InvalidConfiguration {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid setting {key}={value:?}: {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid key filter: {0}")]
    InvalidFilter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
        Error::InvalidConfiguration {
            url: url.into(),
            source,
        }
    }

    pub(crate) fn invalid_setting(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Error::InvalidSetting {
            key: key.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// True for errors raised while validating a client configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfiguration { .. } | Error::InvalidSetting { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
