use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WebtermErr>;

#[derive(Debug, Error)]
pub enum WebtermErr {
    #[error("could not determine the home directory")]
    HomeDirNotFound,

    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid listen address `{value}`: {source}")]
    InvalidListenAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

impl WebtermErr {
    pub(crate) fn config_read(path: PathBuf, source: io::Error) -> Self {
        Self::ConfigRead { path, source }
    }

    pub(crate) fn config_parse(path: PathBuf, source: toml::de::Error) -> Self {
        Self::ConfigParse { path, source }
    }
}
