use std::io;
use std::path::PathBuf;

/// Errors raised while configuring or driving a compaction run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid mask pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("reading config {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing config {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config file {} does not exist", path.display())]
    ConfigMissing { path: PathBuf },

    #[error("reading input")]
    Read(#[source] io::Error),

    #[error("writing output")]
    Write(#[source] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
