//! Crate error type
//!
//! Only construction-time work can fail: reading or writing settings, binding sockets,
//! decoding datagrams. Everything on the per-tick path is total.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings file {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode settings for {path}: {source}")]
    SettingsEncode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("malformed network datagram: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
