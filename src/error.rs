use std::path::PathBuf;

use thiserror::Error;

use crate::phrases::PhraseKind;

/// Configuration faults that stop a session from being built.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown boss id `{0}`")]
    UnknownBoss(String),

    #[error("boss mode needs a boss definition")]
    MissingBoss,

    #[error("boss `{0}` has no hit points")]
    InvalidBoss(String),

    #[error("boss `{0}` given outside of boss mode")]
    UnexpectedBoss(String),

    #[error("{0} phrase pool is empty")]
    EmptyPool(PhraseKind),

    #[error("phrase pack `{0}` not found")]
    MissingPhrasePack(String),

    #[error("phrase pack `{name}` is not valid json")]
    InvalidPhrasePack {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read phrase file {path}")]
    PhraseFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the JSON-backed config and profile stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
