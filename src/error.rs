use std::path::PathBuf;
use thiserror::Error;

/// Structural failures that stop a run.
///
/// Unparsable headers and values are not errors: they are absorbed by the
/// melter and only show up as counts in the load report.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("no CSV found in {dir}; put the weekly summary exports there")]
    MissingInput { dir: PathBuf },

    #[error("could not decode {path} as UTF-8 or Windows-1252")]
    SourceDecode { path: PathBuf },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad source pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

pub type Result<T> = std::result::Result<T, EtlError>;
