use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenBuildError {
    #[error("failed to read token source {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("token source is not valid JSON")]
    Parse(#[source] serde_json::Error),
    #[error("token source must be a JSON object, found {0}")]
    NotAnObject(&'static str),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum FormatError {
    #[error("token `{token}` references `{reference}`, which does not exist")]
    UnresolvedReference { token: String, reference: String },
    #[error("circular token reference: {}", chain.join(" -> "))]
    CircularReference { chain: Vec<String> },
    #[error("token `{token}` interpolates composite token `{reference}` into a string")]
    CompositeInterpolation { token: String, reference: String },
}
