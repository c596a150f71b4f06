use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReloadError>;

#[derive(Error, Debug)]
pub enum ReloadError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] cadence_parser::ParseError),
}
