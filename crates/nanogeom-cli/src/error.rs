use nanogeom::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to process file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        CliError::FileParsing {
            path: path.into(),
            source: source.into(),
        }
    }
}
