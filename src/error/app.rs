use thiserror::Error;

use super::{ConfigError, ExecError, RequestError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("Request error: {0}")]
    Request(#[from] RequestError),
    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{failed} of {total} requests failed.")]
    BatchFailed { failed: usize, total: usize },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn request<E>(error: E) -> Self
    where
        E: Into<RequestError>,
    {
        error.into().into()
    }

    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }
}
