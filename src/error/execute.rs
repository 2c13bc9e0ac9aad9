use thiserror::Error;

/// Errors captured on an [`crate::Outcome`] when a call does not complete.
///
/// These never escape a batch; each one belongs to exactly one request.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Failed to send request to '{url}': {source}")]
    SendFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read response body from '{url}' (status {status}): {source}")]
    ReadFailed {
        url: String,
        status: u16,
        #[source]
        source: reqwest::Error,
    },
    #[error("Admission gate closed before '{url}' could run.")]
    GateClosed { url: String },
    #[error("Task for '{url}' aborted: {source}")]
    Aborted {
        url: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl ExecError {
    /// Whether the underlying transport gave up because the request timeout elapsed.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            ExecError::SendFailed { source, .. } | ExecError::ReadFailed { source, .. } => {
                source.is_timeout()
            }
            ExecError::GateClosed { .. } | ExecError::Aborted { .. } => false,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            ExecError::SendFailed { url, .. }
            | ExecError::ReadFailed { url, .. }
            | ExecError::GateClosed { url }
            | ExecError::Aborted { url, .. } => url,
        }
    }
}
