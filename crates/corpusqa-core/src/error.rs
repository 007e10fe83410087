use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Empty corpus: {0}")]
    EmptyCorpus(String),

    #[error("Index build failed: {0}")]
    IndexBuild(String),

    #[error("Remote capability error: {0}")]
    Remote(#[from] RemoteError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failures from the remote embedding and completion capabilities.
///
/// Retry policy branches on the variant: transient, rate-limited and timed-out
/// calls may be retried with backoff, while auth and parse failures are
/// permanent and surface immediately so the operator can tell "try again"
/// apart from "fix your credential".
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {message}")]
    Transient { message: String },

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("authentication failed: {message}")]
    Auth { message: String },

    #[error("response parse error: {message}")]
    Parse { message: String },
}

impl RemoteError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RemoteError::Transient { .. }
                | RemoteError::RateLimited { .. }
                | RemoteError::Timeout { .. }
        )
    }
}
