use thiserror::Error;

/// Engine operation errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Any transport-level failure talking to the engine or runtime.
    /// Always recoverable: the service may simply be offline.
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    /// The engine explicitly reported job failure. Terminal for that job.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// A produced file could not be fetched. Expected and absorbed during
    /// the video candidate sweep; surfaced only after exhaustion.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Malformed response: {0}")]
    InvalidResponse(String),

    /// The TTS subprocess exited non-zero or produced unusable output.
    #[error("Subprocess failed: {0}")]
    Subprocess(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    /// Local persistence failed while materializing a fetched artifact.
    #[error("Store error: {0}")]
    Store(#[from] atelier_store::StoreError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EngineError::Timeout(err.to_string())
        } else {
            EngineError::Unavailable(err.to_string())
        }
    }
}
