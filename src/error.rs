use thiserror::Error;

/// Error type returned by a custom handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by [`DataMatrix`](crate::DataMatrix).
///
/// Most operations on unknown ids or row keys are silent no-ops and never
/// produce an error; only the custom handler slot can fail.
#[derive(Debug, Error)]
pub enum MatrixError {
    /// [`handle`](crate::DataMatrix::handle) was called before a handler
    /// was configured.
    #[error("no custom handler is configured")]
    HandlerNotConfigured,

    /// The configured handler returned an error.
    #[error("custom handler failed: {0}")]
    Handler(#[source] HandlerError),
}

/// A specialized Result type for matrix operations.
pub type Result<T> = std::result::Result<T, MatrixError>;
