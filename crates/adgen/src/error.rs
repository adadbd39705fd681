use thiserror::Error;

/// Diagnostic returned to callers that submit something other than an image.
pub const INVALID_FILE_TYPE: &str = "Invalid file type.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid file type.")]
    InvalidContentType(String),

    #[error("Payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Job queue is closed")]
    QueueClosed,

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl Error {
    /// Whether the error was raised by admission checks, i.e. the caller sent
    /// something that can never be processed.
    pub fn is_admission(&self) -> bool {
        matches!(
            self,
            Error::InvalidContentType(_) | Error::PayloadTooLarge { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
