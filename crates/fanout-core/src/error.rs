//! Error types for Fanout

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Input Errors
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    // Transfer Errors
    #[error("Error downloading file: {0}")]
    Download(String),

    #[error("Error uploading file: {0}")]
    Upload(String),

    #[error("No storage provider available for event source: {0}")]
    NoSourceProvider(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidEvent(_) => "InvalidEvent",
            Error::InvalidConfig(_) => "InvalidConfig",
            Error::Download(_) => "DownloadError",
            Error::Upload(_) => "UploadError",
            Error::NoSourceProvider(_) => "NoSourceProvider",
            Error::Io(_) => "IoError",
            Error::Other(_) => "InternalError",
        }
    }

    pub fn invalid_event(msg: impl Into<String>) -> Self {
        Error::InvalidEvent(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::invalid_event("x").code(), "InvalidEvent");
        assert_eq!(Error::Download("x".into()).code(), "DownloadError");
        assert_eq!(Error::NoSourceProvider("onedata".into()).code(), "NoSourceProvider");
    }

    #[test]
    fn test_display() {
        let err = Error::Upload("bucket missing".into());
        assert_eq!(err.to_string(), "Error uploading file: bucket missing");
    }
}
