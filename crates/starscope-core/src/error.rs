use thiserror::Error;

#[derive(Error, Debug)]
pub enum StarscopeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid FITS header: {0}")]
    HeaderParse(String),

    #[error("Unsupported FITS format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("Invalid analysis options: {0}")]
    InvalidOptions(String),
}

impl StarscopeError {
    /// True for the failures that mean "this file is not something we decode",
    /// as opposed to a malformed or unreadable file.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(
            self,
            StarscopeError::UnsupportedFormat(_) | StarscopeError::InvalidDimensions { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, StarscopeError>;
