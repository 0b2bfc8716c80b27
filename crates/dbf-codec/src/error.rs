//! Error types for DBF file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort reading or writing a DBF table.
///
/// Recoverable conditions (a repaired record count, an unparsable numeric
/// cell, an unknown code page) never surface here; they are reported as
/// [`Diagnostic`](crate::Diagnostic)s on the parsed document instead.
#[derive(Debug, Error)]
pub enum DbfError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Buffer cannot hold a DBF header.
    #[error("invalid DBF file: {message}")]
    Format { message: String },

    /// Header values make the file unrecoverable.
    #[error("corrupt DBF file: {message}")]
    CorruptFile { message: String },

    /// Field descriptor cannot be written.
    #[error("invalid field '{name}': {message}")]
    InvalidField { name: String, message: String },

    /// Duplicate field name.
    #[error("duplicate field name: {name}")]
    DuplicateField { name: String },

    /// Record length does not fit the 16-bit header slot.
    #[error("record size {size} exceeds the DBF limit of 65535 bytes")]
    RecordTooLarge { size: usize },

    /// Header length does not fit the 16-bit header slot.
    #[error("{count} fields exceed the DBF header limit")]
    TooManyFields { count: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for DBF operations.
pub type Result<T> = std::result::Result<T, DbfError>;

impl DbfError {
    /// Create a Format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Create a CorruptFile error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::CorruptFile {
            message: message.into(),
        }
    }

    /// Create an InvalidField error.
    pub fn invalid_field(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a DuplicateField error.
    pub fn duplicate_field(name: impl Into<String>) -> Self {
        Self::DuplicateField { name: name.into() }
    }

    /// Whether the error was raised by the header sanity checks.
    #[must_use]
    pub fn is_header_error(&self) -> bool {
        matches!(self, Self::Format { .. } | Self::CorruptFile { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DbfError::format("buffer too small");
        assert_eq!(format!("{err}"), "invalid DBF file: buffer too small");

        let err = DbfError::corrupt("record size 0");
        assert_eq!(format!("{err}"), "corrupt DBF file: record size 0");

        let err = DbfError::invalid_field("AGE", "size must be 1..=254");
        assert_eq!(format!("{err}"), "invalid field 'AGE': size must be 1..=254");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let dbf_err: DbfError = io_err.into();
        assert!(matches!(dbf_err, DbfError::Io(_)));
        assert!(!dbf_err.is_header_error());
    }

    #[test]
    fn test_header_errors() {
        assert!(DbfError::format("x").is_header_error());
        assert!(DbfError::corrupt("x").is_header_error());
        assert!(!DbfError::duplicate_field("NAME").is_header_error());
    }
}
