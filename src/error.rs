//! Error types for the formfill library.

use std::io;
use thiserror::Error;

/// Result type alias for formfill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while filling or exporting a form document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error decoding a document from JSON.
    #[error("Document decode error: {0}")]
    Decode(String),

    /// Error composing the visual layout of a document.
    #[error("Layout error: {0}")]
    Layout(String),

    /// Error rasterizing the composed document.
    #[error("Rasterization error: {0}")]
    Raster(String),

    /// Error assembling the workbook export.
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// Error assembling the download archive.
    #[error("Archive error: {0}")]
    Archive(String),

    /// A merge request violated the rectangular/unmerged precondition.
    #[error("Invalid merge: {0}")]
    InvalidMerge(String),

    /// A split was requested on a cell that is not a merge anchor.
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// Document not found in the backing store.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Error::Workbook(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Archive(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidMerge("region overlaps an existing merge".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid merge: region overlaps an existing merge"
        );

        let err = Error::DocumentNotFound("form-7".to_string());
        assert_eq!(err.to_string(), "Document not found: form-7");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Decode(_)));
    }
}
