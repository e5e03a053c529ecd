//! Error types for zbx2tf operations.
//!
//! This module defines [`ImportError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `ImportError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `ImportError::Other`) for unexpected errors
//! - Only document parse failures and output I/O abort a run; reference
//!   resolution errors are handled per-trigger and never propagate

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for zbx2tf operations.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Input export file not found at the given path.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// The XML parser rejected the input document.
    #[error("Failed to parse XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document parsed but does not have a usable element structure.
    #[error("Malformed template export: {message}")]
    MalformedDocument { message: String },

    /// A trigger expression references an item key that is not cached or
    /// was never emitted as a resource.
    #[error("Unresolved item reference: {key}")]
    UnresolvedItemReference { key: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for zbx2tf operations.
pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_not_found_displays_path() {
        let err = ImportError::InputNotFound {
            path: PathBuf::from("/exports/template.xml"),
        };
        assert!(err.to_string().contains("/exports/template.xml"));
    }

    #[test]
    fn malformed_document_displays_message() {
        let err = ImportError::MalformedDocument {
            message: "no root element".into(),
        };
        assert!(err.to_string().contains("no root element"));
    }

    #[test]
    fn unresolved_item_reference_displays_key() {
        let err = ImportError::UnresolvedItemReference {
            key: "net.if.in[eth0]".into(),
        };
        assert!(err.to_string().contains("net.if.in[eth0]"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: ImportError = io_err.into();
        assert!(matches!(err, ImportError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(ImportError::MalformedDocument {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
