//! Structured error types for objscope
//!
//! Using thiserror for automatic Display implementation and error chaining.
//!
//! Only a malformed binary aborts a correlation run. Every other degraded
//! condition (missing sections, unresolvable symbols, absent source files)
//! is handled in place and still yields a complete listing.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListingError {
    /// The ELF buffer is truncated or its header/section table is invalid.
    /// This is the only fatal condition in the pipeline.
    #[error("malformed binary: {0}")]
    MalformedBinary(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ListingError {
    /// Shorthand for the truncation case, which every reader hits through
    /// the byte cursor.
    pub fn truncated(what: &str, wanted: usize, available: usize) -> Self {
        Self::MalformedBinary(format!(
            "{what}: need {wanted} bytes but only {available} remain"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_binary_display() {
        let err = ListingError::MalformedBinary("section header table extends past end of file".to_string());
        assert_eq!(
            err.to_string(),
            "malformed binary: section header table extends past end of file"
        );
    }

    #[test]
    fn test_truncated_display() {
        let err = ListingError::truncated("file header", 52, 12);
        assert!(err.to_string().contains("file header"));
        assert!(err.to_string().contains("52"));
        assert!(err.to_string().contains("12"));
    }
}
