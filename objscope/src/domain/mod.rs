//! Domain model for objscope
//!
//! This module contains core domain types and errors that provide:
//! - The input envelope and output listing shapes
//! - Filter flags shared by the parser and the correlator
//! - Structured error handling

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use errors::ListingError;
pub use types::{
    DisasmEnvelope, Listing, ListingRow, ParseFilters, SourceTag, COMPILATION_FAILED,
};
