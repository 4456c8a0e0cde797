//! Error types for MARC parsing and authority lookups.
//!
//! This module provides the [`MarclinkError`] type for all library operations
//! and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all marclink operations.
///
/// Covers both the structural errors raised while parsing and writing
/// ISO 2709 records and the failure modes of the VIAF authority lookup.
#[derive(Error, Debug)]
pub enum MarclinkError {
    /// Error indicating an invalid or malformed MARC record.
    #[error("Invalid MARC record: {0}")]
    InvalidRecord(String),

    /// Error indicating an invalid leader (24-byte header).
    #[error("Invalid leader: {0}")]
    InvalidLeader(String),

    /// Error indicating an invalid field structure.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Error indicating a truncated or incomplete record.
    #[error("Truncated record: {0}")]
    TruncatedRecord(String),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The authority service answered with a non-200 status.
    #[error("Authority service returned HTTP {status}")]
    ServiceUnavailable {
        /// HTTP status code of the response.
        status: u16,
    },

    /// The authority service answered 200 but the body was not valid JSON.
    #[error("Malformed authority response: {0}")]
    MalformedResponse(String),

    /// Transport-level failure: timeout, connection refused, DNS failure.
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The input record lacks the control field carrying the lookup
    /// identifier.
    #[error("Record has no {0} control field to look up")]
    MissingIdentifierField(String),
}

impl MarclinkError {
    /// Whether this error is a per-record resolution failure.
    ///
    /// Resolution failures degrade a single record to "no codes available"
    /// rather than aborting the batch; everything else is fatal.
    #[must_use]
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable { .. } | Self::MalformedResponse(_) | Self::NetworkFailure(_)
        )
    }
}

/// Convenience type alias for [`std::result::Result`] with [`MarclinkError`].
pub type Result<T> = std::result::Result<T, MarclinkError>;
