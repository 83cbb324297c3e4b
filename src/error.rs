//! Error types for geocell operations.

use thiserror::Error;

/// Errors produced by geocell construction, validation, and search.
#[derive(Error, Debug)]
pub enum GeocellError {
    /// Latitude outside the [-90, 90] degree range.
    #[error("latitude must be in [-90, 90] but was {0}")]
    InvalidLatitude(f64),

    /// Longitude outside the [-180, 180] degree range.
    #[error("longitude must be in [-180, 180] but was {0}")]
    InvalidLongitude(f64),

    /// A geocell string that is empty or contains characters outside the
    /// 16-symbol alphabet.
    #[error("invalid geocell string: {0:?}")]
    InvalidGeocell(String),

    /// Rejected search options (e.g. zero `max_results`).
    #[error("invalid search options: {0}")]
    InvalidOptions(String),

    /// The injected entity finder reported a failure. The search is aborted
    /// at the point of failure and partial results are discarded.
    #[error("entity finder failed: {0}")]
    EntityFinder(String),
}

/// Result type alias using [`GeocellError`].
pub type Result<T> = std::result::Result<T, GeocellError>;
