//! Error types for the uni-manifest library.
//!
//! Resolution distinguishes two kinds of problems. Recoverable rule failures
//! are reported as [`Violation`](crate::Violation) values and never surface
//! here. Everything in this module is fatal: either the supplied data has a
//! shape the engine cannot start from, or the data and the built-in schema
//! disagree about which fields exist.

use thiserror::Error;

/// Result type alias for operations that may fail with a uni-manifest error.
///
/// # Examples
///
/// ```
/// use uni_manifest::{Error, Result};
///
/// fn example_operation() -> Result<u64> {
///     Ok(60000)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the uni-manifest library.
#[derive(Debug, Error)]
pub enum Error {
    /// The partial configuration references a path the schema does not declare.
    ///
    /// This indicates version skew between the manifest format and the engine.
    #[error("schema mismatch at '{path}': {reason}")]
    SchemaMismatch {
        /// Dotted path of the offending field.
        path: String,
        /// Description of the mismatch.
        reason: String,
    },

    /// The supplied partial configuration cannot be used as a starting point.
    #[error("invalid partial configuration: {reason}")]
    InvalidPartial {
        /// The reason the input was rejected.
        reason: String,
    },

    /// JSON text could not be parsed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML text could not be parsed.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An environment variable holds a value the engine does not understand.
    #[error("invalid value for {var}: {message}")]
    InvalidEnvironment {
        /// The environment variable name.
        var: String,
        /// A description of the problem.
        message: String,
    },

    /// Violations were found and the caller asked for them to be fatal.
    #[error("{count} manifest violation(s): {summary}")]
    Violations {
        /// Number of violations found.
        count: usize,
        /// One-line summary of every violation.
        summary: String,
    },
}

impl Error {
    /// Check if error indicates version skew between input and schema.
    ///
    /// # Examples
    ///
    /// ```
    /// use uni_manifest::Error;
    ///
    /// let err = Error::SchemaMismatch {
    ///     path: "app-plus.distribute.harmony".into(),
    ///     reason: "undeclared field".into(),
    /// };
    /// assert!(err.is_schema_mismatch());
    /// ```
    #[must_use]
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::SchemaMismatch { .. })
    }
}
