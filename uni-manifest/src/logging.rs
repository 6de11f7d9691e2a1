//! Logging infrastructure for the uni-manifest library.
//!
//! Internal diagnostics go through the `log` facade. This module adds a
//! small stderr logger with configurable verbosity that collaborators can
//! use to print a violation report.

use std::env;
use std::fmt;

use crate::validator::{Violation, ViolationKind};

/// Environment variable selecting the log level.
pub const LOG_MODE_ENV: &str = "UNI_MANIFEST_LOG_MODE";

/// How much of a violation report is printed.
///
/// # Examples
///
/// ```
/// use uni_manifest::LogLevel;
///
/// assert!(LogLevel::Quiet < LogLevel::Verbose);
/// assert_eq!(LogLevel::parse("Verbose"), Ok(LogLevel::Verbose));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Print nothing.
    Quiet,
    /// One line per violation.
    Normal,
    /// Violations plus a closing count.
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiet => write!(f, "quiet"),
            Self::Normal => write!(f, "normal"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

impl LogLevel {
    /// Parses `quiet`, `normal` or `verbose`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns a message naming the unrecognized value.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            _ => Err(format!("invalid log level: {s}")),
        }
    }
}

/// Prints violation reports to stderr.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use uni_manifest::{resolve_manifest, LogLevel, Logger, PartialConfig};
///
/// let partial = PartialConfig::new().with("versionCode", json!("1.0"));
/// let resolution = resolve_manifest(&partial).unwrap();
///
/// assert_eq!(Logger::new(LogLevel::Normal).report(&resolution.violations), 1);
/// assert_eq!(Logger::new(LogLevel::Quiet).report(&resolution.violations), 0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    /// A logger printing at `level`.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// The level this logger prints at.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    fn error(self, message: &str) {
        if self.level >= LogLevel::Normal {
            eprintln!("ERROR: {message}");
        }
    }

    fn warn(self, message: &str) {
        if self.level >= LogLevel::Normal {
            eprintln!("WARN: {message}");
        }
    }

    fn summary(self, message: &str) {
        if self.level >= LogLevel::Verbose {
            eprintln!("INFO: {message}");
        }
    }

    /// Prints one line per violation and returns the number printed.
    ///
    /// Field violations are warnings. Cross-field violations are errors,
    /// since nothing was substituted for them. Nothing is printed when the
    /// level is Quiet.
    pub fn report(&self, violations: &[Violation]) -> usize {
        if self.level < LogLevel::Normal {
            return 0;
        }

        for violation in violations {
            let line = Self::format_violation(violation);
            match violation.kind {
                ViolationKind::Field => self.warn(&line),
                ViolationKind::CrossField => self.error(&line),
            }
        }
        self.summary(&format!("{} manifest violation(s)", violations.len()));
        violations.len()
    }

    fn format_violation(violation: &Violation) -> String {
        if violation.related.is_empty() {
            violation.to_string()
        } else {
            format!("{violation} [see also {}]", violation.related.join(", "))
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Normal)
    }
}

/// Initializes a logger based on environment variables and caller flags.
///
/// The priority order is:
/// 1. Caller flags (verbose/quiet)
/// 2. `UNI_MANIFEST_LOG_MODE` environment variable
/// 3. Default (Normal)
///
/// If both `verbose` and `quiet` are true, `verbose` takes precedence.
///
/// # Examples
///
/// ```
/// use uni_manifest::{init_logger, LogLevel};
///
/// let logger = init_logger(true, false);
/// assert_eq!(logger.level(), LogLevel::Verbose);
/// ```
#[must_use]
pub fn init_logger(verbose: bool, quiet: bool) -> Logger {
    if verbose {
        return Logger::new(LogLevel::Verbose);
    }
    if quiet {
        return Logger::new(LogLevel::Quiet);
    }

    if let Ok(env_value) = env::var(LOG_MODE_ENV) {
        if let Ok(level) = LogLevel::parse(&env_value) {
            return Logger::new(level);
        }
    }

    Logger::new(LogLevel::Normal)
}
