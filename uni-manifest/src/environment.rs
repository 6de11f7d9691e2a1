//! Engine options and their environment variable overrides.
//!
//! Resolution itself has no knobs: it always reports every violation. These
//! options only decide what a caller does with the report, namely whether
//! violations fail the build and how loudly they are printed.

use std::env;
use std::fmt;

use crate::error::{Error, Result};
use crate::logging::{init_logger, LogLevel};

/// Environment variable selecting the violation policy.
pub const VIOLATIONS_ENV: &str = "UNI_MANIFEST_VIOLATIONS";

/// What to do with violations once resolution finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViolationPolicy {
    /// Report violations and keep the resolved configuration.
    #[default]
    Report,
    /// Treat any violation as a fatal error.
    Deny,
}

impl ViolationPolicy {
    /// Parses a policy name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not `report` or `deny`.
    ///
    /// # Examples
    ///
    /// ```
    /// use uni_manifest::ViolationPolicy;
    ///
    /// assert_eq!(ViolationPolicy::parse("DENY").unwrap(), ViolationPolicy::Deny);
    /// assert!(ViolationPolicy::parse("ignore").is_err());
    /// ```
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "report" => Ok(Self::Report),
            "deny" => Ok(Self::Deny),
            _ => Err(format!(
                "invalid violation policy: '{s}' (expected 'report' or 'deny')"
            )),
        }
    }
}

impl fmt::Display for ViolationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Report => write!(f, "report"),
            Self::Deny => write!(f, "deny"),
        }
    }
}

/// Options for a [`Resolver`](crate::Resolver).
///
/// # Examples
///
/// ```
/// use uni_manifest::{LogLevel, ResolveOptions, ViolationPolicy};
///
/// let options = ResolveOptions {
///     policy: ViolationPolicy::Deny,
///     log_level: LogLevel::Quiet,
/// };
/// assert_ne!(options, ResolveOptions::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Violation policy.
    pub policy: ViolationPolicy,
    /// Verbosity of the violation report.
    pub log_level: LogLevel,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            policy: ViolationPolicy::Report,
            log_level: LogLevel::Normal,
        }
    }
}

impl ResolveOptions {
    /// Reads options from `UNI_MANIFEST_VIOLATIONS` and
    /// `UNI_MANIFEST_LOG_MODE`, falling back to defaults for unset variables.
    ///
    /// An unrecognized log mode falls back to Normal, matching
    /// [`init_logger`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEnvironment`] if the violation policy is set
    /// to an unrecognized value.
    pub fn from_env() -> Result<Self> {
        let policy = match env::var(VIOLATIONS_ENV) {
            Ok(value) => ViolationPolicy::parse(&value).map_err(|message| {
                Error::InvalidEnvironment {
                    var: VIOLATIONS_ENV.into(),
                    message,
                }
            })?,
            Err(_) => ViolationPolicy::default(),
        };

        Ok(Self {
            policy,
            log_level: init_logger(false, false).level(),
        })
    }
}
