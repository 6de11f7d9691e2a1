//! Field and cross-field validation.
//!
//! Field checks are pure predicates over a candidate value and the schema
//! node it is destined for. Cross-field rules run once over the assembled
//! [`ManifestConfig`]. Neither mutates anything; the resolver decides what
//! to do with a failure.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::manifest::{ManifestConfig, ManifestEnum, RunMode};
use crate::schema::{ScalarKind, SchemaNode};

/// What kind of rule produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// A single field failed its own check and was replaced by its default.
    Field,
    /// A combination of fields is inconsistent. Nothing was replaced.
    CrossField,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field => write!(f, "field"),
            Self::CrossField => write!(f, "cross-field"),
        }
    }
}

/// A recoverable rule failure recorded during resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Dotted path of the offending field.
    pub path: String,
    /// Other fields involved, for cross-field rules.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
    /// The value that was rejected.
    pub value: Value,
    /// Human-readable reason.
    pub reason: String,
    /// Rule kind.
    pub kind: ViolationKind,
    /// Value used instead, when one was substituted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substituted: Option<Value>,
}

impl Violation {
    /// A field violation that fell back to `substituted`.
    #[must_use]
    pub fn field(path: impl Into<String>, value: Value, reason: String, substituted: Value) -> Self {
        Self {
            path: path.into(),
            related: Vec::new(),
            value,
            reason,
            kind: ViolationKind::Field,
            substituted: Some(substituted),
        }
    }

    /// A cross-field violation. Values are kept as supplied.
    #[must_use]
    pub fn cross_field(
        path: impl Into<String>,
        related: Vec<String>,
        value: Value,
        reason: String,
    ) -> Self {
        Self {
            path: path.into(),
            related,
            value,
            reason,
            kind: ViolationKind::CrossField,
            substituted: None,
        }
    }

    /// Every path this violation references, primary first.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.path.as_str()).chain(self.related.iter().map(String::as_str))
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (got {})", self.path, self.reason, self.value)?;
        if let Some(ref substituted) = self.substituted {
            write!(f, ", using default {substituted}")?;
        }
        Ok(())
    }
}

/// JSON type name of a value, for messages.
#[must_use]
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Checks a candidate value against a leaf node.
///
/// Objects and free-form maps are structural and always pass here; the
/// resolver handles their shape.
///
/// # Errors
///
/// Returns the reason the value is unacceptable.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use uni_manifest::schema::Schema;
/// use uni_manifest::validator::check_field;
///
/// let node = Schema::manifest().lookup("uniStatistics.version").unwrap();
/// assert!(check_field(node, &json!("2")).is_ok());
/// assert!(check_field(node, &json!("3")).is_err());
/// ```
pub fn check_field(node: &SchemaNode, value: &Value) -> Result<(), String> {
    match node {
        SchemaNode::Scalar(scalar) => {
            check_kind(scalar.kind, value)?;
            match scalar.rule {
                Some(rule) => rule(value),
                None => Ok(()),
            }
        }
        SchemaNode::Enum(node) => check_enum(node.values, value),
        SchemaNode::EnumSet(node) => check_enum_set(node.values, value),
        SchemaNode::Object(_) | SchemaNode::FreeFormMap => Ok(()),
    }
}

/// Checks a candidate value and returns the form it is adopted in.
///
/// Integer fields written as integral floats (`60000.0`, `1e3`) are adopted
/// as plain integers.
///
/// # Errors
///
/// Returns the reason the value is unacceptable, as [`check_field`] does.
pub fn adopt_field(node: &SchemaNode, value: &Value) -> Result<Value, String> {
    check_field(node, value)?;
    match (node, value) {
        (SchemaNode::Scalar(scalar), Value::Number(number))
            if scalar.kind == ScalarKind::Integer && !number.is_u64() =>
        {
            Ok(number
                .as_f64()
                .and_then(integral_u64)
                .map_or_else(|| value.clone(), Value::from))
        }
        _ => Ok(value.clone()),
    }
}

fn check_kind(kind: ScalarKind, value: &Value) -> Result<(), String> {
    match (kind, value) {
        (ScalarKind::String, Value::String(_)) | (ScalarKind::Boolean, Value::Bool(_)) => Ok(()),
        (ScalarKind::Integer, Value::Number(_)) => non_negative_integer(value),
        (kind, other) => Err(format!("expected {kind}, found {}", describe(other))),
    }
}

/// Accepts integers in `0..=u64::MAX`, including integral floats.
///
/// # Errors
///
/// Rejects negative numbers, fractions, and non-numbers.
pub fn non_negative_integer(value: &Value) -> Result<(), String> {
    match value {
        Value::Number(number) if number.is_u64() => Ok(()),
        Value::Number(number) if number.as_f64().and_then(integral_u64).is_some() => Ok(()),
        Value::Number(number)
            if number.is_i64() || number.as_f64().is_some_and(|f| f < 0.0 && f.fract() == 0.0) =>
        {
            Err(format!("must be a non-negative integer, found {number}"))
        }
        Value::Number(number) => Err(format!("must be an integer, found {number}")),
        other => Err(format!("expected integer, found {}", describe(other))),
    }
}

// Finite, whole, and within u64
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn integral_u64(f: f64) -> Option<u64> {
    (f.is_finite() && f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64).then(|| f as u64)
}

/// Accepts empty strings and strings of ASCII digits.
///
/// # Errors
///
/// Rejects anything else, including non-strings.
pub fn digits_only(value: &Value) -> Result<(), String> {
    match value {
        Value::String(text) if text.chars().all(|c| c.is_ascii_digit()) => Ok(()),
        Value::String(text) => Err(format!("must contain only digits, found \"{text}\"")),
        other => Err(format!("expected string, found {}", describe(other))),
    }
}

fn check_enum(values: &[&str], value: &Value) -> Result<(), String> {
    match value {
        Value::String(text) if values.contains(&text.as_str()) => Ok(()),
        Value::String(text) => Err(format!(
            "\"{text}\" is not one of {}",
            format_domain(values)
        )),
        other => Err(format!(
            "expected one of {}, found {}",
            format_domain(values),
            describe(other)
        )),
    }
}

fn check_enum_set(values: &[&str], value: &Value) -> Result<(), String> {
    let Value::Array(items) = value else {
        return Err(format!("expected array, found {}", describe(value)));
    };

    let mut seen = HashSet::new();
    for (i, item) in items.iter().enumerate() {
        check_enum(values, item).map_err(|reason| format!("[{i}] {reason}"))?;
        if !seen.insert(item.as_str()) {
            return Err(format!("[{i}] duplicate entry {item}"));
        }
    }
    Ok(())
}

fn format_domain(values: &[&str]) -> String {
    let quoted: Vec<String> = values.iter().map(|value| format!("\"{value}\"")).collect();
    format!("{{{}}}", quoted.join(", "))
}

/// A named rule over the assembled configuration.
#[derive(Debug, Clone, Copy)]
pub struct CrossFieldRule {
    /// Stable identifier of the rule.
    pub name: &'static str,
    /// Returns a violation when the rule does not hold.
    pub check: fn(&ManifestConfig) -> Option<Violation>,
}

/// Built-in cross-field rules, in evaluation order.
pub const CROSS_FIELD_RULES: &[CrossFieldRule] = &[CrossFieldRule {
    name: "sub-packages-require-liberate",
    check: sub_packages_require_liberate,
}];

/// Runs every built-in cross-field rule.
#[must_use]
pub fn check_cross_field(config: &ManifestConfig) -> Vec<Violation> {
    CROSS_FIELD_RULES
        .iter()
        .filter_map(|rule| {
            let violation = (rule.check)(config);
            if violation.is_some() {
                log::debug!("cross-field rule '{}' failed", rule.name);
            }
            violation
        })
        .collect()
}

fn sub_packages_require_liberate(config: &ManifestConfig) -> Option<Violation> {
    let app_plus = &config.app_plus;
    if !app_plus.optimization.sub_packages || app_plus.runmode == RunMode::Liberate {
        return None;
    }

    Some(Violation::cross_field(
        "app-plus.runmode",
        vec!["app-plus.optimization.subPackages".to_string()],
        Value::from(app_plus.runmode.as_str()),
        format!(
            "must be \"{}\" when app-plus.optimization.subPackages is true",
            RunMode::Liberate
        ),
    ))
}
