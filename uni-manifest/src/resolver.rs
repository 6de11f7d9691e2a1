//! Resolution of a partial configuration against the defaults.
//!
//! Resolution is a single recursive descent over the schema:
//!
//! - A leaf that is present is validated; a passing value is adopted, a
//!   failing one is recorded as a [`Violation`] and replaced by its default.
//! - An object that is absent takes its whole default subtree. An object
//!   that is present, even empty, is resolved child by child, so merging is
//!   per field rather than per object.
//! - A free-form map that is present is copied verbatim; an absent one is
//!   empty.
//!
//! Once the tree is assembled, cross-field rules run over the typed result.
//! The only fatal outcome is a key the schema does not declare.

use serde_json::{Map, Value};

use crate::defaults::DefaultTable;
use crate::environment::{ResolveOptions, ViolationPolicy};
use crate::error::{Error, Result};
use crate::logging::Logger;
use crate::manifest::ManifestConfig;
use crate::partial::PartialConfig;
use crate::schema::{join_path, ObjectNode, Schema, SchemaNode};
use crate::validator::{self, describe, Violation};

/// Outcome of a resolution: the effective configuration and every
/// violation found on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The fully-populated configuration.
    pub config: ManifestConfig,
    /// Violations, in schema order, followed by cross-field violations.
    pub violations: Vec<Violation>,
}

impl Resolution {
    /// Whether no violation was recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Applies a violation policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Violations`] under [`ViolationPolicy::Deny`] if any
    /// violation was recorded.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use uni_manifest::{resolve_manifest, PartialConfig, ViolationPolicy};
    ///
    /// let partial = PartialConfig::new().with("uniStatistics.version", json!("3"));
    /// let resolution = resolve_manifest(&partial).unwrap();
    /// assert!(resolution.clone().into_result(ViolationPolicy::Report).is_ok());
    /// assert!(resolution.into_result(ViolationPolicy::Deny).is_err());
    /// ```
    pub fn into_result(self, policy: ViolationPolicy) -> Result<ManifestConfig> {
        if policy == ViolationPolicy::Deny && !self.violations.is_empty() {
            let summary = self
                .violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::Violations {
                count: self.violations.len(),
                summary,
            });
        }
        Ok(self.config)
    }
}

/// Resolves a partial configuration against explicit defaults and schema.
///
/// # Errors
///
/// Returns [`Error::SchemaMismatch`] if the partial configuration contains a
/// key that a closed object of the schema does not declare, or if the
/// schema, defaults, and typed model disagree with each other.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use uni_manifest::{resolve, DefaultTable, PartialConfig, Schema};
///
/// let partial = PartialConfig::new().with("networkTimeout.request", json!(-5));
/// let resolution = resolve(&partial, DefaultTable::global(), Schema::manifest()).unwrap();
///
/// assert_eq!(resolution.config.network_timeout.request, 60000);
/// assert_eq!(resolution.violations[0].path, "networkTimeout.request");
/// ```
pub fn resolve(
    partial: &PartialConfig,
    defaults: &DefaultTable,
    schema: &Schema,
) -> Result<Resolution> {
    let mut violations = Vec::new();
    let tree = resolve_object(
        schema.root(),
        partial.as_map(),
        defaults.as_value(),
        "",
        &mut violations,
    )?;

    let config: ManifestConfig =
        serde_json::from_value(Value::Object(tree)).map_err(|err| Error::SchemaMismatch {
            path: "manifest".into(),
            reason: format!("resolved tree does not match the typed model: {err}"),
        })?;

    violations.extend(validator::check_cross_field(&config));
    log::debug!(
        "resolved manifest with {} violation(s)",
        violations.len()
    );

    Ok(Resolution { config, violations })
}

/// Resolves against the built-in schema and defaults.
///
/// # Errors
///
/// Returns [`Error::SchemaMismatch`] if the partial configuration contains an
/// undeclared key.
pub fn resolve_manifest(partial: &PartialConfig) -> Result<Resolution> {
    resolve(partial, DefaultTable::global(), Schema::manifest())
}

fn resolve_object(
    object: &ObjectNode,
    supplied: &Map<String, Value>,
    defaults: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Result<Map<String, Value>> {
    if !object.is_open() {
        // Smallest undeclared key, whatever order the map iterates in
        let undeclared = supplied.keys().filter(|key| object.field(key).is_none()).min();
        if let Some(key) = undeclared {
            return Err(Error::SchemaMismatch {
                path: join_path(path, key),
                reason: "field is not declared by the manifest schema".into(),
            });
        }
    }

    let mut resolved = Map::new();
    for field in object.fields() {
        let field_path = join_path(path, field.name);
        let default = defaults
            .get(field.name)
            .ok_or_else(|| Error::SchemaMismatch {
                path: field_path.clone(),
                reason: "no default is declared for this path".into(),
            })?;

        let value = match supplied.get(field.name) {
            None | Some(Value::Null) => default.clone(),
            Some(value) => resolve_node(&field.node, value, default, &field_path, violations)?,
        };
        resolved.insert(field.name.to_string(), value);
    }

    if object.is_open() {
        for (key, value) in supplied {
            if object.field(key).is_none() {
                resolved.insert(key.clone(), value.clone());
            }
        }
    }

    Ok(resolved)
}

fn resolve_node(
    node: &SchemaNode,
    value: &Value,
    default: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Result<Value> {
    match (node, value) {
        (SchemaNode::Object(object), Value::Object(supplied)) => Ok(Value::Object(
            resolve_object(object, supplied, default, path, violations)?,
        )),
        (SchemaNode::FreeFormMap, Value::Object(supplied)) => Ok(Value::Object(supplied.clone())),
        (SchemaNode::Object(_) | SchemaNode::FreeFormMap, other) => Ok(substitute(
            path,
            other,
            format!("expected object, found {}", describe(other)),
            default,
            violations,
        )),
        (leaf, value) => match validator::adopt_field(leaf, value) {
            Ok(adopted) => Ok(adopted),
            Err(reason) => Ok(substitute(path, value, reason, default, violations)),
        },
    }
}

fn substitute(
    path: &str,
    value: &Value,
    reason: String,
    default: &Value,
    violations: &mut Vec<Violation>,
) -> Value {
    log::debug!("{path}: {reason}; substituting default {default}");
    violations.push(Violation::field(
        path,
        value.clone(),
        reason,
        default.clone(),
    ));
    default.clone()
}

/// Resolves manifests with a fixed schema, default table, and options.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use uni_manifest::{LogLevel, PartialConfig, ResolveOptions, Resolver, ViolationPolicy};
///
/// let resolver = Resolver::new().with_options(ResolveOptions {
///     policy: ViolationPolicy::Deny,
///     log_level: LogLevel::Quiet,
/// });
///
/// let clean = PartialConfig::new().with("name", json!("demo"));
/// assert_eq!(resolver.resolve_config(&clean).unwrap().name, "demo");
///
/// let broken = PartialConfig::new().with("app-plus.runmode", json!("turbo"));
/// assert!(resolver.resolve_config(&broken).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    schema: &'a Schema,
    defaults: &'a DefaultTable,
    options: ResolveOptions,
}

impl Resolver<'static> {
    /// A resolver over the built-in schema and defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(Schema::manifest(), DefaultTable::global())
    }
}

impl Default for Resolver<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Resolver<'a> {
    /// A resolver over an explicit schema and default table.
    #[must_use]
    pub fn with_parts(schema: &'a Schema, defaults: &'a DefaultTable) -> Self {
        Self {
            schema,
            defaults,
            options: ResolveOptions::default(),
        }
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// The current options.
    #[must_use]
    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    /// Resolves and returns every violation, regardless of policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] on an undeclared key.
    pub fn resolve(&self, partial: &PartialConfig) -> Result<Resolution> {
        resolve(partial, self.defaults, self.schema)
    }

    /// Resolves, prints the violation report, and applies the policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] on an undeclared key, or
    /// [`Error::Violations`] under [`ViolationPolicy::Deny`].
    pub fn resolve_config(&self, partial: &PartialConfig) -> Result<ManifestConfig> {
        let resolution = self.resolve(partial)?;
        Logger::new(self.options.log_level).report(&resolution.violations);
        resolution.into_result(self.options.policy)
    }
}
