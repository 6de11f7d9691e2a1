//! Built-in defaults for every declared field.
//!
//! The table is derived from the schema rather than written out by hand, so
//! it cannot drift from the declared tree. It holds the defaults both as a
//! JSON tree (for the resolver's per-field fallback) and as a typed
//! [`ManifestConfig`].

use std::sync::OnceLock;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::manifest::ManifestConfig;
use crate::schema::Schema;

/// Complete default instance of a schema.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use uni_manifest::DefaultTable;
///
/// let defaults = DefaultTable::global();
/// assert_eq!(defaults.default_for("networkTimeout.request").unwrap(), &json!(60000));
/// assert_eq!(defaults.default_for("app-plus.modules").unwrap(), &json!({}));
/// assert!(defaults.default_for("app-plus.modules.Camera").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct DefaultTable {
    tree: Value,
    config: ManifestConfig,
}

impl DefaultTable {
    /// Builds the table for a schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the schema's defaults do not form
    /// a valid [`ManifestConfig`].
    pub fn from_schema(schema: &Schema) -> Result<Self> {
        let tree = schema.default_value();
        let config =
            serde_json::from_value(tree.clone()).map_err(|err| Error::SchemaMismatch {
                path: "manifest".into(),
                reason: format!("schema defaults do not match the typed model: {err}"),
            })?;
        Ok(Self { tree, config })
    }

    /// The table for the built-in manifest schema, built once per process.
    ///
    /// # Panics
    ///
    /// Panics if the built-in schema and the typed model disagree, which the
    /// test suite rules out.
    #[must_use]
    pub fn global() -> &'static DefaultTable {
        static TABLE: OnceLock<DefaultTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            Self::from_schema(Schema::manifest())
                .expect("built-in manifest schema defaults form a ManifestConfig")
        })
    }

    /// Returns the default at a dotted path.
    ///
    /// Objects return their whole default subtree; free-form maps return an
    /// empty map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the path is not declared.
    pub fn default_for(&self, path: &str) -> Result<&Value> {
        let mut current = &self.tree;
        for segment in path.split('.') {
            current = current
                .as_object()
                .and_then(|map| map.get(segment))
                .ok_or_else(|| Error::SchemaMismatch {
                    path: path.to_string(),
                    reason: "no default is declared for this path".into(),
                })?;
        }
        Ok(current)
    }

    /// The whole default tree.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.tree
    }

    /// The defaults as a typed configuration.
    #[must_use]
    pub fn config(&self) -> &ManifestConfig {
        &self.config
    }
}
