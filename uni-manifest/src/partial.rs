//! User-supplied partial configuration.
//!
//! A partial configuration has the same shape as the manifest but any field,
//! at any depth, may be missing. It is kept as a plain JSON object tree; the
//! schema decides what each key means when the tree is resolved. JSON `null`
//! is treated the same as a missing key.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::manifest::ManifestConfig;
use crate::validator::describe;

/// Partial manifest configuration.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use uni_manifest::PartialConfig;
///
/// let partial = PartialConfig::new()
///     .with("name", json!("demo"))
///     .with("app-plus.optimization.subPackages", json!(true));
///
/// assert_eq!(partial.get("name"), Some(&json!("demo")));
/// assert_eq!(partial.get("app-plus.optimization"), Some(&json!({"subPackages": true})));
/// assert!(partial.get("app-plus.runmode").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialConfig {
    root: Map<String, Value>,
}

impl PartialConfig {
    /// An empty partial configuration: every field takes its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already-parsed value.
    ///
    /// `null` is accepted as an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPartial`] if the value is not an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            Value::Null => Ok(Self::new()),
            other => Err(Error::InvalidPartial {
                reason: format!("expected an object at the root, found {}", describe(&other)),
            }),
        }
    }

    /// Parses JSON text, such as the contents of a `manifest.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or not an object.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Parses YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML or its root is not a
    /// mapping.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Self::from_value(serde_yaml::from_str(text)?)
    }

    /// Builds a partial configuration in which every field is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized.
    pub fn from_config(config: &ManifestConfig) -> Result<Self> {
        Self::from_value(serde_json::to_value(config)?)
    }

    /// The root object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Whether no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Returns the value at a dotted path, if present.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Sets the value at a dotted path, creating intermediate objects.
    ///
    /// Intermediate values that are not objects are replaced.
    pub fn set(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut current = &mut self.root;
        for segment in parents {
            let entry = current
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            let Some(next) = entry.as_object_mut() else {
                return;
            };
            current = next;
        }
        current.insert((*last).to_string(), value);
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, path: &str, value: Value) -> Self {
        self.set(path, value);
        self
    }
}

impl TryFrom<Value> for PartialConfig {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl From<Map<String, Value>> for PartialConfig {
    fn from(root: Map<String, Value>) -> Self {
        Self { root }
    }
}
