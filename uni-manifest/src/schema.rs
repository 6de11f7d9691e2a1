//! Declarative schema of the manifest.
//!
//! The schema is a tree of [`SchemaNode`]s. Leaves are scalars, enums, and
//! ordered enum sets, each carrying its built-in default. Inner nodes are
//! objects with a fixed set of named children. Free-form maps are opaque
//! leaves: they have no default beyond "empty" and are never validated.
//!
//! The tree is pure data. The [`DefaultTable`](crate::DefaultTable) and the
//! resolver both walk it; nothing here has side effects.

use std::sync::OnceLock;

use serde_json::{Map, Value};

use crate::manifest::{
    FlexDirection, ManifestEnum, NvueCompiler, NvueLaunchMode, Renderer, RunMode,
    ScreenOrientation, StatisticsVersion, DEFAULT_NETWORK_TIMEOUT_MS, DEFAULT_REPORT_INTERVAL,
    PLATFORM_KEYS,
};
use crate::validator;

/// Additional per-field predicate run after the kind check.
///
/// Returns a human-readable reason on failure.
pub type FieldRule = fn(&Value) -> Result<(), String>;

/// Primitive type of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// A JSON string.
    String,
    /// A JSON boolean.
    Boolean,
    /// A non-negative integer that fits in a `u64`.
    Integer,
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Boolean => write!(f, "boolean"),
            Self::Integer => write!(f, "integer"),
        }
    }
}

/// A primitive field.
#[derive(Debug, Clone)]
pub struct ScalarNode {
    /// Expected primitive type.
    pub kind: ScalarKind,
    /// Built-in default.
    pub default: Value,
    /// Optional extra predicate.
    pub rule: Option<FieldRule>,
}

/// A string field restricted to a closed set of literals.
#[derive(Debug, Clone)]
pub struct EnumNode {
    /// The allowed literals.
    pub values: &'static [&'static str],
    /// Built-in default.
    pub default: &'static str,
}

/// An ordered list of distinct enum literals.
#[derive(Debug, Clone)]
pub struct EnumSetNode {
    /// The allowed literals.
    pub values: &'static [&'static str],
    /// Built-in default.
    pub default: Vec<&'static str>,
}

/// A named child of an object node.
#[derive(Debug, Clone)]
pub struct Field {
    /// Key in the manifest.
    pub name: &'static str,
    /// Shape of the value.
    pub node: SchemaNode,
}

/// Creates a named field.
#[must_use]
pub fn field(name: &'static str, node: SchemaNode) -> Field {
    Field { name, node }
}

/// An object with a fixed set of named children.
///
/// An open object additionally accepts undeclared keys and carries them
/// through resolution untouched.
#[derive(Debug, Clone)]
pub struct ObjectNode {
    fields: Vec<Field>,
    open: bool,
}

impl ObjectNode {
    /// Creates a closed object: undeclared keys are a schema mismatch.
    #[must_use]
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            open: false,
        }
    }

    /// Creates an open object: undeclared keys pass through verbatim.
    #[must_use]
    pub fn open(fields: Vec<Field>) -> Self {
        Self { fields, open: true }
    }

    /// Declared children, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a declared child by key.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Whether undeclared keys are accepted.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    fn default_value(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| (field.name.to_string(), field.node.default_value()))
            .collect();
        Value::Object(map)
    }
}

/// A node of the schema tree.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// String, boolean, or integer leaf.
    Scalar(ScalarNode),
    /// Closed set of string literals.
    Enum(EnumNode),
    /// Ordered list of distinct enum literals.
    EnumSet(EnumSetNode),
    /// Nested object with declared children.
    Object(ObjectNode),
    /// Opaque key/value region.
    FreeFormMap,
}

impl SchemaNode {
    /// String scalar with a default.
    #[must_use]
    pub fn string(default: &str) -> Self {
        Self::scalar(ScalarKind::String, Value::from(default))
    }

    /// Boolean scalar with a default.
    #[must_use]
    pub fn boolean(default: bool) -> Self {
        Self::scalar(ScalarKind::Boolean, Value::from(default))
    }

    /// Non-negative integer scalar with a default.
    #[must_use]
    pub fn integer(default: u64) -> Self {
        Self::scalar(ScalarKind::Integer, Value::from(default))
    }

    fn scalar(kind: ScalarKind, default: Value) -> Self {
        Self::Scalar(ScalarNode {
            kind,
            default,
            rule: None,
        })
    }

    /// Attaches an extra predicate. Has no effect on non-scalar nodes.
    #[must_use]
    pub fn with_rule(self, rule: FieldRule) -> Self {
        match self {
            Self::Scalar(scalar) => Self::Scalar(ScalarNode {
                rule: Some(rule),
                ..scalar
            }),
            other => other,
        }
    }

    /// Enum field over the domain of `T`.
    #[must_use]
    pub fn enumeration<T: ManifestEnum>(default: T) -> Self {
        Self::Enum(EnumNode {
            values: T::VALUES,
            default: default.as_str(),
        })
    }

    /// Ordered enum set over the domain of `T`.
    #[must_use]
    pub fn enum_set<T: ManifestEnum>(default: &[T]) -> Self {
        Self::EnumSet(EnumSetNode {
            values: T::VALUES,
            default: default.iter().map(|value| value.as_str()).collect(),
        })
    }

    /// Closed object.
    #[must_use]
    pub fn object(fields: Vec<Field>) -> Self {
        Self::Object(ObjectNode::new(fields))
    }

    /// Free-form map.
    #[must_use]
    pub fn free_form() -> Self {
        Self::FreeFormMap
    }

    /// The built-in value of this node.
    ///
    /// Objects expand to a map holding every child's default; free-form maps
    /// are empty.
    #[must_use]
    pub fn default_value(&self) -> Value {
        match self {
            Self::Scalar(scalar) => scalar.default.clone(),
            Self::Enum(node) => Value::from(node.default),
            Self::EnumSet(node) => Value::from(node.default.clone()),
            Self::Object(object) => object.default_value(),
            Self::FreeFormMap => Value::Object(Map::new()),
        }
    }

    /// Short name of the variant, for messages.
    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Enum(_) => "enum",
            Self::EnumSet(_) => "enum set",
            Self::Object(_) => "object",
            Self::FreeFormMap => "free-form map",
        }
    }
}

/// Joins a dotted parent path and a child key.
#[must_use]
pub fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// A complete schema rooted at an object node.
///
/// # Examples
///
/// ```
/// use uni_manifest::schema::{Schema, SchemaNode};
///
/// let schema = Schema::manifest();
/// assert!(matches!(
///     schema.lookup("app-plus.runmode"),
///     Some(SchemaNode::Enum(_))
/// ));
/// assert!(schema.lookup("app-plus.runmode.extra").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    root: ObjectNode,
}

impl Schema {
    /// Creates a schema from its root object.
    #[must_use]
    pub fn new(root: ObjectNode) -> Self {
        Self { root }
    }

    /// The built-in manifest schema, built once per process.
    #[must_use]
    pub fn manifest() -> &'static Schema {
        static MANIFEST: OnceLock<Schema> = OnceLock::new();
        MANIFEST.get_or_init(build_manifest_schema)
    }

    /// The root object.
    #[must_use]
    pub fn root(&self) -> &ObjectNode {
        &self.root
    }

    /// Finds the node declared at a dotted path.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&SchemaNode> {
        let mut segments = path.split('.');
        let mut node = &self.root.field(segments.next()?)?.node;
        for segment in segments {
            match node {
                SchemaNode::Object(object) => node = &object.field(segment)?.node,
                _ => return None,
            }
        }
        Some(node)
    }

    /// Visits every declared node depth-first, parents before children.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&str, &SchemaNode),
    {
        fn walk_object<F>(object: &ObjectNode, parent: &str, visit: &mut F)
        where
            F: FnMut(&str, &SchemaNode),
        {
            for field in object.fields() {
                let path = join_path(parent, field.name);
                visit(&path, &field.node);
                if let SchemaNode::Object(child) = &field.node {
                    walk_object(child, &path, visit);
                }
            }
        }

        walk_object(&self.root, "", &mut visit);
    }

    /// Every declared dotted path, in walk order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.walk(|path, _| paths.push(path.to_string()));
        paths
    }

    /// The default value of the whole tree.
    #[must_use]
    pub fn default_value(&self) -> Value {
        self.root.default_value()
    }
}

fn timeout() -> SchemaNode {
    SchemaNode::integer(DEFAULT_NETWORK_TIMEOUT_MS)
}

fn build_manifest_schema() -> Schema {
    let network_timeout = SchemaNode::object(vec![
        field("request", timeout()),
        field("connectSocket", timeout()),
        field("uploadFile", timeout()),
        field("downloadFile", timeout()),
    ]);

    let uni_statistics = SchemaNode::object(vec![
        field("enable", SchemaNode::boolean(false)),
        field(
            "version",
            SchemaNode::enumeration(StatisticsVersion::V1),
        ),
        field("debug", SchemaNode::boolean(false)),
        field(
            "reportInterval",
            SchemaNode::integer(DEFAULT_REPORT_INTERVAL),
        ),
        field(
            "collectItems",
            SchemaNode::object(vec![field("uniPushClientID", SchemaNode::boolean(false))]),
        ),
    ]);

    let compatible = SchemaNode::object(vec![
        field("ignoreVersion", SchemaNode::boolean(false)),
        field("runtimeVersion", SchemaNode::string("")),
        field("compilerVersion", SchemaNode::string("")),
    ]);

    let splashscreen = SchemaNode::object(vec![
        field("alwaysShowBeforeRender", SchemaNode::boolean(true)),
        field("autoClose", SchemaNode::boolean(true)),
        field("waiting", SchemaNode::boolean(true)),
        field("useOriginalMsgbox", SchemaNode::boolean(false)),
    ]);

    let distribute = SchemaNode::object(vec![
        field("android", SchemaNode::free_form()),
        field("ios", SchemaNode::free_form()),
        field("sdkConfigs", SchemaNode::free_form()),
    ]);

    let web_view = SchemaNode::object(vec![
        field("minUserAgentVersion", SchemaNode::string("")),
        field("x5", SchemaNode::free_form()),
    ]);

    let app_plus = SchemaNode::Object(ObjectNode::open(vec![
        field("compatible", compatible),
        field("splashscreen", splashscreen),
        field(
            "screenOrientation",
            SchemaNode::enum_set(&[ScreenOrientation::PortraitPrimary]),
        ),
        field("modules", SchemaNode::free_form()),
        field("distribute", distribute),
        field("nvueCompiler", SchemaNode::enumeration(NvueCompiler::Weex)),
        field(
            "nvueStyleCompiler",
            SchemaNode::enumeration(NvueCompiler::Weex),
        ),
        field("renderer", SchemaNode::enumeration(Renderer::Native)),
        field(
            "nvueLaunchMode",
            SchemaNode::enumeration(NvueLaunchMode::Normal),
        ),
        field(
            "nvue",
            SchemaNode::object(vec![field(
                "flex-direction",
                SchemaNode::enumeration(FlexDirection::Column),
            )]),
        ),
        field(
            "uniStatistics",
            SchemaNode::object(vec![field("enable", SchemaNode::boolean(false))]),
        ),
        field(
            "optimization",
            SchemaNode::object(vec![field("subPackages", SchemaNode::boolean(false))]),
        ),
        field("runmode", SchemaNode::enumeration(RunMode::Normal)),
        field("webView", web_view),
    ]));

    let mut root = vec![
        field("name", SchemaNode::string("")),
        field("appid", SchemaNode::string("")),
        field("description", SchemaNode::string("")),
        field("locale", SchemaNode::string("auto")),
        field("versionName", SchemaNode::string("")),
        field(
            "versionCode",
            SchemaNode::string("").with_rule(validator::digits_only),
        ),
        field("transformPx", SchemaNode::boolean(true)),
        field("networkTimeout", network_timeout),
        field("debug", SchemaNode::boolean(false)),
        field("uniStatistics", uni_statistics),
        field("app-plus", app_plus),
    ];
    root.extend(
        PLATFORM_KEYS
            .into_iter()
            .map(|key| field(key, SchemaNode::free_form())),
    );

    Schema::new(ObjectNode::new(root))
}
