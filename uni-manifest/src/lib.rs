#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # uni-manifest
//!
//! Resolution engine for uni-app manifest configuration.
//!
//! Given a user-supplied manifest in which any field at any depth may be
//! missing, the engine produces a fully-populated, validated effective
//! configuration. Missing fields take built-in defaults, invalid fields are
//! reported and replaced by their defaults, and platform-specific free-form
//! blocks are carried through untouched.
//!
//! ## Core Types
//!
//! - [`Schema`]: the declared shape of the manifest
//! - [`DefaultTable`]: the built-in value of every declared field
//! - [`PartialConfig`]: user input, any subset of fields
//! - [`ManifestConfig`]: the typed effective configuration
//! - [`Resolver`], [`resolve`], and [`Resolution`]: the merge itself
//! - [`Violation`]: a recoverable rule failure
//! - [`Error`] and [`Result`]: fatal errors
//!
//! ## Examples
//!
//! ```
//! use serde_json::json;
//! use uni_manifest::{resolve_manifest, PartialConfig};
//!
//! let partial = PartialConfig::from_value(json!({
//!     "name": "demo",
//!     "networkTimeout": { "request": -5, "uploadFile": 10000 },
//!     "app-plus": { "modules": { "Camera": {} } }
//! }))
//! .unwrap();
//!
//! let resolution = resolve_manifest(&partial).unwrap();
//! assert_eq!(resolution.config.name, "demo");
//! assert_eq!(resolution.config.network_timeout.request, 60000);
//! assert_eq!(resolution.config.network_timeout.upload_file, 10000);
//! assert!(resolution.config.app_plus.modules.contains_key("Camera"));
//! assert_eq!(resolution.violations.len(), 1);
//! ```

pub mod defaults;
pub mod environment;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod partial;
pub mod resolver;
pub mod schema;
pub mod validator;

#[cfg(test)]
mod proptests;

// Re-export key types at crate root for convenience
pub use defaults::DefaultTable;
pub use environment::{ResolveOptions, ViolationPolicy};
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};
pub use manifest::{
    AppPlus, AppStatistics, CollectItems, Compatible, Distribute, FlexDirection, FreeFormMap,
    ManifestConfig, ManifestEnum, NetworkTimeout, Nvue, NvueCompiler, NvueLaunchMode,
    Optimization, Renderer, RunMode, ScreenOrientation, Splashscreen, StatisticsVersion,
    UniStatistics, WebView, X5Settings,
};
pub use partial::PartialConfig;
pub use resolver::{resolve, resolve_manifest, Resolution, Resolver};
pub use schema::Schema;
pub use validator::{Violation, ViolationKind};
