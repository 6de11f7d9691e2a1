//! Common test utilities for integration tests.
//!
//! Fixture manifests live under `tests/fixtures/manifests`.

use std::fs;
use std::path::PathBuf;

use uni_manifest::{PartialConfig, Resolution, ViolationKind};

/// Path to a fixture manifest.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("manifests")
        .join(name)
}

/// Loads a fixture as a partial configuration, by file extension.
pub fn load_fixture(name: &str) -> PartialConfig {
    let text = fs::read_to_string(fixture_path(name)).unwrap();
    if name.ends_with(".yaml") {
        PartialConfig::from_yaml_str(&text).unwrap()
    } else {
        PartialConfig::from_json_str(&text).unwrap()
    }
}

/// Primary paths of every violation, in report order.
pub fn violation_paths(resolution: &Resolution) -> Vec<&str> {
    resolution
        .violations
        .iter()
        .map(|violation| violation.path.as_str())
        .collect()
}

/// Primary paths of violations of one kind.
pub fn violation_paths_of(resolution: &Resolution, kind: ViolationKind) -> Vec<&str> {
    resolution
        .violations
        .iter()
        .filter(|violation| violation.kind == kind)
        .map(|violation| violation.path.as_str())
        .collect()
}
