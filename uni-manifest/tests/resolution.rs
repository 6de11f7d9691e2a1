//! Integration tests for manifest resolution.
//!
//! These exercise the public API end to end: loading manifests from JSON and
//! YAML, resolving against the built-in schema, and applying policies.

mod common;

use common::{load_fixture, violation_paths, violation_paths_of};
use serde_json::{json, Value};
use uni_manifest::{
    resolve_manifest, DefaultTable, Error, FlexDirection, LogLevel, ManifestConfig, ManifestEnum,
    NvueCompiler, NvueLaunchMode, PartialConfig, ResolveOptions, Resolver, RunMode, Schema,
    ScreenOrientation, StatisticsVersion, ViolationKind, ViolationPolicy,
};

fn quiet_resolver(policy: ViolationPolicy) -> Resolver<'static> {
    Resolver::new().with_options(ResolveOptions {
        policy,
        log_level: LogLevel::Quiet,
    })
}

#[test]
fn test_empty_manifest_equals_default_table() {
    let resolution = resolve_manifest(&PartialConfig::new()).unwrap();

    assert!(resolution.is_clean());
    assert_eq!(resolution.config, ManifestConfig::default());
    assert_eq!(
        serde_json::to_value(&resolution.config).unwrap(),
        *DefaultTable::global().as_value()
    );
}

#[test]
fn test_every_declared_path_is_populated() {
    let resolution = resolve_manifest(&PartialConfig::new()).unwrap();
    let resolved = PartialConfig::from_config(&resolution.config).unwrap();

    for path in Schema::manifest().paths() {
        assert!(
            resolved.get(&path).is_some(),
            "resolved config is missing '{path}'"
        );
    }
}

#[test]
fn test_invalid_timeout_reported_and_defaulted() {
    let partial = PartialConfig::new()
        .with("networkTimeout.request", json!(-5))
        .with("networkTimeout.downloadFile", json!(45000));

    let resolution = resolve_manifest(&partial).unwrap();

    assert_eq!(violation_paths(&resolution), vec!["networkTimeout.request"]);
    let timeouts = &resolution.config.network_timeout;
    assert_eq!(timeouts.request, 60000);
    assert_eq!(timeouts.connect_socket, 60000);
    assert_eq!(timeouts.upload_file, 60000);
    assert_eq!(timeouts.download_file, 45000);
}

#[test]
fn test_out_of_domain_statistics_version() {
    let partial = PartialConfig::new().with("uniStatistics.version", json!("3"));

    let resolution = resolve_manifest(&partial).unwrap();

    assert_eq!(violation_paths(&resolution), vec!["uniStatistics.version"]);
    assert_eq!(resolution.violations[0].value, json!("3"));
    assert_eq!(resolution.config.uni_statistics.version, StatisticsVersion::V1);
}

#[test]
fn test_sub_packages_conflict_reported_once() {
    let partial = PartialConfig::new()
        .with("app-plus.optimization.subPackages", json!(true))
        .with("app-plus.runmode", json!("normal"));

    let resolution = resolve_manifest(&partial).unwrap();

    assert_eq!(resolution.violations.len(), 1);
    let violation = &resolution.violations[0];
    assert_eq!(violation.kind, ViolationKind::CrossField);
    let paths: Vec<&str> = violation.paths().collect();
    assert!(paths.contains(&"app-plus.runmode"));
    assert!(paths.contains(&"app-plus.optimization.subPackages"));

    assert!(resolution.config.app_plus.optimization.sub_packages);
    assert_eq!(resolution.config.app_plus.runmode, RunMode::Normal);
}

#[test]
fn test_sub_packages_with_liberate_is_clean() {
    let partial = PartialConfig::new()
        .with("app-plus.optimization.subPackages", json!(true))
        .with("app-plus.runmode", json!("liberate"));

    let resolution = resolve_manifest(&partial).unwrap();

    assert!(resolution.is_clean());
    assert_eq!(resolution.config.app_plus.runmode, RunMode::Liberate);
}

#[test]
fn test_unknown_module_passes_through() {
    let partial = PartialConfig::new().with(
        "app-plus.modules",
        json!({"FutureModule": {"level": 3, "flags": ["a", "b"]}}),
    );

    let resolution = resolve_manifest(&partial).unwrap();

    assert!(resolution.is_clean());
    assert_eq!(
        resolution.config.app_plus.modules.get("FutureModule"),
        Some(&json!({"level": 3, "flags": ["a", "b"]}))
    );
}

#[test]
fn test_resolution_is_idempotent_on_fixture() {
    let first = resolve_manifest(&load_fixture("hello-uni.json")).unwrap();
    let again = PartialConfig::from_config(&first.config).unwrap();
    let second = resolve_manifest(&again).unwrap();

    assert_eq!(second.config, first.config);
    assert!(second.is_clean());
}

#[test]
fn test_hello_uni_fixture_resolves_cleanly() {
    let resolution = resolve_manifest(&load_fixture("hello-uni.json")).unwrap();

    assert!(
        resolution.is_clean(),
        "unexpected violations: {:?}",
        resolution.violations
    );
    let config = resolution.config;

    assert_eq!(config.name, "hello-uni");
    assert_eq!(config.version_code, "103");
    assert_eq!(config.locale, "auto");
    assert!(!config.transform_px);
    assert_eq!(config.network_timeout.request, 20000);
    assert_eq!(config.network_timeout.connect_socket, 60000);
    assert_eq!(config.network_timeout.upload_file, 120000);
    assert!(config.uni_statistics.enable);
    assert_eq!(config.uni_statistics.version, StatisticsVersion::V2);
    assert_eq!(config.uni_statistics.report_interval, 10);

    let app = &config.app_plus;
    assert_eq!(
        app.screen_orientation,
        vec![
            ScreenOrientation::PortraitPrimary,
            ScreenOrientation::LandscapePrimary
        ]
    );
    assert_eq!(app.nvue_compiler, NvueCompiler::Weex);
    assert_eq!(app.nvue_style_compiler, NvueCompiler::UniApp);
    assert_eq!(app.nvue.flex_direction, FlexDirection::Column);
    assert!(!app.splashscreen.use_original_msgbox);
    assert_eq!(app.runmode, RunMode::Liberate);
    assert_eq!(app.distribute.android["minSdkVersion"], json!(21));
    assert_eq!(app.distribute.ios["dSYMs"], json!(false));
    assert_eq!(app.extra.get("usingComponents"), Some(&json!(true)));
    assert_eq!(app.extra.get("compilerVersion"), Some(&json!(3)));

    let x5 = app.web_view.x5_settings().unwrap();
    assert_eq!(x5.time_out, 5000);
    assert!(x5.show_tips_without_wifi);
    assert!(!x5.allow_download_without_wifi);

    assert_eq!(config.mp_weixin["appid"], json!("wx0123456789abcdef"));
    assert_eq!(
        config.platform("h5").unwrap()["router"]["mode"],
        json!("hash")
    );
    assert!(config.quickapp.is_empty());
    assert!(config.mp_baidu.is_empty());
}

#[test]
fn test_broken_fixture_reports_every_violation() {
    let resolution = resolve_manifest(&load_fixture("broken.yaml")).unwrap();

    assert_eq!(
        violation_paths_of(&resolution, ViolationKind::Field),
        vec![
            "versionCode",
            "networkTimeout.request",
            "uniStatistics.version",
            "app-plus.screenOrientation",
            "app-plus.nvue.flex-direction",
        ]
    );
    assert_eq!(
        violation_paths_of(&resolution, ViolationKind::CrossField),
        vec!["app-plus.runmode"]
    );
    // Cross-field violations come last
    assert_eq!(
        resolution.violations.last().map(|v| v.kind),
        Some(ViolationKind::CrossField)
    );

    let config = &resolution.config;
    assert_eq!(config.name, "broken-app");
    assert_eq!(config.version_code, "");
    assert_eq!(config.network_timeout.request, 60000);
    assert_eq!(config.network_timeout.connect_socket, 15000);
    assert_eq!(config.uni_statistics.version, StatisticsVersion::V1);
    assert_eq!(config.uni_statistics.report_interval, 30);
    assert_eq!(
        config.app_plus.screen_orientation,
        vec![ScreenOrientation::PortraitPrimary]
    );
    assert_eq!(config.app_plus.nvue_launch_mode, NvueLaunchMode::Fast);
    assert_eq!(config.app_plus.nvue.flex_direction, FlexDirection::Column);
    assert_eq!(
        config.app_plus.modules.get("Payment"),
        Some(&json!({"alipay": {}}))
    );
}

#[test]
fn test_violations_describe_substitution() {
    let resolution = resolve_manifest(&load_fixture("broken.yaml")).unwrap();

    let version = resolution
        .violations
        .iter()
        .find(|v| v.path == "uniStatistics.version")
        .unwrap();
    assert_eq!(version.substituted, Some(json!("1")));
    let rendered = version.to_string();
    assert!(rendered.starts_with("uniStatistics.version:"));
    assert!(rendered.contains("\"3\""));

    let cross = resolution
        .violations
        .iter()
        .find(|v| v.kind == ViolationKind::CrossField)
        .unwrap();
    assert_eq!(cross.substituted, None);
}

#[test]
fn test_undeclared_field_is_schema_mismatch() {
    let partial = PartialConfig::new().with("uniStatistics.sampleRate", json!(0.5));

    let err = resolve_manifest(&partial).unwrap_err();

    match err {
        Error::SchemaMismatch { path, .. } => assert_eq!(path, "uniStatistics.sampleRate"),
        other => panic!("expected schema mismatch, got {other}"),
    }
}

#[test]
fn test_undeclared_platform_block_is_schema_mismatch() {
    let partial = PartialConfig::from_value(json!({"mp-harmony": {"appid": "x"}})).unwrap();
    assert!(resolve_manifest(&partial).unwrap_err().is_schema_mismatch());
}

#[test]
fn test_json_and_yaml_sources_agree() {
    let from_json = PartialConfig::from_json_str(
        r#"{"name": "twin", "app-plus": {"runmode": "liberate", "nvueLaunchMode": "fast"}}"#,
    )
    .unwrap();
    let from_yaml = PartialConfig::from_yaml_str(
        "name: twin\napp-plus:\n  runmode: liberate\n  nvueLaunchMode: fast\n",
    )
    .unwrap();

    assert_eq!(from_json, from_yaml);
    assert_eq!(
        resolve_manifest(&from_json).unwrap(),
        resolve_manifest(&from_yaml).unwrap()
    );
}

#[test]
fn test_non_object_manifest_rejected() {
    let err = PartialConfig::from_value(json!(["app-plus"])).unwrap_err();
    assert!(matches!(err, Error::InvalidPartial { .. }));

    let err = PartialConfig::from_json_str("{\"name\": ").unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn test_resolver_deny_policy() {
    let resolver = quiet_resolver(ViolationPolicy::Deny);

    let err = resolver
        .resolve_config(&load_fixture("broken.yaml"))
        .unwrap_err();
    match err {
        Error::Violations { count, summary } => {
            assert_eq!(count, 6);
            assert!(summary.contains("networkTimeout.request"));
            assert!(summary.contains("app-plus.runmode"));
        }
        other => panic!("expected violations error, got {other}"),
    }

    let config = resolver
        .resolve_config(&load_fixture("hello-uni.json"))
        .unwrap();
    assert_eq!(config.app_plus.runmode.as_str(), "liberate");
}

#[test]
fn test_resolver_report_policy() {
    let resolver = quiet_resolver(ViolationPolicy::Report);

    let config = resolver
        .resolve_config(&load_fixture("broken.yaml"))
        .unwrap();
    assert_eq!(config.network_timeout.request, 60000);

    // Schema mismatches stay fatal regardless of policy
    let partial = PartialConfig::new().with("app-plus.splashscreen.delay", json!(0));
    assert!(resolver.resolve_config(&partial).is_err());
}

#[test]
fn test_inputs_not_mutated() {
    let partial = load_fixture("broken.yaml");
    let before = partial.clone();
    let defaults_before: Value = DefaultTable::global().as_value().clone();

    resolve_manifest(&partial).unwrap();

    assert_eq!(partial, before);
    assert_eq!(*DefaultTable::global().as_value(), defaults_before);
}

#[test]
fn test_integral_float_timeouts_from_yaml() {
    let partial = PartialConfig::from_yaml_str(
        "networkTimeout:\n  request: 60000.0\n  uploadFile: 1000.0\n  downloadFile: 2.5\n",
    )
    .unwrap();

    let resolution = resolve_manifest(&partial).unwrap();

    assert_eq!(violation_paths(&resolution), vec!["networkTimeout.downloadFile"]);
    assert_eq!(resolution.config.network_timeout.request, 60000);
    assert_eq!(resolution.config.network_timeout.upload_file, 1000);
    assert_eq!(resolution.config.network_timeout.download_file, 60000);

    // Adopted values come back as plain integers
    let again = PartialConfig::from_config(&resolution.config).unwrap();
    assert_eq!(again.get("networkTimeout.uploadFile"), Some(&json!(1000)));
}
