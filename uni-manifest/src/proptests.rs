//! Property-based tests for resolution.

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use crate::defaults::DefaultTable;
use crate::manifest::{ManifestEnum, RunMode, DEFAULT_NETWORK_TIMEOUT_MS};
use crate::partial::PartialConfig;
use crate::resolver::resolve_manifest;
use crate::validator::ViolationKind;

const TIMEOUT_FIELDS: [&str; 4] = ["request", "connectSocket", "uploadFile", "downloadFile"];

// Any JSON value except floats, nested a few levels deep
fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z0-9 ]{0,8}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-zA-Z]{1,6}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn free_form_map() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[A-Za-z.]{1,10}", json_value(), 0..5)
        .prop_map(|map| map.into_iter().collect())
}

// Valid and invalid timeout values
fn timeout_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0u64..=1_000_000).prop_map(Value::from),
        (-1_000_000i64..0).prop_map(Value::from),
        Just(json!(1.5)),
        Just(json!("60000")),
    ]
}

fn enum_literal(values: &'static [&'static str]) -> impl Strategy<Value = Value> {
    let mut candidates: Vec<&'static str> = values.to_vec();
    candidates.extend(["", "3", "Normal", "sideways"]);
    prop::sample::select(candidates).prop_map(Value::from)
}

fn orientation_value() -> impl Strategy<Value = Value> {
    prop::collection::vec(
        prop::sample::select(vec![
            "portrait-primary",
            "portrait-secondary",
            "landscape-primary",
            "landscape-secondary",
            "sideways",
        ]),
        0..4,
    )
    .prop_map(Value::from)
}

fn partial_strategy() -> impl Strategy<Value = PartialConfig> {
    (
        prop::option::of(timeout_value()),
        prop::option::of(timeout_value()),
        prop::option::of(enum_literal(&["1", "2"])),
        prop::option::of(enum_literal(RunMode::VALUES)),
        prop::option::of(any::<bool>()),
        prop::option::of(orientation_value()),
        prop::option::of(free_form_map()),
        prop::option::of(free_form_map()),
        prop::option::of("[a-z ]{0,12}"),
    )
        .prop_map(
            |(request, upload, version, runmode, sub_packages, orientation, modules, weixin, name)| {
                let mut partial = PartialConfig::new();
                let entries = [
                    ("networkTimeout.request", request),
                    ("networkTimeout.uploadFile", upload),
                    ("uniStatistics.version", version),
                    ("app-plus.runmode", runmode),
                    ("app-plus.optimization.subPackages", sub_packages.map(Value::from)),
                    ("app-plus.screenOrientation", orientation),
                    ("app-plus.modules", modules.map(Value::Object)),
                    ("mp-weixin", weixin.map(Value::Object)),
                    ("name", name.map(Value::from)),
                ];
                for (path, value) in entries {
                    if let Some(value) = value {
                        partial.set(path, value);
                    }
                }
                partial
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 1000,
        .. ProptestConfig::default()
    })]

    // Same input, same output, including violation order
    #[test]
    fn resolution_is_deterministic(partial in partial_strategy()) {
        let first = resolve_manifest(&partial).unwrap();
        let second = resolve_manifest(&partial).unwrap();
        prop_assert_eq!(first, second);
    }

    // Feeding the effective config back in changes nothing and reports no
    // field violations; unresolved cross-field conflicts are reported again
    #[test]
    fn resolution_is_idempotent(partial in partial_strategy()) {
        let first = resolve_manifest(&partial).unwrap();
        let again = PartialConfig::from_config(&first.config).unwrap();
        let second = resolve_manifest(&again).unwrap();

        prop_assert_eq!(&second.config, &first.config);
        let first_cross: Vec<_> = first
            .violations
            .iter()
            .filter(|v| v.kind == ViolationKind::CrossField)
            .collect();
        let second_all: Vec<_> = second.violations.iter().collect();
        prop_assert_eq!(second_all, first_cross);
    }

    // Valid timeouts are adopted, absent ones take the default
    #[test]
    fn timeouts_fidelity_and_completeness(
        values in prop::collection::vec(prop::option::of(0u64..=10_000_000), 4)
    ) {
        let mut partial = PartialConfig::new();
        for (name, value) in TIMEOUT_FIELDS.iter().zip(&values) {
            if let Some(value) = value {
                partial.set(&format!("networkTimeout.{name}"), json!(value));
            }
        }

        let resolution = resolve_manifest(&partial).unwrap();
        prop_assert!(resolution.is_clean());

        let timeouts = &resolution.config.network_timeout;
        let resolved = [
            timeouts.request,
            timeouts.connect_socket,
            timeouts.upload_file,
            timeouts.download_file,
        ];
        for (value, actual) in values.iter().zip(resolved) {
            prop_assert_eq!(actual, value.unwrap_or(DEFAULT_NETWORK_TIMEOUT_MS));
        }
    }

    // Each invalid timeout yields its own violation; valid siblings survive
    #[test]
    fn invalid_timeouts_reported_individually(
        bad in -1_000_000i64..0,
        good in 0u64..=1_000_000,
        bad_index in 0usize..4,
    ) {
        let mut partial = PartialConfig::new();
        for (i, name) in TIMEOUT_FIELDS.iter().enumerate() {
            let value = if i == bad_index { json!(bad) } else { json!(good) };
            partial.set(&format!("networkTimeout.{name}"), value);
        }

        let resolution = resolve_manifest(&partial).unwrap();
        prop_assert_eq!(resolution.violations.len(), 1);
        let violation = &resolution.violations[0];
        prop_assert_eq!(
            violation.path.clone(),
            format!("networkTimeout.{}", TIMEOUT_FIELDS[bad_index])
        );
        prop_assert_eq!(&violation.value, &json!(bad));

        let resolved = serde_json::to_value(&resolution.config.network_timeout).unwrap();
        for (i, name) in TIMEOUT_FIELDS.iter().enumerate() {
            let expected = if i == bad_index { DEFAULT_NETWORK_TIMEOUT_MS } else { good };
            prop_assert_eq!(&resolved[*name], &json!(expected));
        }
    }

    // Enum values are adopted only inside the declared domain
    #[test]
    fn runmode_domain_enforced(literal in "[a-z]{0,9}") {
        let partial = PartialConfig::new().with("app-plus.runmode", json!(literal.clone()));
        let resolution = resolve_manifest(&partial).unwrap();

        if RunMode::VALUES.contains(&literal.as_str()) {
            prop_assert!(resolution.is_clean());
            prop_assert_eq!(resolution.config.app_plus.runmode.as_str(), literal.as_str());
        } else {
            prop_assert_eq!(resolution.violations.len(), 1);
            prop_assert_eq!(resolution.config.app_plus.runmode, RunMode::Normal);
        }
    }

    // Free-form regions come out exactly as they went in
    #[test]
    fn free_form_regions_pass_through(
        modules in free_form_map(),
        android in free_form_map(),
        quickapp in free_form_map(),
    ) {
        let partial = PartialConfig::new()
            .with("app-plus.modules", Value::Object(modules.clone()))
            .with("app-plus.distribute.android", Value::Object(android.clone()))
            .with("quickapp", Value::Object(quickapp.clone()));

        let resolution = resolve_manifest(&partial).unwrap();
        prop_assert!(resolution.is_clean());
        prop_assert_eq!(&resolution.config.app_plus.modules, &modules);
        prop_assert_eq!(&resolution.config.app_plus.distribute.android, &android);
        prop_assert_eq!(&resolution.config.quickapp, &quickapp);
        prop_assert!(resolution.config.app_plus.distribute.ios.is_empty());
    }

    // Anything left out equals the default table
    #[test]
    fn absent_subtrees_equal_defaults(name in "[a-z]{1,12}") {
        let partial = PartialConfig::new().with("name", json!(name.clone()));
        let resolution = resolve_manifest(&partial).unwrap();

        let mut expected = DefaultTable::global().config().clone();
        expected.name = name;
        prop_assert_eq!(resolution.config, expected);
    }
}
