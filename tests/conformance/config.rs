use acgctl::config::{load_settings, parse_settings};
use acgctl::error::ConfigErrorKind;

use super::common;

/// Minimal well-formed document for shape mutations.
const MINIMAL: &str = r#"
ip_acgs: []
directories: []
tags: {}
user_input_validation:
  ip_address:
    invalid: []
    prefix:
      default: 32
      min: 27
  ip_acg:
    rules_amt: {max: 10}
    rules_desc_length: {max: 64}
    name_length: {max: 50}
    groups_per_directory_amt: {max: 25}
"#;

// ─── Parsing ────────────────────────────────────────────────────────────────

#[test]
fn parses_the_sample_document() {
    let settings = parse_settings(common::settings_yaml()).expect("sample settings should parse");

    assert_eq!(settings.limits.rule_count_max, 10);
    assert_eq!(settings.limits.rule_desc_length_max, 64);
    assert_eq!(settings.limits.prefix_default, 32);
    assert_eq!(settings.limits.prefix_min, 27);
    assert_eq!(settings.limits.acg_name_length_max, 50);
    assert_eq!(settings.limits.acgs_per_directory_max, 25);
    assert_eq!(settings.limits.invalid_rules.len(), 3);
    assert_eq!(settings.limits.invalid_rules[0].ip, "0.0.0.0");

    let wi = &settings.work_instruction;
    assert_eq!(
        wi.tags.get("Application").map(String::as_str),
        Some("acgctl")
    );
    assert_eq!(wi.directories.len(), 1);
    assert_eq!(wi.directories[0].id.as_deref(), Some("d-9367bca3f8"));
    assert_eq!(wi.directories[0].name.as_deref(), Some("corp.example.com"));
    assert_eq!(wi.ip_acgs.len(), 2);
}

#[test]
fn declared_groups_are_sorted_by_name() {
    // The document lists acg-vpn before acg-office.
    let settings = parse_settings(common::settings_yaml()).unwrap();

    let names: Vec<&str> = settings
        .work_instruction
        .ip_acgs
        .iter()
        .map(|acg| acg.name.as_str())
        .collect();
    assert_eq!(names, &["acg-office", "acg-vpn"]);
}

#[test]
fn rule_maps_are_flattened_in_declaration_order() {
    let settings = parse_settings(common::settings_yaml()).unwrap();

    let office = &settings.work_instruction.ip_acgs[0];
    assert_eq!(office.name, "acg-office");
    assert_eq!(office.rules.len(), 2);
    assert_eq!(office.rules[0].ip, "192.0.2.10");
    assert_eq!(office.rules[0].desc, "Office gateway");
    assert_eq!(office.rules[1].ip, "192.0.2.128/27");
    assert_eq!(office.origin.as_deref(), Some("network team"));
    assert!(office.id.is_none(), "declared groups carry no id");
}

#[test]
fn parses_the_minimal_document() {
    let settings = parse_settings(MINIMAL).expect("minimal document should parse");
    assert!(settings.work_instruction.ip_acgs.is_empty());
    assert!(settings.limits.invalid_rules.is_empty());
}

// ─── Structure failures ─────────────────────────────────────────────────────

#[test]
fn rejects_an_empty_document() {
    let err = parse_settings("  \n").unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::Yaml);
    assert!(err.message.contains("empty"), "got: {}", err.message);
}

#[test]
fn rejects_a_non_mapping_root() {
    let err = parse_settings("- 1\n- 2\n").unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::Structure);
    assert!(err.message.contains("mapping"), "got: {}", err.message);
}

#[test]
fn rejects_a_missing_top_level_key() {
    let input = MINIMAL.replace("tags: {}", "");
    let err = parse_settings(&input).unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::Structure);
    assert!(err.message.contains("[tags]"), "got: {}", err.message);
}

#[test]
fn rejects_a_top_level_key_of_the_wrong_shape() {
    let input = MINIMAL.replace("ip_acgs: []", "ip_acgs: {}");
    let err = parse_settings(&input).unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::Structure);
    assert!(err.message.contains("[ip_acgs]"), "got: {}", err.message);
    assert!(err.message.contains("sequence"), "got: {}", err.message);
}

#[test]
fn rejects_a_group_entry_without_all_keys() {
    let input = MINIMAL.replace(
        "ip_acgs: []",
        "ip_acgs:\n  - name: office\n    desc: Office\n    rules: []",
    );
    let err = parse_settings(&input).unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::Structure);
    assert!(err.message.contains("[origin]"), "got: {}", err.message);
}

#[test]
fn rejects_a_group_entry_that_is_not_a_mapping() {
    let input = MINIMAL.replace("ip_acgs: []", "ip_acgs:\n  - office");
    let err = parse_settings(&input).unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::Structure);
    assert!(
        err.message.contains("entry [0] of [ip_acgs]"),
        "got: {}",
        err.message
    );
}

#[test]
fn rejects_invalid_yaml() {
    let err = parse_settings("ip_acgs: [unclosed").unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::Yaml);
}

// ─── Loading from disk ──────────────────────────────────────────────────────

#[test]
fn load_reports_a_missing_file_with_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    let err = load_settings(&path).unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::Io);
    assert!(
        err.path.as_deref().is_some_and(|p| p.contains("absent.yaml")),
        "got: {:?}",
        err.path
    );
}

#[test]
fn load_stamps_the_path_onto_parse_failures() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.yaml");
    std::fs::write(&path, "- not\n- a\n- settings file\n").unwrap();

    let err = load_settings(&path).unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::Structure);
    assert!(err.path.is_some());
    // Display leads with the path so the user knows which file to fix.
    assert!(err.to_string().starts_with('['), "got: {}", err);
}

#[test]
fn load_round_trips_the_sample_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.yaml");
    std::fs::write(&path, common::settings_yaml()).unwrap();

    let from_disk = load_settings(&path).unwrap();
    let from_str = parse_settings(common::settings_yaml()).unwrap();
    assert_eq!(from_disk, from_str);
}
