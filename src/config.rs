//! settings.yaml loading.
//!
//! YAML is first deserialized into a `serde_json::Value`, structure-checked
//! so shape problems come back with the offending key named, and only then
//! mapped onto the typed model. Rule entries arrive as single-key
//! `{address: description}` maps; declared groups are sorted by name.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, ConfigErrorKind, STD_INSTRUCTION};
use crate::types::{DirectoryRef, IpAcg, Limits, Rule, Settings, WorkInstruction};

/// Read settings.yaml from disk and parse it.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let input = std::fs::read_to_string(path).map_err(|e| ConfigError {
        kind: ConfigErrorKind::Io,
        message: format!("could not read the settings file: {}", e),
        path: Some(path.display().to_string()),
    })?;

    parse_settings(&input).map_err(|e| ConfigError {
        path: Some(path.display().to_string()),
        ..e
    })
}

/// Parse a settings document from a YAML string.
pub fn parse_settings(input: &str) -> Result<Settings, ConfigError> {
    if input.trim().is_empty() {
        return Err(ConfigError {
            kind: ConfigErrorKind::Yaml,
            message: "the settings document is empty".to_string(),
            path: None,
        });
    }

    let value: Value = serde_saphyr::from_str(input).map_err(|e| ConfigError {
        kind: ConfigErrorKind::Yaml,
        message: e.to_string(),
        path: None,
    })?;

    check_main_structure(&value)?;
    check_ip_acg_structure(&value)?;

    let raw: RawSettings = serde_json::from_value(value).map_err(|e| ConfigError {
        kind: ConfigErrorKind::Structure,
        message: format!("{}. {}", e, STD_INSTRUCTION),
        path: None,
    })?;

    let RawSettings {
        ip_acgs,
        tags,
        directories,
        user_input_validation,
    } = raw;

    let settings = Settings {
        limits: limits_from(user_input_validation),
        work_instruction: work_instruction_from(directories, ip_acgs, tags),
    };

    if let Ok(pretty) = serde_json::to_string_pretty(&settings) {
        debug!("settings parsed from YAML:\n{}", pretty);
    }

    Ok(settings)
}

// ─── Structure checks ───────────────────────────────────────────────────────

fn structure_error(message: String) -> ConfigError {
    ConfigError {
        kind: ConfigErrorKind::Structure,
        message,
        path: None,
    }
}

/// Every top-level key must be present with at least an empty value of the
/// expected shape.
fn check_main_structure(value: &Value) -> Result<(), ConfigError> {
    let Some(root) = value.as_object() else {
        return Err(structure_error(format!(
            "the settings document root must be a YAML mapping. {}",
            STD_INSTRUCTION
        )));
    };

    let expected: [(&str, &str, fn(&Value) -> bool); 4] = [
        ("ip_acgs", "sequence", Value::is_array),
        ("tags", "mapping", Value::is_object),
        ("directories", "sequence", Value::is_array),
        ("user_input_validation", "mapping", Value::is_object),
    ];

    for (key, shape, has_shape) in expected {
        match root.get(key) {
            Some(v) if has_shape(v) => {}
            _ => {
                return Err(structure_error(format!(
                    "value of key [{}] is expected to be a {}, \
                     but is missing or of a different type. {}",
                    key, shape, STD_INSTRUCTION
                )));
            }
        }
    }

    Ok(())
}

/// Every entry under `ip_acgs` must carry the full set of group keys.
fn check_ip_acg_structure(value: &Value) -> Result<(), ConfigError> {
    let entries = value
        .get("ip_acgs")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for (i, entry) in entries.iter().enumerate() {
        let Some(map) = entry.as_object() else {
            return Err(structure_error(format!(
                "entry [{}] of [ip_acgs] is expected to be a mapping. {}",
                i, STD_INSTRUCTION
            )));
        };
        for key in ["name", "desc", "origin", "rules"] {
            if !map.contains_key(key) {
                return Err(structure_error(format!(
                    "key [{}] is expected to be part of every IP ACG \
                     in settings.yaml, but was not found. {}",
                    key, STD_INSTRUCTION
                )));
            }
        }
    }

    Ok(())
}

// ─── Raw YAML shape ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawSettings {
    ip_acgs: Vec<RawIpAcg>,
    tags: BTreeMap<String, String>,
    directories: Vec<DirectoryRef>,
    user_input_validation: RawBaseline,
}

#[derive(Debug, Deserialize)]
struct RawIpAcg {
    name: String,
    desc: String,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    rules: Option<Vec<BTreeMap<String, String>>>,
}

#[derive(Debug, Deserialize)]
struct RawBaseline {
    ip_address: RawIpAddress,
    ip_acg: RawIpAcgLimits,
}

#[derive(Debug, Deserialize)]
struct RawIpAddress {
    invalid: Vec<BTreeMap<String, String>>,
    prefix: RawPrefix,
}

#[derive(Debug, Deserialize)]
struct RawPrefix {
    default: i64,
    min: i64,
}

#[derive(Debug, Deserialize)]
struct RawIpAcgLimits {
    rules_amt: RawMax,
    rules_desc_length: RawMax,
    name_length: RawMax,
    groups_per_directory_amt: RawMax,
}

#[derive(Debug, Deserialize)]
struct RawMax {
    max: usize,
}

// ─── Conversion ─────────────────────────────────────────────────────────────

/// Flatten single-key `{address: description}` maps into rules, keeping
/// declaration order across maps.
fn rules_from(maps: Vec<BTreeMap<String, String>>) -> Vec<Rule> {
    let mut rules = Vec::new();
    for map in maps {
        for (ip, desc) in map {
            rules.push(Rule { ip, desc });
        }
    }
    rules
}

fn limits_from(raw: RawBaseline) -> Limits {
    Limits {
        invalid_rules: rules_from(raw.ip_address.invalid),
        rule_count_max: raw.ip_acg.rules_amt.max,
        rule_desc_length_max: raw.ip_acg.rules_desc_length.max,
        prefix_default: raw.ip_address.prefix.default,
        prefix_min: raw.ip_address.prefix.min,
        acg_name_length_max: raw.ip_acg.name_length.max,
        acgs_per_directory_max: raw.ip_acg.groups_per_directory_amt.max,
    }
}

fn work_instruction_from(
    directories: Vec<DirectoryRef>,
    raw_acgs: Vec<RawIpAcg>,
    tags: BTreeMap<String, String>,
) -> WorkInstruction {
    let mut ip_acgs: Vec<IpAcg> = raw_acgs
        .into_iter()
        .map(|acg| IpAcg {
            name: acg.name,
            desc: acg.desc,
            rules: rules_from(acg.rules.unwrap_or_default()),
            id: None,
            origin: acg.origin,
        })
        .collect();
    ip_acgs.sort_by(|a, b| a.name.cmp(&b.name));

    WorkInstruction {
        directories,
        ip_acgs,
        tags,
    }
}
