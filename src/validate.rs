//! Work-instruction validation.
//!
//! Checks run in declaration order and the first violation wins: every check
//! returns a typed [`Violation`] as an error and the pass stops there. No
//! validator terminates the process; what to do with a violation is decided
//! by the caller.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::Violation;
use crate::types::{IpAcg, Limits, WorkInstruction};

// ─── Cached regexes ─────────────────────────────────────────────────────────

/// Dotted-quad IPv4: four octets 0-255, no leading zeros.
static IPV4_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)(\.(25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)){3}$")
        .unwrap()
});

// ─── Entry point ────────────────────────────────────────────────────────────

/// Validate the whole work instruction: the rule pass over every declared
/// group, then the group pass.
///
/// This is the single entry point called after parsing and before any
/// inventory matching or mutation. Rule addresses are normalized in place
/// (spaces stripped); nothing else is modified.
pub fn validate_work_instruction(
    work_instruction: &mut WorkInstruction,
    limits: &Limits,
) -> Result<(), Violation> {
    debug!("start: validate work instruction");

    for acg in &mut work_instruction.ip_acgs {
        validate_rules(acg, limits)?;
    }
    validate_ip_acgs(work_instruction, limits)?;

    debug!("finish: validate work instruction");
    Ok(())
}

// ─── Rule pass ──────────────────────────────────────────────────────────────

/// Rule pass for one group.
///
/// Each rule is normalized, split into address and prefix, checked, and its
/// canonical `address/prefix` form appended to an accumulator; the
/// accumulator is then checked for duplicates and the rule-count bounds.
pub fn validate_rules(acg: &mut IpAcg, limits: &Limits) -> Result<(), Violation> {
    debug!(acg = %acg.name, rules = acg.rules.len(), "validating IP rules");

    let name = acg.name.clone();
    let mut canonical: Vec<String> = Vec::with_capacity(acg.rules.len());

    for rule in &mut acg.rules {
        rule.ip = rule.ip.replace(' ', "");

        check_linebreaks(&name, &rule.ip)?;
        let (address, prefix) = split_ip_and_prefix(&name, &rule.ip, limits)?;
        check_ip_format(&name, &address)?;
        check_ip_allowed(&name, &address, limits)?;
        check_prefix_bounds(&name, &rule.ip, prefix, limits)?;
        check_rule_desc(&name, &rule.ip, &rule.desc, limits)?;

        canonical.push(format!("{}/{}", address, prefix));
    }

    let duplicates = duplicates_in(&canonical);
    if !duplicates.is_empty() {
        return Err(Violation::RuleDuplicate {
            acg: name,
            duplicates,
        });
    }
    if canonical.is_empty() {
        return Err(Violation::RuleCountZero { acg: name });
    }
    if canonical.len() > limits.rule_count_max {
        return Err(Violation::RuleCountExceeded {
            acg: name,
            count: canonical.len(),
            max: limits.rule_count_max,
        });
    }

    Ok(())
}

fn check_linebreaks(acg: &str, ip: &str) -> Result<(), Violation> {
    if ip.contains('\n') {
        return Err(Violation::RuleLinebreak {
            acg: acg.to_string(),
            ip: ip.to_string(),
        });
    }
    Ok(())
}

/// Split a rule value into `(address, prefix)` on the first `/`. A missing
/// prefix falls back to `limits.prefix_default`; a non-numeric prefix is a
/// syntax violation.
pub fn split_ip_and_prefix(
    acg: &str,
    ip: &str,
    limits: &Limits,
) -> Result<(String, i64), Violation> {
    match ip.split_once('/') {
        Some((address, prefix)) => {
            let parsed: i64 = prefix.parse().map_err(|_| Violation::PrefixMalformed {
                acg: acg.to_string(),
                ip: ip.to_string(),
                prefix: prefix.to_string(),
            })?;
            Ok((address.to_string(), parsed))
        }
        None => Ok((ip.to_string(), limits.prefix_default)),
    }
}

fn check_ip_format(acg: &str, address: &str) -> Result<(), Violation> {
    if !IPV4_RE.is_match(address) {
        return Err(Violation::IpFormat {
            acg: acg.to_string(),
            ip: address.to_string(),
        });
    }
    Ok(())
}

fn check_ip_allowed(acg: &str, address: &str, limits: &Limits) -> Result<(), Violation> {
    if limits.invalid_rules.iter().any(|rule| rule.ip == address) {
        return Err(Violation::RuleDisallowed {
            acg: acg.to_string(),
            ip: address.to_string(),
        });
    }
    Ok(())
}

/// Valid prefixes satisfy `prefix_min <= p <= prefix_default`; the default
/// doubles as the upper bound.
fn check_prefix_bounds(
    acg: &str,
    ip: &str,
    prefix: i64,
    limits: &Limits,
) -> Result<(), Violation> {
    if !(limits.prefix_min..=limits.prefix_default).contains(&prefix) {
        return Err(Violation::PrefixOutOfRange {
            acg: acg.to_string(),
            ip: ip.to_string(),
            prefix,
            min: limits.prefix_min,
            max: limits.prefix_default,
        });
    }
    Ok(())
}

fn check_rule_desc(acg: &str, ip: &str, desc: &str, limits: &Limits) -> Result<(), Violation> {
    if desc.is_empty() {
        return Err(Violation::RuleDescEmpty {
            acg: acg.to_string(),
            ip: ip.to_string(),
        });
    }
    let length = desc.chars().count();
    if length > limits.rule_desc_length_max {
        return Err(Violation::RuleDescTooLong {
            acg: acg.to_string(),
            ip: ip.to_string(),
            length,
            max: limits.rule_desc_length_max,
        });
    }
    Ok(())
}

// ─── Group pass ─────────────────────────────────────────────────────────────

/// Group pass: thread the accumulated name list through each declared group
/// and check the quota, name uniqueness, and the name and description
/// fields, in declaration order.
pub fn validate_ip_acgs(
    work_instruction: &WorkInstruction,
    limits: &Limits,
) -> Result<(), Violation> {
    debug!(
        acgs = work_instruction.ip_acgs.len(),
        "validating IP ACG properties"
    );

    let mut names: Vec<String> = Vec::with_capacity(work_instruction.ip_acgs.len());
    for acg in &work_instruction.ip_acgs {
        names.push(acg.name.clone());
        check_acg_quota(&names, limits)?;
        check_acg_name_unique(&names)?;
        check_acg_name(&acg.name, limits)?;
        check_acg_desc(acg, limits)?;
    }

    Ok(())
}

fn check_acg_quota(names: &[String], limits: &Limits) -> Result<(), Violation> {
    if names.len() > limits.acgs_per_directory_max {
        return Err(Violation::AcgQuotaExceeded {
            count: names.len(),
            max: limits.acgs_per_directory_max,
        });
    }
    Ok(())
}

fn check_acg_name_unique(names: &[String]) -> Result<(), Violation> {
    let duplicates = duplicates_in(names);
    if !duplicates.is_empty() {
        return Err(Violation::AcgNameDuplicate { duplicates });
    }
    Ok(())
}

fn check_acg_name(name: &str, limits: &Limits) -> Result<(), Violation> {
    if name.is_empty() {
        return Err(Violation::AcgNameEmpty);
    }
    let length = name.chars().count();
    if length > limits.acg_name_length_max {
        return Err(Violation::AcgNameTooLong {
            name: name.to_string(),
            length,
            max: limits.acg_name_length_max,
        });
    }
    Ok(())
}

fn check_acg_desc(acg: &IpAcg, limits: &Limits) -> Result<(), Violation> {
    if acg.desc.is_empty() {
        return Err(Violation::AcgDescEmpty {
            acg: acg.name.clone(),
        });
    }
    let length = acg.desc.chars().count();
    if length > limits.rule_desc_length_max {
        return Err(Violation::AcgDescTooLong {
            acg: acg.name.clone(),
            length,
            max: limits.rule_desc_length_max,
        });
    }
    Ok(())
}

// ─── Duplicate detection ────────────────────────────────────────────────────

/// Values occurring more than once, in first-occurrence order. Multiplicity
/// is counted exactly; a value listed twice is reported once.
fn duplicates_in(values: &[String]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }

    let mut duplicates = Vec::new();
    for value in values {
        if counts.get(value.as_str()).is_some_and(|&n| n > 1) && !duplicates.contains(value) {
            duplicates.push(value.clone());
        }
    }
    duplicates
}
