#![no_main]

use acgctl::types::{IpAcg, Limits, Rule};
use acgctl::validate::validate_rules;
use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;

/// Generate an arbitrary declared group from fuzzer bytes.
fn arbitrary_group(u: &mut Unstructured<'_>) -> arbitrary::Result<IpAcg> {
    let len = u.int_in_range(0..=8)?;
    let mut rules = Vec::with_capacity(len);
    for _ in 0..len {
        rules.push(Rule {
            ip: String::arbitrary(u)?,
            desc: String::arbitrary(u)?,
        });
    }
    Ok(IpAcg {
        name: String::arbitrary(u)?,
        desc: String::arbitrary(u)?,
        rules,
        id: None,
        origin: None,
    })
}

fn arbitrary_limits(u: &mut Unstructured<'_>) -> arbitrary::Result<Limits> {
    Ok(Limits {
        invalid_rules: vec![],
        rule_count_max: u.int_in_range(0..=16)?,
        rule_desc_length_max: u.int_in_range(0..=128)?,
        prefix_default: u.int_in_range(0..=64)?,
        prefix_min: u.int_in_range(0..=64)?,
        acg_name_length_max: 50,
        acgs_per_directory_max: 25,
    })
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    let mut acg = match arbitrary_group(&mut u) {
        Ok(a) => a,
        Err(_) => return,
    };
    let limits = match arbitrary_limits(&mut u) {
        Ok(l) => l,
        Err(_) => return,
    };

    if validate_rules(&mut acg, &limits).is_ok() {
        // A passing group holds normalized addresses only.
        for rule in &acg.rules {
            assert!(!rule.ip.contains(' '));
            assert!(!rule.ip.contains('\n'));
        }
    }
});
