#![no_main]

use acgctl::report::{render_directories, render_ip_acgs};
use acgctl::types::{Directory, IpAcg, Rule};
use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;

fn arbitrary_directories(u: &mut Unstructured<'_>) -> arbitrary::Result<Vec<Directory>> {
    let len = u.int_in_range(0..=4)?;
    let mut directories = Vec::with_capacity(len);
    for _ in 0..len {
        directories.push(Directory {
            id: String::arbitrary(u)?,
            name: String::arbitrary(u)?,
            ip_acg_ids: Option::<Vec<String>>::arbitrary(u)?,
            kind: Option::<String>::arbitrary(u)?,
            state: Option::<String>::arbitrary(u)?,
        });
    }
    Ok(directories)
}

fn arbitrary_groups(u: &mut Unstructured<'_>) -> arbitrary::Result<Vec<IpAcg>> {
    let len = u.int_in_range(0..=4)?;
    let mut groups = Vec::with_capacity(len);
    for _ in 0..len {
        let rules = u.int_in_range(0..=4)?;
        groups.push(IpAcg {
            name: String::arbitrary(u)?,
            desc: String::arbitrary(u)?,
            rules: (0..rules)
                .map(|_| {
                    Ok(Rule {
                        ip: String::arbitrary(u)?,
                        desc: String::arbitrary(u)?,
                    })
                })
                .collect::<arbitrary::Result<_>>()?,
            id: Option::<String>::arbitrary(u)?,
            origin: Option::<String>::arbitrary(u)?,
        });
    }
    Ok(groups)
}

// Table layout must never panic, whatever the provider returns.
fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    if let Ok(directories) = arbitrary_directories(&mut u) {
        let _ = render_directories(&directories);
    }
    if let Ok(groups) = arbitrary_groups(&mut u) {
        let _ = render_ip_acgs(&groups);
    }
});
