//! Operator-facing rendering of directories and IP ACGs.
//!
//! Plain aligned text tables; the routes pass the result to the logger in
//! one piece so a report is never interleaved with other output.

use crate::types::{Directory, IpAcg, Rule};

/// Render directories as one table, a row per directory.
pub fn render_directories(directories: &[Directory]) -> String {
    if directories.is_empty() {
        return "(No directories found)\n".to_string();
    }

    let header = ["id", "name", "ip acgs associated", "type", "state"];
    let rows: Vec<[String; 5]> = directories
        .iter()
        .map(|d| {
            [
                d.id.clone(),
                d.name.clone(),
                d.ip_acg_ids
                    .as_deref()
                    .filter(|ids| !ids.is_empty())
                    .map(|ids| ids.join(", "))
                    .unwrap_or_else(|| "-".to_string()),
                d.kind.clone().unwrap_or_else(|| "-".to_string()),
                d.state.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    render_table(&header, &rows)
}

/// Render groups block-wise: a one-row header table per group, then its
/// rules sorted by address, indented underneath.
pub fn render_ip_acgs(ip_acgs: &[IpAcg]) -> String {
    if ip_acgs.is_empty() {
        return "(No IP ACGs found)\n".to_string();
    }

    let mut out = String::new();
    for (i, acg) in ip_acgs.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("IP ACG {}\n", i + 1));

        let header = ["id", "name", "description", "origin"];
        let row = [[
            acg.id.clone().unwrap_or_else(|| "-".to_string()),
            acg.name.clone(),
            acg.desc.clone(),
            acg.origin.clone().unwrap_or_else(|| "-".to_string()),
        ]];
        out.push_str(&render_table(&header, &row));

        let rule_rows: Vec<[String; 2]> = sorted_rules(acg)
            .iter()
            .map(|r| [r.ip.clone(), r.desc.clone()])
            .collect();
        for line in render_table(&["rule", "description"], &rule_rows).lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Rules sorted by address. Shared with the provider layer so requests and
/// reports show rules in the same order.
pub fn sorted_rules(acg: &IpAcg) -> Vec<Rule> {
    let mut rules = acg.rules.clone();
    rules.sort_by(|a, b| a.ip.cmp(&b.ip));
    rules
}

fn render_table<const N: usize>(header: &[&str; N], rows: &[[String; N]]) -> String {
    let mut widths = header.map(|h| h.chars().count());
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &widths, header.iter().copied());

    let separators = widths.map(|w| "-".repeat(w));
    push_row(&mut out, &widths, separators.iter().map(String::as_str));

    for row in rows {
        push_row(&mut out, &widths, row.iter().map(String::as_str));
    }
    out
}

fn push_row<'a>(out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    let mut line = String::new();
    for (i, (cell, width)) in cells.zip(widths.iter()).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(&format!("{:<width$}", cell, width = width));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
