use acgctl::error::Violation;
use acgctl::reconcile::match_ip_acgs;

use super::common::{self, acg, inventory_acg, rule};

// ─── Matching ───────────────────────────────────────────────────────────────

#[test]
fn assigns_ids_to_declared_groups_by_name() {
    let inventory = common::inventory(
        vec![],
        vec![inventory_acg("a", "wsipg-a1"), inventory_acg("b", "wsipg-b2")],
    );
    let mut wi = common::work_instruction(vec![
        acg("a", vec![rule("10.0.0.1", "ok")]),
        acg("b", vec![rule("10.0.0.2", "ok")]),
        acg("c", vec![rule("10.0.0.3", "ok")]),
    ]);

    match_ip_acgs(&inventory, &mut wi).expect("superset of inventory names should match");

    assert_eq!(wi.ip_acgs[0].id.as_deref(), Some("wsipg-a1"));
    assert_eq!(wi.ip_acgs[1].id.as_deref(), Some("wsipg-b2"));
    // A declared group the provider does not know yet keeps no id; the
    // create route owns bringing it into existence.
    assert_eq!(wi.ip_acgs[2].id, None);
}

#[test]
fn matching_is_case_sensitive() {
    let inventory = common::inventory(vec![], vec![inventory_acg("Office", "wsipg-1")]);
    let mut wi = common::work_instruction(vec![acg("office", vec![rule("10.0.0.1", "ok")])]);

    let err = match_ip_acgs(&inventory, &mut wi).unwrap_err();
    assert_eq!(
        err,
        Violation::InventoryUnmatched {
            matched: 0,
            inventory: 1
        }
    );
    assert_eq!(wi.ip_acgs[0].id, None);
}

#[test]
fn every_inventory_entry_must_be_matched() {
    let inventory = common::inventory(
        vec![],
        vec![inventory_acg("a", "wsipg-a1"), inventory_acg("b", "wsipg-b2")],
    );
    let mut wi = common::work_instruction(vec![acg("a", vec![rule("10.0.0.1", "ok")])]);

    let err = match_ip_acgs(&inventory, &mut wi).unwrap_err();
    assert_eq!(
        err,
        Violation::InventoryUnmatched {
            matched: 1,
            inventory: 2
        }
    );
}

#[test]
fn an_empty_inventory_matches_trivially() {
    // The update route rejects an empty inventory before matching; the
    // matcher itself has nothing to orphan and accepts.
    let inventory = common::inventory(vec![], vec![]);
    let mut wi = common::work_instruction(vec![acg("a", vec![rule("10.0.0.1", "ok")])]);

    match_ip_acgs(&inventory, &mut wi).unwrap();
    assert_eq!(wi.ip_acgs[0].id, None);
}

// ─── Index construction ─────────────────────────────────────────────────────

#[test]
fn rejects_inventory_name_collisions_up_front() {
    let inventory = common::inventory(
        vec![],
        vec![inventory_acg("a", "wsipg-a1"), inventory_acg("a", "wsipg-a2")],
    );
    let mut wi = common::work_instruction(vec![acg("a", vec![rule("10.0.0.1", "ok")])]);

    let err = match_ip_acgs(&inventory, &mut wi).unwrap_err();
    assert_eq!(
        err,
        Violation::InventoryNameCollision {
            name: "a".to_string()
        }
    );
    // Nothing is assigned when the index cannot be built.
    assert_eq!(wi.ip_acgs[0].id, None);
}

#[test]
fn an_inventory_entry_without_an_id_cannot_be_matched() {
    let mut entry = inventory_acg("a", "unused");
    entry.id = None;
    let inventory = common::inventory(vec![], vec![entry]);
    let mut wi = common::work_instruction(vec![acg("a", vec![rule("10.0.0.1", "ok")])]);

    let err = match_ip_acgs(&inventory, &mut wi).unwrap_err();
    assert_eq!(
        err,
        Violation::InventoryUnmatched {
            matched: 0,
            inventory: 1
        }
    );
}

#[test]
fn rematching_is_idempotent() {
    let inventory = common::inventory(vec![], vec![inventory_acg("a", "wsipg-a1")]);
    let mut wi = common::work_instruction(vec![acg("a", vec![rule("10.0.0.1", "ok")])]);

    match_ip_acgs(&inventory, &mut wi).unwrap();
    match_ip_acgs(&inventory, &mut wi).unwrap();
    assert_eq!(wi.ip_acgs[0].id.as_deref(), Some("wsipg-a1"));
}
