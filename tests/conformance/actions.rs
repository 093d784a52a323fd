use acgctl::actions;
use acgctl::error::{Error, Violation};
use acgctl::provider::memory::MemoryProvider;
use acgctl::types::DirectoryRef;

use super::common::{self, acg, inventory_acg, rule};

// ─── Common route ───────────────────────────────────────────────────────────

#[tokio::test]
async fn common_route_fetches_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.yaml");
    std::fs::write(&path, common::settings_yaml()).unwrap();

    let provider = MemoryProvider::new(
        vec![common::directory("d-1", "corp.example.com")],
        vec![inventory_acg("acg-office", "wsipg-1")],
    );

    let (settings, inventory) = actions::common_route(&provider, &path).await.unwrap();

    assert_eq!(inventory.directories.len(), 1);
    assert_eq!(inventory.ip_acgs.len(), 1);
    assert_eq!(settings.work_instruction.ip_acgs.len(), 2);
}

#[tokio::test]
async fn common_route_rejects_invalid_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.yaml");
    let bad = common::settings_yaml().replace("192.0.2.10", "999.0.2.10");
    std::fs::write(&path, bad).unwrap();

    let provider = MemoryProvider::new(vec![], vec![]);
    let err = actions::common_route(&provider, &path).await.unwrap_err();
    match err {
        Error::Violation(v) => assert_eq!(v.code(), "ip_format"),
        other => panic!("expected a violation, got {:?}", other),
    }
}

#[tokio::test]
async fn fetch_inventory_sorts_groups_by_name() {
    let provider = MemoryProvider::new(
        vec![],
        vec![
            inventory_acg("zeta", "wsipg-z"),
            inventory_acg("alpha", "wsipg-a"),
        ],
    );

    let inventory = actions::fetch_inventory(&provider).await.unwrap();
    let names: Vec<&str> = inventory.ip_acgs.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, &["alpha", "zeta"]);
}

// ─── Create ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_creates_and_associates_declared_groups() {
    let provider = MemoryProvider::new(vec![common::directory("d-1", "corp.example.com")], vec![]);
    let inventory = actions::fetch_inventory(&provider).await.unwrap();

    let mut settings = common::settings(vec![acg("office", vec![rule("10.0.0.1/32", "ok")])]);
    settings
        .work_instruction
        .tags
        .insert("Environment".to_string(), "test".to_string());

    actions::create(&provider, &settings, &inventory, false)
        .await
        .unwrap();

    let created = provider.ip_acgs();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].name, "office");
    let id = created[0].id.clone().expect("created group carries an id");

    let directories = provider.directories();
    assert_eq!(
        directories[0].ip_acg_ids.as_deref(),
        Some(std::slice::from_ref(&id))
    );

    let tags = provider.tags_of(&id).expect("tags stored with the group");
    assert_eq!(tags.get("Environment").map(String::as_str), Some("test"));
}

#[tokio::test]
async fn create_targets_only_the_specified_directories() {
    let provider = MemoryProvider::new(
        vec![
            common::directory("d-target", "corp.example.com"),
            common::directory("d-other", "test.example.com"),
        ],
        vec![],
    );
    let inventory = actions::fetch_inventory(&provider).await.unwrap();

    let mut settings = common::settings(vec![acg("office", vec![rule("10.0.0.1/32", "ok")])]);
    settings.work_instruction.directories = vec![DirectoryRef {
        id: Some("d-target".to_string()),
        name: Some("corp.example.com".to_string()),
    }];

    actions::create(&provider, &settings, &inventory, false)
        .await
        .unwrap();

    let directories = provider.directories();
    let target = directories.iter().find(|d| d.id == "d-target").unwrap();
    let other = directories.iter().find(|d| d.id == "d-other").unwrap();
    assert!(target.ip_acg_ids.as_deref().is_some_and(|ids| ids.len() == 1));
    assert!(other.ip_acg_ids.is_none(), "unspecified directory was touched");
}

#[tokio::test]
async fn create_skips_groups_that_already_exist() {
    let provider = MemoryProvider::new(
        vec![common::directory("d-1", "corp.example.com")],
        vec![inventory_acg("office", "wsipg-1")],
    );
    let inventory = actions::fetch_inventory(&provider).await.unwrap();

    let settings = common::settings(vec![acg("office", vec![rule("10.0.0.1/32", "ok")])]);
    actions::create(&provider, &settings, &inventory, false)
        .await
        .expect("an existing group is skipped, not an error");

    assert_eq!(provider.ip_acgs().len(), 1);
    // The skipped group is not associated either.
    assert!(provider.directories()[0].ip_acg_ids.is_none());
}

#[tokio::test]
async fn create_dryrun_only_reports() {
    let provider = MemoryProvider::new(vec![common::directory("d-1", "corp.example.com")], vec![]);
    let inventory = actions::fetch_inventory(&provider).await.unwrap();

    let settings = common::settings(vec![acg("office", vec![rule("10.0.0.1/32", "ok")])]);
    actions::create(&provider, &settings, &inventory, true)
        .await
        .unwrap();

    assert!(provider.ip_acgs().is_empty());
}

// ─── Update ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_replaces_rules_of_matched_groups() {
    let provider = MemoryProvider::new(
        vec![common::directory("d-1", "corp.example.com")],
        vec![inventory_acg("office", "wsipg-1")],
    );
    let inventory = actions::fetch_inventory(&provider).await.unwrap();

    let mut settings = common::settings(vec![acg("office", vec![rule("10.0.0.7/32", "new rule")])]);
    actions::update(&provider, &mut settings, &inventory, false)
        .await
        .unwrap();

    let stored = provider.ip_acgs();
    assert_eq!(stored[0].rules, vec![rule("10.0.0.7/32", "new rule")]);
    // The matcher wrote the id back into the declared group.
    assert_eq!(
        settings.work_instruction.ip_acgs[0].id.as_deref(),
        Some("wsipg-1")
    );
}

#[tokio::test]
async fn update_skips_declared_groups_without_a_match() {
    let provider = MemoryProvider::new(vec![], vec![inventory_acg("office", "wsipg-1")]);
    let inventory = actions::fetch_inventory(&provider).await.unwrap();

    let mut settings = common::settings(vec![
        acg("office", vec![rule("10.0.0.7/32", "new rule")]),
        acg("staging", vec![rule("10.0.0.8/32", "unmatched")]),
    ]);

    actions::update(&provider, &mut settings, &inventory, false)
        .await
        .expect("an unmatched declared group is skipped, not an error");

    // Only the matched group exists; update never creates.
    assert_eq!(provider.ip_acgs().len(), 1);
    assert_eq!(settings.work_instruction.ip_acgs[1].id, None);
}

#[tokio::test]
async fn update_requires_a_non_empty_inventory() {
    let provider = MemoryProvider::new(vec![], vec![]);
    let inventory = actions::fetch_inventory(&provider).await.unwrap();

    let mut settings = common::settings(vec![acg("office", vec![rule("10.0.0.7/32", "ok")])]);
    let err = actions::update(&provider, &mut settings, &inventory, false)
        .await
        .unwrap_err();

    match err {
        Error::Violation(v) => assert_eq!(v, Violation::InventoryEmpty),
        other => panic!("expected a violation, got {:?}", other),
    }
}

#[tokio::test]
async fn update_dryrun_matches_but_does_not_write() {
    let provider = MemoryProvider::new(vec![], vec![inventory_acg("office", "wsipg-1")]);
    let inventory = actions::fetch_inventory(&provider).await.unwrap();
    let before = provider.ip_acgs();

    let mut settings = common::settings(vec![acg("office", vec![rule("10.0.0.7/32", "new rule")])]);
    actions::update(&provider, &mut settings, &inventory, true)
        .await
        .unwrap();

    assert_eq!(provider.ip_acgs(), before);
    // Matching still happened, so a later non-dryrun run shows its targets.
    assert_eq!(
        settings.work_instruction.ip_acgs[0].id.as_deref(),
        Some("wsipg-1")
    );
}

// ─── Delete ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_disassociates_then_deletes() {
    let mut dir = common::directory("d-1", "corp.example.com");
    dir.ip_acg_ids = Some(vec!["wsipg-1".to_string()]);
    let provider = MemoryProvider::new(vec![dir], vec![inventory_acg("office", "wsipg-1")]);
    let inventory = actions::fetch_inventory(&provider).await.unwrap();

    actions::delete(&provider, &inventory, &["wsipg-1".to_string()], false)
        .await
        .unwrap();

    assert!(provider.ip_acgs().is_empty());
    assert_eq!(
        provider.directories()[0].ip_acg_ids.as_ref().map(Vec::len),
        Some(0)
    );
}

#[tokio::test]
async fn delete_handles_unassociated_groups() {
    let provider = MemoryProvider::new(
        vec![common::directory("d-1", "corp.example.com")],
        vec![inventory_acg("office", "wsipg-1")],
    );
    let inventory = actions::fetch_inventory(&provider).await.unwrap();

    actions::delete(&provider, &inventory, &["wsipg-1".to_string()], false)
        .await
        .unwrap();

    assert!(provider.ip_acgs().is_empty());
}

#[tokio::test]
async fn delete_requires_at_least_one_id() {
    let provider = MemoryProvider::new(vec![], vec![]);
    let inventory = actions::fetch_inventory(&provider).await.unwrap();

    let err = actions::delete(&provider, &inventory, &[], false)
        .await
        .unwrap_err();

    match err {
        Error::Violation(v) => assert_eq!(v, Violation::DeleteIdsMissing),
        other => panic!("expected a violation, got {:?}", other),
    }
}

#[tokio::test]
async fn delete_dryrun_only_reports() {
    let provider = MemoryProvider::new(vec![], vec![inventory_acg("office", "wsipg-1")]);
    let inventory = actions::fetch_inventory(&provider).await.unwrap();

    actions::delete(&provider, &inventory, &["wsipg-1".to_string()], true)
        .await
        .unwrap();

    assert_eq!(provider.ip_acgs().len(), 1);
}
