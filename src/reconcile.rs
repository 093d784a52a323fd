//! Inventory matching: resolve declared group names to provider ids.
//!
//! settings.yaml never carries provider ids, so the update route has to look
//! them up by name. Matching is two-pass: build a name-to-id index from the
//! inventory, then assign ids to the declared groups by exact lookup. Names
//! compare case-sensitively and without normalization.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::Violation;
use crate::types::{Inventory, WorkInstruction};

/// Copy inventory ids onto the declared groups whose name matches exactly.
///
/// Succeeds only when every inventory group was matched by some declared
/// group; otherwise an entity already deployed in the provider would be
/// silently dropped from the update. The reverse direction is deliberately
/// not enforced: a declared group without a match keeps `id = None`, which
/// downstream mutating routes treat as "needs creation".
pub fn match_ip_acgs(
    inventory: &Inventory,
    work_instruction: &mut WorkInstruction,
) -> Result<(), Violation> {
    let index = build_name_index(inventory)?;

    let mut matched: BTreeSet<&str> = BTreeSet::new();
    for acg in &mut work_instruction.ip_acgs {
        if let Some((name, id)) = index.get_key_value(acg.name.as_str()) {
            debug!(acg = %acg.name, id = %id, "matched IP ACG by name");
            acg.id = Some(id.clone());
            matched.insert(name);
        }
    }

    if matched.len() != inventory.ip_acgs.len() {
        return Err(Violation::InventoryUnmatched {
            matched: matched.len(),
            inventory: inventory.ip_acgs.len(),
        });
    }

    Ok(())
}

/// First pass: index the inventory by group name. Name lookup is ambiguous
/// under duplicate inventory names, so a collision is rejected here instead
/// of letting the last entry win.
fn build_name_index(inventory: &Inventory) -> Result<BTreeMap<String, String>, Violation> {
    let mut index = BTreeMap::new();

    for acg in &inventory.ip_acgs {
        let Some(id) = acg.id.as_deref() else {
            // An inventory entry without an id can never be matched; the
            // count check in the caller reports it.
            continue;
        };
        if index.insert(acg.name.clone(), id.to_string()).is_some() {
            return Err(Violation::InventoryNameCollision {
                name: acg.name.clone(),
            });
        }
    }

    Ok(index)
}
