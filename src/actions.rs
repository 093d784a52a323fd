//! Action routes.
//!
//! Every route starts from [`common_route`]: fetch the inventory, report it,
//! then load and validate `settings.yaml`. The mutating routes take the
//! validated [`Settings`] and the [`Inventory`] snapshot from there, so a
//! run never mutates anything it has not just validated against.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::load_settings;
use crate::error::{Error, Violation};
use crate::provider::{AcgProvider, ProviderError};
use crate::reconcile::match_ip_acgs;
use crate::report;
use crate::types::{Inventory, Settings};
use crate::validate::validate_work_instruction;

/// Fetch the current directories and IP ACGs from the provider.
///
/// IP ACGs are sorted by name so reports and matching see a stable order
/// regardless of how the provider pages its responses.
pub async fn fetch_inventory(provider: &dyn AcgProvider) -> Result<Inventory, Error> {
    let directories = provider.describe_directories().await?;
    let mut ip_acgs = provider.describe_ip_acgs().await?;
    ip_acgs.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Inventory {
        directories,
        ip_acgs,
    })
}

/// Shared prologue of all routes.
///
/// Whatever action is picked, the inventory and the settings are always
/// retrieved, reported and validated first.
pub async fn common_route(
    provider: &dyn AcgProvider,
    settings_path: &Path,
) -> Result<(Settings, Inventory), Error> {
    debug!("run common route");

    let inventory = fetch_inventory(provider).await?;
    info!(
        "Current directories:\n{}",
        report::render_directories(&inventory.directories)
    );
    info!(
        "Current IP ACGs:\n{}",
        report::render_ip_acgs(&inventory.ip_acgs)
    );

    let mut settings = load_settings(settings_path)?;
    validate_work_instruction(&mut settings.work_instruction, &settings.limits)?;

    Ok((settings, inventory))
}

/// Display the current situation. The common route has already reported the
/// inventory and validated the settings; nothing else to do.
pub fn status() {
    info!("Completed display of status.");
}

/// Create the declared IP ACGs and associate each created group with the
/// target directories.
///
/// Target directories are the ones named in the work instruction when fully
/// specified, otherwise every directory in the inventory. A group that
/// already exists in the provider is skipped with a warning, not treated as
/// a failure.
pub async fn create(
    provider: &dyn AcgProvider,
    settings: &Settings,
    inventory: &Inventory,
    dryrun: bool,
) -> Result<(), Error> {
    debug!("action: create IP ACGs");

    let work_instruction = &settings.work_instruction;
    info!(
        "Declared IP ACGs:\n{}",
        report::render_ip_acgs(&work_instruction.ip_acgs)
    );

    if dryrun {
        info!("Completed action: create IP ACGs (dryrun).");
        return Ok(());
    }

    let directory_ids: Vec<String> = if work_instruction.directories_specified() {
        work_instruction
            .directories
            .iter()
            .filter_map(|d| d.id.clone())
            .collect()
    } else {
        inventory.directories.iter().map(|d| d.id.clone()).collect()
    };

    for ip_acg in &work_instruction.ip_acgs {
        match provider.create_ip_acg(ip_acg, &work_instruction.tags).await {
            Ok(id) => {
                info!(acg = %ip_acg.name, id = %id, "created IP ACG");
                for directory_id in &directory_ids {
                    provider
                        .associate(directory_id, std::slice::from_ref(&id))
                        .await?;
                    info!(directory = %directory_id, id = %id, "associated IP ACG");
                }
            }
            Err(ProviderError::AlreadyExists { name }) => {
                warn!(acg = %name, "IP ACG already exists in the provider, skipping create");
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!("Completed action: create IP ACGs.");
    Ok(())
}

/// Replace the rules of existing IP ACGs with the declared rules.
///
/// Requires a non-empty inventory and a successful name match; a declared
/// group without an inventory counterpart is skipped with a warning since
/// only the create route may bring new groups into existence.
pub async fn update(
    provider: &dyn AcgProvider,
    settings: &mut Settings,
    inventory: &Inventory,
    dryrun: bool,
) -> Result<(), Error> {
    debug!("action: update IP ACGs");

    if inventory.ip_acgs.is_empty() {
        return Err(Violation::InventoryEmpty.into());
    }

    let work_instruction = &mut settings.work_instruction;
    match_ip_acgs(inventory, work_instruction)?;
    info!(
        "Matched IP ACGs:\n{}",
        report::render_ip_acgs(&work_instruction.ip_acgs)
    );

    if dryrun {
        info!("Completed action: update IP ACGs (dryrun).");
        return Ok(());
    }

    for ip_acg in &work_instruction.ip_acgs {
        match &ip_acg.id {
            Some(id) => {
                provider.update_rules(id, &ip_acg.rules).await?;
                info!(acg = %ip_acg.name, id = %id, "updated rules of IP ACG");
            }
            None => {
                warn!(
                    acg = %ip_acg.name,
                    "not found in the inventory, skipping; run the create route to create it"
                );
            }
        }
    }

    info!("Completed action: update IP ACGs.");
    Ok(())
}

/// Delete the IP ACGs with the given ids.
///
/// Each group is first disassociated from every inventory directory that
/// still references it, then deleted once. This route takes its targets from
/// the command line, not from `settings.yaml`.
pub async fn delete(
    provider: &dyn AcgProvider,
    inventory: &Inventory,
    acg_ids: &[String],
    dryrun: bool,
) -> Result<(), Error> {
    debug!(ids = ?acg_ids, "action: delete IP ACGs");

    if acg_ids.is_empty() {
        return Err(Violation::DeleteIdsMissing.into());
    }

    if dryrun {
        info!("Completed action: delete IP ACGs (dryrun).");
        return Ok(());
    }

    for acg_id in acg_ids {
        for directory in &inventory.directories {
            let associated = directory
                .ip_acg_ids
                .as_deref()
                .is_some_and(|ids| ids.iter().any(|id| id == acg_id));

            if associated {
                provider
                    .disassociate(&directory.id, std::slice::from_ref(acg_id))
                    .await?;
                info!(directory = %directory.id, id = %acg_id, "disassociated IP ACG");
            }
        }

        provider.delete_ip_acg(acg_id).await?;
        info!(id = %acg_id, "deleted IP ACG");
    }

    info!("Completed action: delete IP ACGs.");
    Ok(())
}
