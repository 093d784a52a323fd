//! In-memory backend for tests and local experiments.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{AcgProvider, ProviderError};
use crate::types::{Directory, IpAcg, Rule};

#[derive(Debug, Default)]
struct State {
    directories: Vec<Directory>,
    ip_acgs: Vec<IpAcg>,
    tags: BTreeMap<String, BTreeMap<String, String>>,
    next_id: u64,
}

/// Provider backed by process memory.
///
/// Mirrors the service behavior the routes depend on: create rejects a
/// duplicate group name, delete rejects a group still associated with any
/// directory, ids look like the provider's `wsipg-` ids.
#[derive(Debug)]
pub struct MemoryProvider {
    state: Mutex<State>,
}

impl MemoryProvider {
    pub fn new(directories: Vec<Directory>, ip_acgs: Vec<IpAcg>) -> Self {
        MemoryProvider {
            state: Mutex::new(State {
                directories,
                ip_acgs,
                tags: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("provider state lock poisoned")
    }

    /// Snapshot of the stored groups, for assertions.
    pub fn ip_acgs(&self) -> Vec<IpAcg> {
        self.state().ip_acgs.clone()
    }

    /// Snapshot of the stored directories, for assertions.
    pub fn directories(&self) -> Vec<Directory> {
        self.state().directories.clone()
    }

    /// Tags recorded when the given group was created.
    pub fn tags_of(&self, acg_id: &str) -> Option<BTreeMap<String, String>> {
        self.state().tags.get(acg_id).cloned()
    }
}

#[async_trait]
impl AcgProvider for MemoryProvider {
    async fn describe_directories(&self) -> Result<Vec<Directory>, ProviderError> {
        Ok(self.state().directories.clone())
    }

    async fn describe_ip_acgs(&self) -> Result<Vec<IpAcg>, ProviderError> {
        Ok(self.state().ip_acgs.clone())
    }

    async fn create_ip_acg(
        &self,
        acg: &IpAcg,
        tags: &BTreeMap<String, String>,
    ) -> Result<String, ProviderError> {
        let mut state = self.state();

        if state.ip_acgs.iter().any(|existing| existing.name == acg.name) {
            return Err(ProviderError::AlreadyExists {
                name: acg.name.clone(),
            });
        }

        let id = format!("wsipg-{:08}", state.next_id);
        state.next_id += 1;

        let mut created = acg.clone();
        created.id = Some(id.clone());
        state.ip_acgs.push(created);
        state.tags.insert(id.clone(), tags.clone());

        Ok(id)
    }

    async fn update_rules(&self, acg_id: &str, rules: &[Rule]) -> Result<(), ProviderError> {
        let mut state = self.state();

        let Some(acg) = state
            .ip_acgs
            .iter_mut()
            .find(|acg| acg.id.as_deref() == Some(acg_id))
        else {
            return Err(ProviderError::NotFound {
                op: "update_rules_of_ip_group".to_string(),
                message: format!("no IP ACG with id [{}]", acg_id),
            });
        };
        acg.rules = rules.to_vec();

        Ok(())
    }

    async fn associate(
        &self,
        directory_id: &str,
        acg_ids: &[String],
    ) -> Result<(), ProviderError> {
        let mut state = self.state();

        for id in acg_ids {
            if !state
                .ip_acgs
                .iter()
                .any(|acg| acg.id.as_deref() == Some(id.as_str()))
            {
                return Err(ProviderError::NotFound {
                    op: "associate_ip_groups".to_string(),
                    message: format!("no IP ACG with id [{}]", id),
                });
            }
        }

        let Some(directory) = state.directories.iter_mut().find(|d| d.id == directory_id)
        else {
            return Err(ProviderError::NotFound {
                op: "associate_ip_groups".to_string(),
                message: format!("no directory with id [{}]", directory_id),
            });
        };

        let ids = directory.ip_acg_ids.get_or_insert_with(Vec::new);
        for id in acg_ids {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }

        Ok(())
    }

    async fn disassociate(
        &self,
        directory_id: &str,
        acg_ids: &[String],
    ) -> Result<(), ProviderError> {
        let mut state = self.state();

        let Some(directory) = state.directories.iter_mut().find(|d| d.id == directory_id)
        else {
            return Err(ProviderError::NotFound {
                op: "disassociate_ip_groups".to_string(),
                message: format!("no directory with id [{}]", directory_id),
            });
        };

        if let Some(ids) = directory.ip_acg_ids.as_mut() {
            ids.retain(|id| !acg_ids.contains(id));
        }

        Ok(())
    }

    async fn delete_ip_acg(&self, acg_id: &str) -> Result<(), ProviderError> {
        let mut state = self.state();

        let associated = state.directories.iter().any(|d| {
            d.ip_acg_ids
                .as_deref()
                .is_some_and(|ids| ids.iter().any(|id| id == acg_id))
        });
        if associated {
            return Err(ProviderError::Associated {
                op: "delete_ip_group".to_string(),
                message: format!("IP ACG [{}] is still associated with a directory", acg_id),
            });
        }

        let before = state.ip_acgs.len();
        state.ip_acgs.retain(|acg| acg.id.as_deref() != Some(acg_id));
        if state.ip_acgs.len() == before {
            return Err(ProviderError::NotFound {
                op: "delete_ip_group".to_string(),
                message: format!("no IP ACG with id [{}]", acg_id),
            });
        }
        state.tags.remove(acg_id);

        Ok(())
    }
}
