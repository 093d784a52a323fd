//! Provider contract for the directory service hosting the IP ACGs.
//!
//! The routes only ever talk to [`AcgProvider`]; the AWS WorkSpaces binding
//! lives behind the `aws` feature and [`memory::MemoryProvider`] backs the
//! tests. Retries, rate limiting and idempotent replay are left to the
//! backend or its SDK.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Directory, IpAcg, Rule};

pub mod memory;

#[cfg(feature = "aws")]
pub mod aws;

/// Fault classes reported by a backend. `Api` is the catch-all for provider
/// error codes without a dedicated variant; it keeps the full wire detail so
/// callers can log it.
#[derive(Clone, Debug, Error)]
pub enum ProviderError {
    #[error("invalid parameter in [{op}]: {message}")]
    InvalidParameter { op: String, message: String },

    #[error("resource not found in [{op}]: {message}")]
    NotFound { op: String, message: String },

    #[error("IP ACG [{name}] already exists")]
    AlreadyExists { name: String },

    #[error("resource limit exceeded in [{op}]: {message}")]
    LimitExceeded { op: String, message: String },

    #[error("resource in invalid state in [{op}]: {message}")]
    InvalidState { op: String, message: String },

    #[error("access denied in [{op}]: {message}; verify the configured IAM role")]
    AccessDenied { op: String, message: String },

    #[error("resource still associated in [{op}]: {message}")]
    Associated { op: String, message: String },

    #[error("operation not supported in [{op}]: {message}")]
    Unsupported { op: String, message: String },

    #[error("[{op}] failed with [{code}]: {message}")]
    Api { op: String, code: String, message: String },
}

/// The calls the routes need from a directory service backend.
///
/// Implementations must be safe to share across tasks. All mutating calls
/// take provider-assigned ids except [`create_ip_acg`], which works from the
/// declared group and returns the new id.
///
/// [`create_ip_acg`]: AcgProvider::create_ip_acg
#[async_trait]
pub trait AcgProvider: Send + Sync {
    /// Directories registered for WorkSpaces, with their associated group ids.
    async fn describe_directories(&self) -> Result<Vec<Directory>, ProviderError>;

    /// All IP ACGs known to the provider. Order is unspecified.
    async fn describe_ip_acgs(&self) -> Result<Vec<IpAcg>, ProviderError>;

    /// Create a group with the declared rules and the given tags, returning
    /// the provider-assigned id.
    async fn create_ip_acg(
        &self,
        acg: &IpAcg,
        tags: &BTreeMap<String, String>,
    ) -> Result<String, ProviderError>;

    /// Replace the rule set of an existing group.
    async fn update_rules(&self, acg_id: &str, rules: &[Rule]) -> Result<(), ProviderError>;

    async fn associate(&self, directory_id: &str, acg_ids: &[String])
    -> Result<(), ProviderError>;

    async fn disassociate(
        &self,
        directory_id: &str,
        acg_ids: &[String],
    ) -> Result<(), ProviderError>;

    /// Delete a group. The provider rejects this while the group is still
    /// associated with any directory.
    async fn delete_ip_acg(&self, acg_id: &str) -> Result<(), ProviderError>;
}
