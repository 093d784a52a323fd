//! AWS WorkSpaces backend.
//!
//! Thin wrappers around the `aws-sdk-workspaces` calls the routes need.
//! Service error codes are mapped onto [`ProviderError`] variants; anything
//! without a dedicated variant keeps its code and message in
//! [`ProviderError::Api`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_workspaces::Client;
use aws_sdk_workspaces::error::ProvideErrorMetadata;
use aws_sdk_workspaces::types::{IpRuleItem, Tag};
use chrono::Utc;
use tracing::debug;

use super::{AcgProvider, ProviderError};
use crate::types::{Directory, IpAcg, Rule};

/// Provider backed by the AWS WorkSpaces API.
pub struct AwsProvider {
    client: Client,
}

impl AwsProvider {
    /// Resolve credentials and region from the environment, with an optional
    /// region override, and build the client. Credential problems surface on
    /// the first call, not here.
    pub async fn connect(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;

        AwsProvider {
            client: Client::new(&config),
        }
    }
}

#[async_trait]
impl AcgProvider for AwsProvider {
    async fn describe_directories(&self) -> Result<Vec<Directory>, ProviderError> {
        debug!("call [describe_workspace_directories]");
        let output = self
            .client
            .describe_workspace_directories()
            .send()
            .await
            .map_err(|e| classify("describe_workspace_directories", e.into_service_error()))?;

        let directories = output
            .directories()
            .iter()
            .map(|d| Directory {
                id: d.directory_id().unwrap_or_default().to_string(),
                name: d.directory_name().unwrap_or_default().to_string(),
                ip_acg_ids: match d.ip_group_ids() {
                    [] => None,
                    ids => Some(ids.to_vec()),
                },
                kind: d.directory_type().map(|t| t.as_str().to_string()),
                state: d.state().map(|s| s.as_str().to_string()),
            })
            .collect();

        Ok(directories)
    }

    async fn describe_ip_acgs(&self) -> Result<Vec<IpAcg>, ProviderError> {
        debug!("call [describe_ip_groups]");
        let output = self
            .client
            .describe_ip_groups()
            .send()
            .await
            .map_err(|e| classify("describe_ip_groups", e.into_service_error()))?;

        let ip_acgs = output
            .result()
            .iter()
            .map(|group| IpAcg {
                name: group.group_name().unwrap_or_default().to_string(),
                desc: group.group_desc().unwrap_or_default().to_string(),
                rules: group
                    .user_rules()
                    .iter()
                    .map(|rule| Rule {
                        ip: rule.ip_rule().unwrap_or_default().to_string(),
                        desc: rule.rule_desc().unwrap_or_default().to_string(),
                    })
                    .collect(),
                id: group.group_id().map(str::to_string),
                origin: None,
            })
            .collect();

        Ok(ip_acgs)
    }

    async fn create_ip_acg(
        &self,
        acg: &IpAcg,
        tags: &BTreeMap<String, String>,
    ) -> Result<String, ProviderError> {
        debug!(acg = %acg.name, "call [create_ip_group]");
        let tags = build_tags(&extend_tags(tags, acg))?;
        let rules = build_rules(&acg.rules);

        let output = self
            .client
            .create_ip_group()
            .group_name(acg.name.clone())
            .group_desc(acg.desc.clone())
            .set_user_rules(Some(rules))
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(|e| {
                let service = e.into_service_error();
                if service.is_resource_already_exists_exception() {
                    ProviderError::AlreadyExists {
                        name: acg.name.clone(),
                    }
                } else {
                    classify("create_ip_group", service)
                }
            })?;

        output
            .group_id()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Api {
                op: "create_ip_group".to_string(),
                code: "MissingGroupId".to_string(),
                message: "the response contained no group id".to_string(),
            })
    }

    async fn update_rules(&self, acg_id: &str, rules: &[Rule]) -> Result<(), ProviderError> {
        debug!(acg_id = %acg_id, "call [update_rules_of_ip_group]");
        self.client
            .update_rules_of_ip_group()
            .group_id(acg_id)
            .set_user_rules(Some(build_rules(rules)))
            .send()
            .await
            .map_err(|e| classify("update_rules_of_ip_group", e.into_service_error()))?;
        Ok(())
    }

    async fn associate(
        &self,
        directory_id: &str,
        acg_ids: &[String],
    ) -> Result<(), ProviderError> {
        debug!(directory_id = %directory_id, "call [associate_ip_groups]");
        self.client
            .associate_ip_groups()
            .directory_id(directory_id)
            .set_group_ids(Some(acg_ids.to_vec()))
            .send()
            .await
            .map_err(|e| classify("associate_ip_groups", e.into_service_error()))?;
        Ok(())
    }

    async fn disassociate(
        &self,
        directory_id: &str,
        acg_ids: &[String],
    ) -> Result<(), ProviderError> {
        debug!(directory_id = %directory_id, "call [disassociate_ip_groups]");
        self.client
            .disassociate_ip_groups()
            .directory_id(directory_id)
            .set_group_ids(Some(acg_ids.to_vec()))
            .send()
            .await
            .map_err(|e| classify("disassociate_ip_groups", e.into_service_error()))?;
        Ok(())
    }

    async fn delete_ip_acg(&self, acg_id: &str) -> Result<(), ProviderError> {
        debug!(acg_id = %acg_id, "call [delete_ip_group]");
        self.client
            .delete_ip_group()
            .group_id(acg_id)
            .send()
            .await
            .map_err(|e| classify("delete_ip_group", e.into_service_error()))?;
        Ok(())
    }
}

// ─── Request building ───────────────────────────────────────────────────────

/// Wire form of a rule set, sorted by address for stable requests.
fn build_rules(rules: &[Rule]) -> Vec<IpRuleItem> {
    let mut rules = rules.to_vec();
    rules.sort_by(|a, b| a.ip.cmp(&b.ip));

    rules
        .into_iter()
        .map(|rule| {
            IpRuleItem::builder()
                .ip_rule(rule.ip)
                .rule_desc(rule.desc)
                .build()
        })
        .collect()
}

/// Caller tags plus the stamps recorded on every created group.
fn extend_tags(tags: &BTreeMap<String, String>, acg: &IpAcg) -> BTreeMap<String, String> {
    let timestamp = Utc::now().to_rfc3339();

    let mut tags = tags.clone();
    tags.insert("IPACGName".to_string(), acg.name.clone());
    tags.insert("Created".to_string(), timestamp.clone());
    tags.insert("RulesLastApplied".to_string(), timestamp);
    tags
}

fn build_tags(tags: &BTreeMap<String, String>) -> Result<Vec<Tag>, ProviderError> {
    tags.iter()
        .map(|(key, value)| {
            Tag::builder()
                .key(key.clone())
                .value(value.clone())
                .build()
                .map_err(|e| ProviderError::InvalidParameter {
                    op: "create_ip_group".to_string(),
                    message: e.to_string(),
                })
        })
        .collect()
}

/// Map a service error code onto the matching [`ProviderError`] variant,
/// keeping the original code and message when there is none.
fn classify<E>(op: &str, err: E) -> ProviderError
where
    E: ProvideErrorMetadata,
{
    let op = op.to_string();
    let code = err.code().unwrap_or("Unknown").to_string();
    let message = err
        .message()
        .unwrap_or("no message returned by the service")
        .to_string();

    match code.as_str() {
        "InvalidParameterValuesException" => ProviderError::InvalidParameter { op, message },
        "ResourceNotFoundException" => ProviderError::NotFound { op, message },
        "ResourceLimitExceededException" => ProviderError::LimitExceeded { op, message },
        "InvalidResourceStateException" => ProviderError::InvalidState { op, message },
        "AccessDeniedException" => ProviderError::AccessDenied { op, message },
        "OperationNotSupportedException" => ProviderError::Unsupported { op, message },
        "ResourceAssociatedException" => ProviderError::Associated { op, message },
        _ => ProviderError::Api { op, code, message },
    }
}
