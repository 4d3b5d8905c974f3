//! Desired state for the ConfigMap owned by a ConfigClient

use crate::{CoreError, Result};
use config_api::ConfigClient;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::ObjectMeta;
use kube::Resource;
use std::collections::BTreeMap;

/// Computes the ConfigMap a ConfigClient should own.
///
/// Implementations must be pure: the same parent always yields the same
/// ConfigMap, otherwise the reconciler never observes convergence. `None`
/// means the parent should own no ConfigMap at all.
pub trait DesiredState: Send + Sync {
    fn build(&self, parent: &ConfigClient) -> Option<ConfigMap>;
}

/// Default policy: every ConfigClient owns one empty ConfigMap with its own
/// namespace and name.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyConfigMap;

impl DesiredState for EmptyConfigMap {
    fn build(&self, parent: &ConfigClient) -> Option<ConfigMap> {
        Some(ConfigMap {
            metadata: ObjectMeta {
                name: parent.metadata.name.clone(),
                namespace: parent.metadata.namespace.clone(),
                ..Default::default()
            },
            data: Some(BTreeMap::new()),
            ..Default::default()
        })
    }
}

/// Controller owner reference pointing at `parent`
pub fn owner_reference(parent: &ConfigClient) -> Result<OwnerReference> {
    let name = parent
        .metadata
        .name
        .clone()
        .ok_or_else(|| CoreError::InvariantViolation("ConfigClient has no name".to_string()))?;
    let uid = parent.metadata.uid.clone().ok_or_else(|| {
        CoreError::InvariantViolation(format!("ConfigClient {} has no uid", name))
    })?;

    Ok(OwnerReference {
        api_version: ConfigClient::api_version(&()).into_owned(),
        kind: ConfigClient::kind(&()).into_owned(),
        name,
        uid,
        controller: Some(true),
        block_owner_deletion: Some(true),
    })
}

/// `desired` with `owner` appended to its owner references
pub fn with_owner(desired: ConfigMap, owner: OwnerReference) -> ConfigMap {
    let owner_references = desired
        .metadata
        .owner_references
        .into_iter()
        .flatten()
        .chain(std::iter::once(owner))
        .collect();

    ConfigMap {
        metadata: ObjectMeta {
            owner_references: Some(owner_references),
            ..desired.metadata
        },
        ..desired
    }
}
