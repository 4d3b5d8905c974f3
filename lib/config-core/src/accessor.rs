//! Access to parent ConfigClients and child ConfigMaps
//!
//! The reconciler only talks to the cluster through these two traits. The
//! parent side is a read-only view over the controller's watch cache; the
//! child side performs remote list/create/update/delete calls.

use crate::{CoreError, Result};
use config_api::ConfigClient;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::{Api, Client};
use kube_runtime::reflector::{ObjectRef, Store};
use std::sync::Arc;
use tracing::debug;

/// Read-only, cache-backed lookup of ConfigClients
pub trait ParentAccessor: Send + Sync {
    fn get(&self, namespace: &str, name: &str) -> Option<Arc<ConfigClient>>;
}

/// Namespaced operations on the ConfigMaps a ConfigClient may own
#[async_trait::async_trait]
pub trait ChildAccessor: Send + Sync {
    /// List every ConfigMap in a namespace
    async fn list(&self, namespace: &str) -> Result<Vec<ConfigMap>>;

    /// Create a ConfigMap, returning the stored object
    async fn create(&self, config_map: &ConfigMap) -> Result<ConfigMap>;

    /// Replace a ConfigMap, returning the stored object
    async fn update(&self, config_map: &ConfigMap) -> Result<ConfigMap>;

    /// Delete a ConfigMap by name
    async fn delete(&self, namespace: &str, name: &str) -> Result<()>;
}

impl ParentAccessor for Store<ConfigClient> {
    fn get(&self, namespace: &str, name: &str) -> Option<Arc<ConfigClient>> {
        Store::get(self, &ObjectRef::new(name).within(namespace))
    }
}

/// ConfigMap access through the Kubernetes API
#[derive(Clone)]
pub struct KubeConfigMaps {
    client: Client,
}

impl KubeConfigMaps {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Namespace and name of a ConfigMap about to be written
pub(crate) fn object_key(config_map: &ConfigMap) -> Result<(&str, &str)> {
    let name = config_map
        .metadata
        .name
        .as_deref()
        .ok_or_else(|| CoreError::InvariantViolation("ConfigMap has no name".to_string()))?;
    let namespace = config_map.metadata.namespace.as_deref().ok_or_else(|| {
        CoreError::InvariantViolation(format!("ConfigMap {} has no namespace", name))
    })?;
    Ok((namespace, name))
}

#[async_trait::async_trait]
impl ChildAccessor for KubeConfigMaps {
    async fn list(&self, namespace: &str) -> Result<Vec<ConfigMap>> {
        let list = self.api(namespace).list(&ListParams::default()).await?;
        debug!("Listed {} ConfigMaps in {}", list.items.len(), namespace);
        Ok(list.items)
    }

    async fn create(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        let (namespace, _) = object_key(config_map)?;
        let created = self
            .api(namespace)
            .create(&PostParams::default(), config_map)
            .await?;
        Ok(created)
    }

    async fn update(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        let (namespace, name) = object_key(config_map)?;
        let updated = self
            .api(namespace)
            .replace(name, &PostParams::default(), config_map)
            .await?;
        Ok(updated)
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        self.api(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }
}
