//! In-memory parent cache and ConfigMap store
//!
//! Both implement the accessor traits without a cluster. The ConfigMap store
//! behaves like the API server where the reconciler can observe it: it
//! assigns server-side fields, rejects duplicate creates and stale updates,
//! and records every mutation it accepted.

use crate::accessor::{object_key, ChildAccessor, ParentAccessor};
use crate::{CoreError, Result};
use chrono::Utc;
use config_api::ConfigClient;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock as SyncRwLock};
use tokio::sync::RwLock;
use tracing::debug;

type Key = (String, String);

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

/// ParentCache holds ConfigClients the way a watch cache would.
///
/// Every write is a single map operation, so the map stays consistent even
/// if a holder of the lock panicked; all accessors keep using it.
#[derive(Clone, Default)]
pub struct ParentCache {
    parents: Arc<SyncRwLock<HashMap<Key, Arc<ConfigClient>>>>,
}

impl ParentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a ConfigClient
    pub fn insert(&self, client: ConfigClient) -> Result<()> {
        let (namespace, name) = match (&client.metadata.namespace, &client.metadata.name) {
            (Some(namespace), Some(name)) => (namespace.clone(), name.clone()),
            _ => {
                return Err(CoreError::InvariantViolation(
                    "ConfigClient needs a namespace and name".to_string(),
                ))
            }
        };
        self.parents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((namespace, name), Arc::new(client));
        Ok(())
    }

    /// Drop a ConfigClient, as if its deletion had been observed
    pub fn remove(&self, namespace: &str, name: &str) {
        self.parents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key(namespace, name));
    }
}

impl ParentAccessor for ParentCache {
    fn get(&self, namespace: &str, name: &str) -> Option<Arc<ConfigClient>> {
        self.parents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key(namespace, name))
            .cloned()
    }
}

/// Store operations that accept a mutation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

/// Failure to return from the next call of an operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Failure {
    Conflict,
    Transport,
}

/// A mutation the store accepted
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mutation {
    pub operation: Operation,
    pub namespace: String,
    pub name: String,
}

#[derive(Default)]
struct State {
    objects: BTreeMap<Key, ConfigMap>,
    history: Vec<Mutation>,
    failures: HashMap<Operation, Failure>,
    resource_version: u64,
}

impl State {
    fn next_resource_version(&mut self) -> String {
        self.resource_version = self.resource_version.saturating_add(1);
        self.resource_version.to_string()
    }

    fn take_failure(&mut self, operation: Operation, target: &str) -> Result<()> {
        match self.failures.remove(&operation) {
            Some(Failure::Conflict) => Err(CoreError::Conflict(target.to_string())),
            Some(Failure::Transport) => Err(CoreError::Transport(format!(
                "{:?} {} interrupted",
                operation, target
            ))),
            None => Ok(()),
        }
    }

    fn record(&mut self, operation: Operation, namespace: &str, name: &str) {
        self.history.push(Mutation {
            operation,
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
    }
}

/// ConfigMapStore keeps ConfigMaps ordered by namespace and name
#[derive(Clone, Default)]
pub struct ConfigMapStore {
    state: Arc<RwLock<State>>,
}

impl ConfigMapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object without recording a mutation. Server-side fields are
    /// assigned when missing.
    pub async fn insert(&self, mut config_map: ConfigMap) -> Result<ConfigMap> {
        let (namespace, name) = {
            let (namespace, name) = object_key(&config_map)?;
            key(namespace, name)
        };
        let mut state = self.state.write().await;
        if config_map.metadata.uid.is_none() {
            config_map.metadata.uid = Some(uuid::Uuid::new_v4().to_string());
        }
        if config_map.metadata.resource_version.is_none() {
            config_map.metadata.resource_version = Some(state.next_resource_version());
        }
        state.objects.insert((namespace, name), config_map.clone());
        Ok(config_map)
    }

    /// Get a stored ConfigMap
    pub async fn get(&self, namespace: &str, name: &str) -> Option<ConfigMap> {
        let state = self.state.read().await;
        state.objects.get(&key(namespace, name)).cloned()
    }

    /// Every stored ConfigMap in a namespace
    pub async fn objects(&self, namespace: &str) -> Vec<ConfigMap> {
        let state = self.state.read().await;
        state
            .objects
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, config_map)| config_map.clone())
            .collect()
    }

    /// Mutations accepted so far, oldest first
    pub async fn mutations(&self) -> Vec<Mutation> {
        self.state.read().await.history.clone()
    }

    /// Forget the recorded mutations
    pub async fn clear_mutations(&self) {
        self.state.write().await.history.clear();
    }

    /// Make the next call of `operation` fail
    pub async fn fail_next(&self, operation: Operation, failure: Failure) {
        self.state.write().await.failures.insert(operation, failure);
    }
}

#[async_trait::async_trait]
impl ChildAccessor for ConfigMapStore {
    async fn list(&self, namespace: &str) -> Result<Vec<ConfigMap>> {
        Ok(self.objects(namespace).await)
    }

    async fn create(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        let (namespace, name) = object_key(config_map)?;
        let target = format!("{}/{}", namespace, name);
        let mut state = self.state.write().await;
        state.take_failure(Operation::Create, &target)?;

        if state.objects.contains_key(&key(namespace, name)) {
            return Err(CoreError::Conflict(format!("{} already exists", target)));
        }

        let mut created = config_map.clone();
        created.metadata.uid = Some(uuid::Uuid::new_v4().to_string());
        created.metadata.resource_version = Some(state.next_resource_version());
        created.metadata.creation_timestamp = Some(Time(Utc::now()));
        state.objects.insert(key(namespace, name), created.clone());
        state.record(Operation::Create, namespace, name);

        debug!("Created ConfigMap {}", target);
        Ok(created)
    }

    async fn update(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        let (namespace, name) = object_key(config_map)?;
        let target = format!("{}/{}", namespace, name);
        let mut state = self.state.write().await;
        state.take_failure(Operation::Update, &target)?;

        let stored_version = match state.objects.get(&key(namespace, name)) {
            Some(stored) => stored.metadata.resource_version.clone(),
            None => return Err(CoreError::NotFound(target)),
        };
        if let Some(version) = &config_map.metadata.resource_version {
            if Some(version) != stored_version.as_ref() {
                return Err(CoreError::Conflict(format!(
                    "{} has been modified (resourceVersion {})",
                    target, version
                )));
            }
        }

        let mut updated = config_map.clone();
        updated.metadata.resource_version = Some(state.next_resource_version());
        state.objects.insert(key(namespace, name), updated.clone());
        state.record(Operation::Update, namespace, name);

        debug!("Updated ConfigMap {}", target);
        Ok(updated)
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        let target = format!("{}/{}", namespace, name);
        let mut state = self.state.write().await;
        state.take_failure(Operation::Delete, &target)?;

        if state.objects.remove(&key(namespace, name)).is_none() {
            return Err(CoreError::NotFound(target));
        }
        state.record(Operation::Delete, namespace, name);

        debug!("Deleted ConfigMap {}", target);
        Ok(())
    }
}
