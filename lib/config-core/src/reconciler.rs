//! Reconciliation of a ConfigClient against the ConfigMap it owns

use crate::accessor::{ChildAccessor, ParentAccessor};
use crate::desired::{owner_reference, with_owner, DesiredState, EmptyConfigMap};
use crate::diff::{harmonize_immutable_fields, merge_for_update, semantic_equals};
use crate::ownership::owned_by;
use crate::request::{Outcome, Request};
use crate::{CoreError, Result};
use k8s_openapi::api::core::v1::ConfigMap;
use tracing::{debug, info, warn};

/// ConfigClientReconciler drives the ConfigMap owned by a ConfigClient
/// toward the desired state computed from the client.
///
/// A call performs at most one create or update, preceded by deletes when
/// duplicates are found. Failures abort the call and are returned unchanged;
/// nothing is retried here. Calls for the same request must not overlap.
pub struct ConfigClientReconciler<P, C, D = EmptyConfigMap> {
    parents: P,
    children: C,
    desired: D,
}

impl<P, C> ConfigClientReconciler<P, C, EmptyConfigMap>
where
    P: ParentAccessor,
    C: ChildAccessor,
{
    pub fn new(parents: P, children: C) -> Self {
        Self::with_desired_state(parents, children, EmptyConfigMap)
    }
}

impl<P, C, D> ConfigClientReconciler<P, C, D>
where
    P: ParentAccessor,
    C: ChildAccessor,
    D: DesiredState,
{
    /// Create a reconciler with a custom desired state policy
    pub fn with_desired_state(parents: P, children: C, desired: D) -> Self {
        Self {
            parents,
            children,
            desired,
        }
    }

    pub async fn reconcile(&self, request: &Request) -> Result<Outcome> {
        let parent = match self.parents.get(&request.namespace, &request.name) {
            Some(parent) => parent,
            None => {
                debug!("ConfigClient {} is gone, nothing to reconcile", request);
                return Ok(Outcome::Done);
            }
        };
        info!("Reconciling ConfigClient: {}", request);

        let uid = parent.metadata.uid.as_deref().ok_or_else(|| {
            CoreError::InvariantViolation(format!("ConfigClient {} has no uid", request))
        })?;

        let actual = self.discover(&request.namespace, uid).await?;

        let desired = match self.desired.build(&parent) {
            Some(desired) => desired,
            None => {
                if let Some(actual) = actual {
                    self.delete(&request.namespace, &actual).await?;
                }
                return Ok(Outcome::Done);
            }
        };
        let desired = with_owner(desired, owner_reference(&parent)?);

        let actual = match actual {
            Some(actual) => actual,
            None => {
                let created = self.children.create(&desired).await?;
                info!(
                    "Created ConfigMap {}/{} for ConfigClient {}",
                    request.namespace,
                    created.metadata.name.as_deref().unwrap_or_default(),
                    request
                );
                created
            }
        };

        let desired = harmonize_immutable_fields(&actual, desired);
        if semantic_equals(Some(&desired), Some(&actual)) {
            debug!("ConfigMap for ConfigClient {} is up to date", request);
            return Ok(Outcome::Done);
        }

        let merged = merge_for_update(actual, &desired);
        self.children.update(&merged).await?;
        info!(
            "Updated ConfigMap {}/{} for ConfigClient {}",
            request.namespace,
            merged.metadata.name.as_deref().unwrap_or_default(),
            request
        );

        Ok(Outcome::Done)
    }

    /// The single ConfigMap owned by `uid`. Duplicates are all deleted and
    /// reported as no ConfigMap.
    async fn discover(&self, namespace: &str, uid: &str) -> Result<Option<ConfigMap>> {
        let config_maps = self.children.list(namespace).await?;
        for config_map in &config_maps {
            debug!(
                "Found ConfigMap {}/{}",
                namespace,
                config_map.metadata.name.as_deref().unwrap_or_default()
            );
        }

        let mut owned = owned_by(config_maps, uid);
        if owned.len() <= 1 {
            return Ok(owned.pop());
        }

        warn!(
            "Found {} ConfigMaps owned by {} in {}, deleting all of them",
            owned.len(),
            uid,
            namespace
        );
        for duplicate in &owned {
            self.delete(namespace, duplicate).await?;
        }
        Ok(None)
    }

    /// Delete a ConfigMap listed in `namespace`. A ConfigMap that is already
    /// gone counts as deleted.
    async fn delete(&self, namespace: &str, config_map: &ConfigMap) -> Result<()> {
        let name = config_map.metadata.name.as_deref().ok_or_else(|| {
            CoreError::InvariantViolation("listed ConfigMap has no name".to_string())
        })?;

        match self.children.delete(namespace, name).await {
            Ok(()) => {
                info!("Deleted ConfigMap {}/{}", namespace, name);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!("ConfigMap {}/{} was already deleted", namespace, name);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
