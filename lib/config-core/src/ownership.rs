//! Ownership of ConfigMaps by ConfigClients
//!
//! Ownership is a back-reference: a ConfigMap belongs to a ConfigClient when
//! one of its owner references carries the client's UID.

use k8s_openapi::api::core::v1::ConfigMap;

/// Whether `config_map` has an owner reference to the object with `uid`
pub fn is_owned_by(config_map: &ConfigMap, uid: &str) -> bool {
    config_map
        .metadata
        .owner_references
        .iter()
        .flatten()
        .any(|owner| owner.uid == uid)
}

/// The ConfigMaps owned by the object with `uid`, in listing order
pub fn owned_by(config_maps: Vec<ConfigMap>, uid: &str) -> Vec<ConfigMap> {
    config_maps
        .into_iter()
        .filter(|config_map| is_owned_by(config_map, uid))
        .collect()
}
