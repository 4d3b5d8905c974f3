//! Comparison and merging of desired and actual ConfigMaps

use k8s_openapi::api::core::v1::ConfigMap;
use std::collections::BTreeMap;

/// Copy server-side fields the desired object cannot know in advance from
/// `actual` onto `desired`. ConfigMaps currently have none.
pub fn harmonize_immutable_fields(_actual: &ConfigMap, desired: ConfigMap) -> ConfigMap {
    desired
}

/// Equality on the fields the controller manages: labels and data
pub fn semantic_equals(desired: Option<&ConfigMap>, actual: Option<&ConfigMap>) -> bool {
    match (desired, actual) {
        (None, None) => true,
        (Some(desired), Some(actual)) => {
            maps_equal(
                desired.metadata.labels.as_ref(),
                actual.metadata.labels.as_ref(),
            ) && maps_equal(desired.data.as_ref(), actual.data.as_ref())
        }
        _ => false,
    }
}

/// Map equality where a missing map equals an empty one
pub fn maps_equal(
    left: Option<&BTreeMap<String, String>>,
    right: Option<&BTreeMap<String, String>>,
) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => left == right,
        (Some(map), None) | (None, Some(map)) => map.is_empty(),
        (None, None) => true,
    }
}

/// `actual` with its labels and data replaced by the desired ones
pub fn merge_for_update(actual: ConfigMap, desired: &ConfigMap) -> ConfigMap {
    let mut merged = actual;
    merged.metadata.labels = desired.metadata.labels.clone();
    merged.data = desired.data.clone();
    merged
}
