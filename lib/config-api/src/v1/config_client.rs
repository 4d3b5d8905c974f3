use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ConfigClient asks the controller for a ConfigMap it can read its
/// configuration from. The ConfigMap shares the client's namespace and name
/// and is owned by it.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "spring.io",
    version = "v1",
    kind = "ConfigClient",
    plural = "configclients",
    namespaced,
    derive = "Default",
    derive = "PartialEq",
)]
pub struct ConfigClientSpec {}
