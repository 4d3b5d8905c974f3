//! Reconciliation of ConfigClients and the ConfigMaps they own
//!
//! This library provides:
//! - The reconciler that converges a ConfigClient's ConfigMap
//! - Desired state, ownership filtering and comparison helpers
//! - Accessors for ConfigClients and ConfigMaps, backed by Kubernetes or memory

pub mod accessor;
pub mod desired;
pub mod diff;
pub mod error;
pub mod ownership;
pub mod reconciler;
pub mod request;
#[cfg(any(test, feature = "testing"))]
pub mod store;

pub use accessor::{ChildAccessor, KubeConfigMaps, ParentAccessor};
pub use desired::{DesiredState, EmptyConfigMap};
pub use error::{CoreError, Result};
pub use reconciler::ConfigClientReconciler;
pub use request::{Outcome, Request};
