//! API types for the ConfigClient controller
//!
//! This library defines the custom resource watched by the controller:
//! - ConfigClient: a client that is handed a managed ConfigMap of the same name

pub mod v1;

pub use v1::{ConfigClient, ConfigClientSpec};
