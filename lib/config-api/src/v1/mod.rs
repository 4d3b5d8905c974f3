/// API version v1 for ConfigClient CRDs

pub mod config_client;

pub use config_client::{ConfigClient, ConfigClientSpec};

/// API group for ConfigClient resources
pub const API_GROUP: &str = "spring.io";
/// API version for ConfigClient resources
pub const API_VERSION: &str = "v1";
