//! playdwh-core
//!
//! Statement catalog, schema definitions, and configuration for the
//! song-play warehouse loader.

#![warn(missing_docs)]

mod catalog;
mod config;
mod dialect;
mod error;
mod schema;

pub use catalog::{QueryCatalog, Statement};
pub use config::{ClusterConfig, EtlConfig, IamRoleConfig, S3Config};
pub use dialect::SqlDialect;
pub use error::{ConfigError, ConfigResult};
pub use schema::WarehouseTable;
