//! Configuration for the warehouse loader.
//!
//! Configuration is read from a TOML file, overridden by `PLAYDWH_*`
//! environment variables, then validated:
//!
//! ```toml
//! [cluster]
//! host = "example.cluster.us-west-2.redshift.amazonaws.com"
//! port = 5439
//! database = "dev"
//! user = "loader"
//! password = "..."
//!
//! [s3]
//! log_data = "s3://udacity-dend/log_data"
//! song_data = "s3://udacity-dend/song_data"
//! log_jsonpath = "s3://udacity-dend/log_json_path.json"
//! region = "us-west-2"
//!
//! [iam_role]
//! arn = "arn:aws:iam::123456789012:role/dwhRole"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Top-level loader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Warehouse cluster connection settings
    pub cluster: ClusterConfig,
    /// Object-store locations of the source datasets
    pub s3: S3Config,
    /// IAM role the warehouse assumes for bulk loads
    pub iam_role: IamRoleConfig,
}

/// Connection settings for the warehouse cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Cluster endpoint hostname
    pub host: String,
    /// Port the cluster listens on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Database name
    pub database: String,
    /// Login user
    pub user: String,
    /// Login password
    pub password: String,
}

/// Object-store locations of the source datasets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Prefix holding the event-log JSON files
    pub log_data: String,
    /// Prefix holding the song-metadata JSON files
    pub song_data: String,
    /// Jsonpaths file mapping event-log fields onto staging columns
    pub log_jsonpath: String,
    /// Region the source bucket lives in
    #[serde(default = "default_region")]
    pub region: String,
}

/// IAM role used by the bulk-load statements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IamRoleConfig {
    /// Role ARN
    pub arn: String,
}

fn default_port() -> u16 {
    5439
}

fn default_region() -> String {
    "us-west-2".to_string()
}

impl EtlConfig {
    /// Loads configuration from `path`, applies environment overrides, and
    /// validates the result.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: EtlConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `PLAYDWH_*` environment variables on top of file values.
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        override_string("PLAYDWH_CLUSTER_HOST", &mut self.cluster.host);
        if let Ok(value) = std::env::var("PLAYDWH_CLUSTER_PORT") {
            self.cluster.port = value.parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "PLAYDWH_CLUSTER_PORT is not a valid port: {value}"
                ))
            })?;
        }
        override_string("PLAYDWH_CLUSTER_DATABASE", &mut self.cluster.database);
        override_string("PLAYDWH_CLUSTER_USER", &mut self.cluster.user);
        override_string("PLAYDWH_CLUSTER_PASSWORD", &mut self.cluster.password);
        override_string("PLAYDWH_S3_LOG_DATA", &mut self.s3.log_data);
        override_string("PLAYDWH_S3_SONG_DATA", &mut self.s3.song_data);
        override_string("PLAYDWH_S3_LOG_JSONPATH", &mut self.s3.log_jsonpath);
        override_string("PLAYDWH_S3_REGION", &mut self.s3.region);
        override_string("PLAYDWH_IAM_ROLE_ARN", &mut self.iam_role.arn);
        Ok(())
    }

    /// Checks every value the statement catalog and connector rely on.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.cluster.host.is_empty() {
            return Err(ConfigError::Invalid("cluster.host must not be empty".to_string()));
        }
        if self.cluster.port == 0 {
            return Err(ConfigError::Invalid("cluster.port must not be 0".to_string()));
        }
        if self.cluster.database.is_empty() {
            return Err(ConfigError::Invalid("cluster.database must not be empty".to_string()));
        }
        if self.cluster.user.is_empty() {
            return Err(ConfigError::Invalid("cluster.user must not be empty".to_string()));
        }
        if self.cluster.password.is_empty() {
            return Err(ConfigError::Invalid("cluster.password must not be empty".to_string()));
        }
        require_s3_uri("s3.log_data", &self.s3.log_data)?;
        require_s3_uri("s3.song_data", &self.s3.song_data)?;
        require_s3_uri("s3.log_jsonpath", &self.s3.log_jsonpath)?;
        if self.s3.region.is_empty() {
            return Err(ConfigError::Invalid("s3.region must not be empty".to_string()));
        }
        if self.iam_role.arn.is_empty() {
            return Err(ConfigError::Invalid("iam_role.arn must not be empty".to_string()));
        }
        Ok(())
    }
}

fn override_string(var: &str, target: &mut String) {
    if let Ok(value) = std::env::var(var) {
        debug!(var, "applying environment override");
        *target = value;
    }
}

fn require_s3_uri(key: &str, value: &str) -> ConfigResult<()> {
    if !value.starts_with("s3://") {
        return Err(ConfigError::Invalid(format!(
            "{key} must be an s3:// URI, got {value:?}"
        )));
    }
    Ok(())
}
