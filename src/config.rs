//! Optional TOML configuration.
//!
//! ```toml
//! [server]
//! listen = "0.0.0.0:8888"
//!
//! [elasticsearch]
//! url = "http://localhost:9200"
//! index = "places"
//!
//! [ingest]
//! data_file = "./materials/data.csv"
//! bulk_policy = "fail_fast"
//!
//! [[users]]
//! username = "admin"
//! password_hash = "$2b$10$..."
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::StaticCredentials;
use crate::store::BulkPolicy;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub elasticsearch: EsConfig,
    pub ingest: IngestConfig,
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    pub template: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8888".to_string(),
            template: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EsConfig {
    pub url: String,
    pub index: String,
    /// Index mapping document; the embedded one is used when unset
    pub schema: Option<PathBuf>,
}

impl Default for EsConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            index: "places".to_string(),
            schema: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IngestConfig {
    pub data_file: PathBuf,
    pub bulk_policy: BulkPolicy,
    /// Load `data_file` when the server starts
    pub load_on_start: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("./materials/data.csv"),
            bulk_policy: BulkPolicy::BestEffort,
            load_on_start: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    pub username: String,
    /// bcrypt hash
    pub password_hash: String,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Load `path` if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Configured users, or the built-in set when none are listed
    pub fn credentials(&self) -> StaticCredentials {
        if self.users.is_empty() {
            return StaticCredentials::builtin();
        }

        StaticCredentials::new(
            self.users
                .iter()
                .map(|u| (u.username.clone(), u.password_hash.clone())),
        )
    }
}
