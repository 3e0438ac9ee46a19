use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    #[serde(default = "default_capacity_threshold_bytes")]
    pub capacity_threshold_bytes: u64,
    #[serde(default = "default_max_chunk_bytes")]
    pub max_chunk_bytes: u64,
}

impl StorageConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            capacity_threshold_bytes: default_capacity_threshold_bytes(),
            max_chunk_bytes: default_max_chunk_bytes(),
        }
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.data_dir.join("staging")
    }

    pub fn catalog_db_path(&self) -> PathBuf {
        self.data_dir.join("catalog.db")
    }
}

fn default_capacity_threshold_bytes() -> u64 {
    2 * 1024 * 1024 * 1024
}

fn default_max_chunk_bytes() -> u64 {
    3 * 1024 * 1024
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiryConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub start_on_boot: bool,
}

impl ExpiryConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            interval_secs: default_interval_secs(),
            start_on_boot: false,
        }
    }
}

fn default_ttl_secs() -> u64 {
    10 * 60
}

fn default_interval_secs() -> u64 {
    60
}
