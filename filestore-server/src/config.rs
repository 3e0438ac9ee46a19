use filestore_core::{ExpiryConfig, FileStoreError, Result, StorageConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default)]
    pub public_base_url: Option<String>,
    pub storage: StorageConfig,
    #[serde(default)]
    pub expiry: ExpiryConfig,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(path))
            .add_source(::config::Environment::with_prefix("FILESTORE").separator("__"))
            .build()
            .map_err(|e| FileStoreError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| FileStoreError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bind_addr.trim().is_empty() {
            return Err(FileStoreError::Config("bind_addr cannot be empty".to_string()));
        }
        if self.storage.capacity_threshold_bytes == 0 {
            return Err(FileStoreError::Config(
                "storage.capacity_threshold_bytes must be greater than zero".to_string(),
            ));
        }
        if self.storage.max_chunk_bytes == 0 {
            return Err(FileStoreError::Config(
                "storage.max_chunk_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Base for asset URLs handed back to clients.
    pub fn public_base_url_or_default(&self) -> String {
        self.public_base_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://{}", self.bind_addr))
    }

    pub fn asset_url(&self, asset_id: &str) -> String {
        format!("{}/assets/{}/content", self.public_base_url_or_default(), asset_id)
    }
}
