use crate::error::{FileStoreError, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ChunkId = String;
pub type AssetId = String;

/// Identity of the caller on whose behalf an operation runs.
///
/// Authentication happens upstream; the core only compares identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerId(String);

impl CallerId {
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FileStoreError::InvalidRequest(
                "caller id cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentEncoding {
    Identity,
    Gzip,
}

impl ContentEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Gzip => "gzip",
        }
    }
}

impl FromStr for ContentEncoding {
    type Err = FileStoreError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "identity" => Ok(Self::Identity),
            "gzip" => Ok(Self::Gzip),
            other => Err(FileStoreError::InvalidRequest(format!(
                "unsupported content encoding: {}",
                other
            ))),
        }
    }
}

/// Metadata the caller declares when committing a batch of chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetProperties {
    pub filename: String,
    pub content_type: String,
    pub content_encoding: ContentEncoding,
    pub checksum: u32,
}

impl AssetProperties {
    pub fn validate(&self) -> Result<()> {
        if self.filename.trim().is_empty() {
            return Err(FileStoreError::InvalidRequest(
                "filename cannot be empty".to_string(),
            ));
        }
        if self.content_type.trim().is_empty() {
            return Err(FileStoreError::InvalidRequest(
                "content type cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A committed asset, content included.
#[derive(Debug, Clone)]
pub struct Asset {
    pub id: AssetId,
    pub owner: CallerId,
    pub filename: String,
    pub content_type: String,
    pub content_encoding: ContentEncoding,
    pub checksum: u32,
    pub size: u64,
    pub chunk_count: u32,
    pub sha256: String,
    pub created_at: DateTime<Utc>,
    pub content: Bytes,
}

/// Asset metadata without the content payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSummary {
    pub id: AssetId,
    pub owner: CallerId,
    pub filename: String,
    pub content_type: String,
    pub content_encoding: ContentEncoding,
    pub checksum: u32,
    pub size: u64,
    pub chunk_count: u32,
    pub sha256: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Asset> for AssetSummary {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id.clone(),
            owner: asset.owner.clone(),
            filename: asset.filename.clone(),
            content_type: asset.content_type.clone(),
            content_encoding: asset.content_encoding,
            checksum: asset.checksum,
            size: asset.size,
            chunk_count: asset.chunk_count,
            sha256: asset.sha256.clone(),
            created_at: asset.created_at,
        }
    }
}

/// Index entry for a staged chunk. The bytes live in the staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRecord {
    pub id: ChunkId,
    pub owner: CallerId,
    /// Position the uploader assigned; commit ignores it and uses the id order.
    pub order: u32,
    pub len: u64,
    pub created_at: DateTime<Utc>,
}
