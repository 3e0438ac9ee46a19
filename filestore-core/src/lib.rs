//! Filestore Core - chunked upload staging and durable asset catalog
//!
//! Clients upload a file as independent chunks, then commit the ordered list
//! of chunk ids together with the file's metadata and running checksum:
//! - staged chunks are owned by their uploader and expire when abandoned
//! - commit verifies ownership and CRC-32, then moves the bytes into the catalog
//! - a single global byte threshold gates new uploads
//! - SQLite holds committed assets

pub mod capacity;
pub mod checksum;
pub mod config;
pub mod error;
pub mod expiry;
pub mod file_storage;
pub mod operations;
pub mod storage;
pub mod types;

pub use capacity::{CapacityMonitor, CapacitySnapshot};
pub use checksum::{Checksum, compute_checksum, compute_hash};
pub use config::{ExpiryConfig, StorageConfig};
pub use error::{FileStoreError, Result};
pub use expiry::{ExpiryScheduler, TimerId};
pub use file_storage::{FileStorage, PROTOCOL_VERSION};
pub use storage::{AssetCatalog, ChunkRemoval, ChunkStore};
pub use types::{
    Asset, AssetId, AssetProperties, AssetSummary, CallerId, ChunkId, ChunkRecord,
    ContentEncoding,
};
