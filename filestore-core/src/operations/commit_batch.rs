use crate::{
    Asset, AssetCatalog, AssetId, AssetProperties, CallerId, CapacityMonitor, ChunkId,
    ChunkStore, FileStoreError, Result, compute_checksum, compute_hash,
};
use bytes::Bytes;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use ulid::Ulid;

/// Assembles staged chunks into a catalog asset.
///
/// Ownership, checksum and properties are verified, in that order, before
/// anything is written. The asset is inserted into the catalog first and the
/// consumed chunks are deleted afterwards, all while holding the commit lock,
/// so a chunk can feed at most one asset, at most once.
#[derive(Clone)]
pub struct CommitBatchOperation {
    chunk_store: Arc<ChunkStore>,
    catalog: Arc<AssetCatalog>,
    capacity: Arc<CapacityMonitor>,
    commit_lock: Arc<Mutex<()>>,
}

#[derive(Debug, Clone)]
pub struct CommitBatchOperationRequest {
    pub caller: CallerId,
    pub chunk_ids: Vec<ChunkId>,
    pub properties: AssetProperties,
}

#[derive(Debug, Clone)]
pub struct CommitBatchOperationResult {
    pub asset_id: AssetId,
    pub size: u64,
    pub chunk_count: u32,
}

impl CommitBatchOperation {
    pub fn new(
        chunk_store: Arc<ChunkStore>,
        catalog: Arc<AssetCatalog>,
        capacity: Arc<CapacityMonitor>,
    ) -> Self {
        Self {
            chunk_store,
            catalog,
            capacity,
            commit_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn run(
        &self,
        request: CommitBatchOperationRequest,
    ) -> Result<CommitBatchOperationResult> {
        let CommitBatchOperationRequest {
            caller,
            chunk_ids,
            properties,
        } = request;

        let _guard = self.commit_lock.lock().await;

        // a repeated id names a chunk this commit has already consumed
        let mut seen = HashSet::with_capacity(chunk_ids.len());
        if !chunk_ids.iter().all(|id| seen.insert(id.as_str())) {
            return Err(FileStoreError::NotOwner);
        }

        // An empty batch resolves to zero chunks and is left to the checksum
        // comparison below.
        let chunks = self.chunk_store.get_owned_chunks(&caller, &chunk_ids).await?;

        let actual = compute_checksum(chunks.iter().map(|chunk| &chunk[..]));
        if actual != properties.checksum {
            tracing::info!(
                "Rejected commit from {}: checksum {} does not match declared {}",
                caller,
                actual,
                properties.checksum
            );
            return Err(FileStoreError::ChecksumMismatch {
                expected: properties.checksum,
                actual,
            });
        }

        properties.validate()?;

        let content = concat_chunks(&chunks);
        let size = content.len() as u64;
        let chunk_count = u32::try_from(chunks.len()).map_err(|_| {
            FileStoreError::InvalidRequest(format!("too many chunks: {}", chunks.len()))
        })?;

        let asset = Asset {
            id: Ulid::new().to_string(),
            owner: caller.clone(),
            filename: properties.filename,
            content_type: properties.content_type,
            content_encoding: properties.content_encoding,
            checksum: actual,
            size,
            chunk_count,
            sha256: compute_hash(&content),
            created_at: Utc::now(),
            content,
        };

        self.catalog.insert(&asset)?;
        self.capacity.record(size);

        let removal = self.chunk_store.delete_chunks(&chunk_ids).await;

        tracing::info!(
            "Committed asset {} ({}, {} bytes) from {} chunks for {}; released {} staged bytes",
            asset.id,
            asset.filename,
            size,
            chunk_count,
            caller,
            removal.freed_bytes
        );

        Ok(CommitBatchOperationResult {
            asset_id: asset.id,
            size,
            chunk_count,
        })
    }
}

fn concat_chunks(chunks: &[Bytes]) -> Bytes {
    if let [single] = chunks {
        return single.clone();
    }

    let total = chunks.iter().map(|chunk| chunk.len()).sum();
    let mut content = Vec::with_capacity(total);
    for chunk in chunks {
        content.extend_from_slice(chunk);
    }
    Bytes::from(content)
}
