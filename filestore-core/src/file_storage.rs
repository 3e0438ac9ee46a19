use crate::config::StorageConfig;
use crate::expiry::{ExpiryScheduler, TimerId};
use crate::operations::{
    CommitBatchOperation, CommitBatchOperationRequest, CreateChunkOperation,
    CreateChunkOperationRequest, DeleteAssetOperation, DeleteAssetOperationOutcome,
    DeleteAssetOperationRequest, ExpireChunksOperation, ExpireChunksOperationRequest,
    ExpireChunksOperationResult, ListAssetsOperation, ListAssetsOperationRequest,
    ReadAssetOperation, ReadAssetOperationOutcome, ReadAssetOperationRequest,
};
use crate::{
    Asset, AssetCatalog, AssetId, AssetProperties, AssetSummary, CallerId, CapacityMonitor,
    CapacitySnapshot, ChunkId, ChunkStore, FileStoreError, Result,
};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

/// Protocol version reported to clients. Bumped on incompatible changes.
pub const PROTOCOL_VERSION: u32 = 1;

/// The storage engine: chunk staging, commit protocol and asset catalog
/// behind one handle.
pub struct FileStorage {
    capacity: Arc<CapacityMonitor>,
    chunk_store: Arc<ChunkStore>,
    create_chunk: CreateChunkOperation,
    commit_batch: CommitBatchOperation,
    read_asset: ReadAssetOperation,
    list_assets: ListAssetsOperation,
    delete_asset: DeleteAssetOperation,
    expire_chunks: ExpireChunksOperation,
    expiry: ExpiryScheduler,
}

impl FileStorage {
    pub fn open(config: &StorageConfig) -> Result<Self> {
        if config.capacity_threshold_bytes == 0 {
            return Err(FileStoreError::Config(
                "capacity_threshold_bytes must be greater than zero".to_string(),
            ));
        }

        std::fs::create_dir_all(&config.data_dir)?;

        let catalog = Arc::new(AssetCatalog::new(config.catalog_db_path())?);
        let capacity = Arc::new(CapacityMonitor::new(
            config.capacity_threshold_bytes,
            catalog.total_size()?,
        ));
        let chunk_store = Arc::new(ChunkStore::new(
            config.staging_dir(),
            config.max_chunk_bytes,
            capacity.clone(),
        )?);

        let expire_chunks = ExpireChunksOperation::new(chunk_store.clone());

        tracing::info!(
            "Opened file storage at {:?}: {} of {} bytes in use",
            config.data_dir,
            capacity.used(),
            capacity.threshold()
        );

        Ok(Self {
            create_chunk: CreateChunkOperation::new(chunk_store.clone()),
            commit_batch: CommitBatchOperation::new(
                chunk_store.clone(),
                catalog.clone(),
                capacity.clone(),
            ),
            read_asset: ReadAssetOperation::new(catalog.clone()),
            list_assets: ListAssetsOperation::new(catalog.clone()),
            delete_asset: DeleteAssetOperation::new(catalog, capacity.clone()),
            expiry: ExpiryScheduler::new(expire_chunks.clone()),
            expire_chunks,
            capacity,
            chunk_store,
        })
    }

    pub async fn create_chunk(
        &self,
        caller: &CallerId,
        content: Bytes,
        order: u32,
    ) -> Result<ChunkId> {
        let result = self
            .create_chunk
            .run(CreateChunkOperationRequest {
                caller: caller.clone(),
                content,
                order,
            })
            .await?;
        Ok(result.chunk_id)
    }

    /// True when every id is still staged.
    pub async fn chunks_available(&self, chunk_ids: &[ChunkId]) -> bool {
        self.create_chunk.chunks_available(chunk_ids).await
    }

    pub async fn commit_batch(
        &self,
        caller: &CallerId,
        chunk_ids: Vec<ChunkId>,
        properties: AssetProperties,
    ) -> Result<AssetId> {
        let result = self
            .commit_batch
            .run(CommitBatchOperationRequest {
                caller: caller.clone(),
                chunk_ids,
                properties,
            })
            .await?;
        Ok(result.asset_id)
    }

    pub fn get(&self, asset_id: &str) -> Result<Asset> {
        match self.read_asset.run(ReadAssetOperationRequest {
            asset_id: asset_id.to_string(),
        })? {
            ReadAssetOperationOutcome::Found(asset) => Ok(asset),
            ReadAssetOperationOutcome::NotFound => {
                Err(FileStoreError::AssetNotFound(asset_id.to_string()))
            }
        }
    }

    pub fn assets_list(&self) -> Result<Vec<AssetSummary>> {
        Ok(self
            .list_assets
            .run(ListAssetsOperationRequest::default())?
            .items)
    }

    pub fn assets_owned_by(&self, owner: &CallerId) -> Result<Vec<AssetSummary>> {
        Ok(self
            .list_assets
            .run(ListAssetsOperationRequest {
                owner: Some(owner.clone()),
            })?
            .items)
    }

    pub fn delete_asset(&self, asset_id: &str) -> Result<()> {
        match self.delete_asset.run(DeleteAssetOperationRequest {
            asset_id: asset_id.to_string(),
        })? {
            DeleteAssetOperationOutcome::Deleted(_) => Ok(()),
            DeleteAssetOperationOutcome::NotFound => {
                Err(FileStoreError::AssetNotFound(asset_id.to_string()))
            }
        }
    }

    pub fn is_full(&self) -> bool {
        self.capacity.is_full()
    }

    pub fn capacity(&self) -> CapacitySnapshot {
        self.capacity.snapshot()
    }

    pub fn version(&self) -> u32 {
        PROTOCOL_VERSION
    }

    /// Number of chunks currently staged.
    pub async fn staged_chunks(&self) -> usize {
        self.chunk_store.len().await
    }

    /// Run one sweep now.
    pub async fn expire_chunks_older_than(
        &self,
        ttl: Duration,
    ) -> Result<ExpireChunksOperationResult> {
        self.expire_chunks
            .run(ExpireChunksOperationRequest { ttl })
            .await
    }

    pub fn start_chunk_expiry(&self, interval: Duration, ttl: Duration) -> TimerId {
        self.expiry.start(interval, ttl)
    }

    pub fn stop_chunk_expiry(&self, timer_id: TimerId) -> bool {
        self.expiry.cancel(timer_id)
    }

    pub fn active_chunk_expiries(&self) -> Vec<TimerId> {
        self.expiry.active()
    }
}
