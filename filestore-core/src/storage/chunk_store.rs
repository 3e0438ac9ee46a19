use crate::capacity::CapacityMonitor;
use crate::error::{FileStoreError, Result};
use crate::types::{CallerId, ChunkId, ChunkRecord};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use ulid::Ulid;

/// ChunkStore is the volatile staging area for uploaded chunks.
/// Chunk bytes are stored in {base_path}/{chunk_id}; ownership, order and
/// age are tracked in an in-memory index.
pub struct ChunkStore {
    base_path: PathBuf,
    max_chunk_bytes: u64,
    capacity: Arc<CapacityMonitor>,
    index: RwLock<HashMap<ChunkId, ChunkRecord>>,
}

/// Outcome of removing chunks from the staging area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkRemoval {
    pub removed: usize,
    pub freed_bytes: u64,
}

impl ChunkStore {
    /// Open the staging area at `base_path`.
    ///
    /// The index does not survive restarts, so anything left on disk from a
    /// previous process is unreachable and gets wiped.
    pub fn new(
        base_path: PathBuf,
        max_chunk_bytes: u64,
        capacity: Arc<CapacityMonitor>,
    ) -> Result<Self> {
        if base_path.exists() {
            tracing::info!("Clearing stale staging directory {:?}", base_path);
            std::fs::remove_dir_all(&base_path)?;
        }
        std::fs::create_dir_all(&base_path)?;

        Ok(Self {
            base_path,
            max_chunk_bytes,
            capacity,
            index: RwLock::new(HashMap::new()),
        })
    }

    /// Directory holding the staged chunk files.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    /// Stage a chunk for `owner` and return its fresh id.
    pub async fn put_chunk(&self, owner: &CallerId, data: Bytes, order: u32) -> Result<ChunkId> {
        let len = data.len() as u64;
        if len > self.max_chunk_bytes {
            return Err(FileStoreError::InvalidRequest(format!(
                "chunk of {} bytes exceeds the {} byte limit",
                len, self.max_chunk_bytes
            )));
        }

        self.capacity.try_admit(len)?;

        let chunk_id = Ulid::new().to_string();
        if let Err(error) = self.write_chunk_file(&chunk_id, &data).await {
            self.capacity.release(len);
            return Err(error);
        }

        let record = ChunkRecord {
            id: chunk_id.clone(),
            owner: owner.clone(),
            order,
            len,
            created_at: Utc::now(),
        };
        self.index.write().await.insert(chunk_id.clone(), record);

        tracing::debug!(
            "Stored chunk {} for {} (order {}, {} bytes)",
            chunk_id,
            owner,
            order,
            len
        );
        Ok(chunk_id)
    }

    async fn write_chunk_file(&self, chunk_id: &str, data: &[u8]) -> Result<()> {
        let chunk_path = self.chunk_path(chunk_id);

        // readers never observe a partially written chunk
        let temp_path = chunk_path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &chunk_path).await?;
        Ok(())
    }

    /// Read the bytes of `ids` in the given order, all owned by `caller`.
    ///
    /// Fails as a whole with `NotOwner` when any id is unknown, owned by
    /// someone else, or vanished while being read.
    pub async fn get_owned_chunks(&self, caller: &CallerId, ids: &[ChunkId]) -> Result<Vec<Bytes>> {
        {
            let index = self.index.read().await;
            for id in ids {
                match index.get(id) {
                    Some(record) if &record.owner == caller => {}
                    _ => return Err(FileStoreError::NotOwner),
                }
            }
        }

        let mut chunks = Vec::with_capacity(ids.len());
        for id in ids {
            match fs::read(self.chunk_path(id)).await {
                Ok(data) => chunks.push(Bytes::from(data)),
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                    return Err(FileStoreError::NotOwner);
                }
                Err(error) => return Err(error.into()),
            }
        }

        Ok(chunks)
    }

    /// Look up the index entry of a staged chunk.
    pub async fn get_record(&self, id: &str) -> Option<ChunkRecord> {
        self.index.read().await.get(id).cloned()
    }

    /// Check that every id is currently staged, whoever owns it.
    pub async fn chunks_exist(&self, ids: &[ChunkId]) -> bool {
        let index = self.index.read().await;
        ids.iter().all(|id| index.contains_key(id))
    }

    pub async fn len(&self) -> usize {
        self.index.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.index.read().await.is_empty()
    }

    /// Remove chunks unconditionally. Unknown ids are skipped.
    pub async fn delete_chunks(&self, ids: &[ChunkId]) -> ChunkRemoval {
        let removed: Vec<ChunkRecord> = {
            let mut index = self.index.write().await;
            ids.iter().filter_map(|id| index.remove(id)).collect()
        };

        self.discard(removed).await
    }

    /// Remove every chunk created strictly before `cutoff`.
    pub async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> ChunkRemoval {
        let removed: Vec<ChunkRecord> = {
            let mut index = self.index.write().await;
            let expired: Vec<ChunkId> = index
                .values()
                .filter(|record| record.created_at < cutoff)
                .map(|record| record.id.clone())
                .collect();
            expired.iter().filter_map(|id| index.remove(id)).collect()
        };

        self.discard(removed).await
    }

    /// Remove every chunk older than `ttl`.
    pub async fn expire_older_than(&self, ttl: std::time::Duration) -> Result<ChunkRemoval> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| FileStoreError::InvalidRequest(format!("invalid ttl: {}", e)))?;
        let cutoff = Utc::now()
            .checked_sub_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Ok(self.delete_created_before(cutoff).await)
    }

    // Records are already out of the index; release their capacity and drop the files.
    async fn discard(&self, removed: Vec<ChunkRecord>) -> ChunkRemoval {
        let mut removal = ChunkRemoval::default();
        for record in removed {
            removal.removed += 1;
            removal.freed_bytes += record.len;

            let chunk_path = self.chunk_path(&record.id);
            match fs::remove_file(&chunk_path).await {
                Ok(()) => {}
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
                Err(error) => {
                    tracing::warn!("Failed to remove chunk file {:?}: {}", chunk_path, error);
                }
            }
            tracing::debug!("Removed chunk {} of {}", record.id, record.owner);
        }

        self.capacity.release(removal.freed_bytes);
        removal
    }

    /// Get the path to a chunk
    fn chunk_path(&self, chunk_id: &str) -> PathBuf {
        self.base_path.join(chunk_id)
    }
}
