use crate::{ChunkStore, Result};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct ExpireChunksOperation {
    chunk_store: Arc<ChunkStore>,
}

#[derive(Debug, Clone)]
pub struct ExpireChunksOperationRequest {
    pub ttl: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpireChunksOperationResult {
    pub expired: usize,
    pub freed_bytes: u64,
}

impl ExpireChunksOperation {
    pub fn new(chunk_store: Arc<ChunkStore>) -> Self {
        Self { chunk_store }
    }

    pub async fn run(
        &self,
        request: ExpireChunksOperationRequest,
    ) -> Result<ExpireChunksOperationResult> {
        let removal = self.chunk_store.expire_older_than(request.ttl).await?;

        if removal.removed > 0 {
            tracing::info!(
                "Expired {} staged chunks older than {:?} ({} bytes)",
                removal.removed,
                request.ttl,
                removal.freed_bytes
            );
        }

        Ok(ExpireChunksOperationResult {
            expired: removal.removed,
            freed_bytes: removal.freed_bytes,
        })
    }
}
