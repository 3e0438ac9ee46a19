use crate::{CallerId, ChunkId, ChunkStore, Result};
use bytes::Bytes;
use std::sync::Arc;

#[derive(Clone)]
pub struct CreateChunkOperation {
    chunk_store: Arc<ChunkStore>,
}

#[derive(Debug, Clone)]
pub struct CreateChunkOperationRequest {
    pub caller: CallerId,
    pub content: Bytes,
    pub order: u32,
}

#[derive(Debug, Clone)]
pub struct CreateChunkOperationResult {
    pub chunk_id: ChunkId,
    pub size: u64,
}

impl CreateChunkOperation {
    pub fn new(chunk_store: Arc<ChunkStore>) -> Self {
        Self { chunk_store }
    }

    pub async fn run(
        &self,
        request: CreateChunkOperationRequest,
    ) -> Result<CreateChunkOperationResult> {
        let CreateChunkOperationRequest {
            caller,
            content,
            order,
        } = request;

        let size = content.len() as u64;
        let chunk_id = self.chunk_store.put_chunk(&caller, content, order).await?;

        Ok(CreateChunkOperationResult { chunk_id, size })
    }

    pub async fn chunks_available(&self, chunk_ids: &[ChunkId]) -> bool {
        self.chunk_store.chunks_exist(chunk_ids).await
    }
}
