pub mod commit_batch;
pub mod create_chunk;
pub mod delete_asset;
pub mod expire_chunks;
pub mod list_assets;
pub mod read_asset;

pub use commit_batch::{
    CommitBatchOperation, CommitBatchOperationRequest, CommitBatchOperationResult,
};
pub use create_chunk::{
    CreateChunkOperation, CreateChunkOperationRequest, CreateChunkOperationResult,
};
pub use delete_asset::{
    DeleteAssetOperation, DeleteAssetOperationOutcome, DeleteAssetOperationRequest,
    DeleteAssetOperationResult,
};
pub use expire_chunks::{
    ExpireChunksOperation, ExpireChunksOperationRequest, ExpireChunksOperationResult,
};
pub use list_assets::{ListAssetsOperation, ListAssetsOperationRequest, ListAssetsOperationResult};
pub use read_asset::{ReadAssetOperation, ReadAssetOperationOutcome, ReadAssetOperationRequest};
