use crate::{AssetCatalog, CapacityMonitor, Result};
use std::sync::Arc;

#[derive(Clone)]
pub struct DeleteAssetOperation {
    catalog: Arc<AssetCatalog>,
    capacity: Arc<CapacityMonitor>,
}

#[derive(Debug, Clone)]
pub struct DeleteAssetOperationRequest {
    pub asset_id: String,
}

#[derive(Debug, Clone)]
pub struct DeleteAssetOperationResult {
    pub asset_id: String,
    pub freed_bytes: u64,
}

#[derive(Debug, Clone)]
pub enum DeleteAssetOperationOutcome {
    Deleted(DeleteAssetOperationResult),
    NotFound,
}

impl DeleteAssetOperation {
    pub fn new(catalog: Arc<AssetCatalog>, capacity: Arc<CapacityMonitor>) -> Self {
        Self { catalog, capacity }
    }

    pub fn run(&self, request: DeleteAssetOperationRequest) -> Result<DeleteAssetOperationOutcome> {
        let DeleteAssetOperationRequest { asset_id } = request;

        let Some(freed_bytes) = self.catalog.delete(&asset_id)? else {
            return Ok(DeleteAssetOperationOutcome::NotFound);
        };

        self.capacity.release(freed_bytes);
        tracing::info!("Deleted asset {} ({} bytes)", asset_id, freed_bytes);

        Ok(DeleteAssetOperationOutcome::Deleted(
            DeleteAssetOperationResult {
                asset_id,
                freed_bytes,
            },
        ))
    }
}
