use crate::{Asset, AssetCatalog, Result};
use std::sync::Arc;

#[derive(Clone)]
pub struct ReadAssetOperation {
    catalog: Arc<AssetCatalog>,
}

#[derive(Debug, Clone)]
pub struct ReadAssetOperationRequest {
    pub asset_id: String,
}

#[derive(Debug, Clone)]
pub enum ReadAssetOperationOutcome {
    Found(Asset),
    NotFound,
}

impl ReadAssetOperation {
    pub fn new(catalog: Arc<AssetCatalog>) -> Self {
        Self { catalog }
    }

    pub fn run(&self, request: ReadAssetOperationRequest) -> Result<ReadAssetOperationOutcome> {
        match self.catalog.get(&request.asset_id)? {
            Some(asset) => Ok(ReadAssetOperationOutcome::Found(asset)),
            None => Ok(ReadAssetOperationOutcome::NotFound),
        }
    }
}
