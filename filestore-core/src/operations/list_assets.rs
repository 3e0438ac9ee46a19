use crate::{AssetCatalog, AssetSummary, CallerId, Result};
use std::sync::Arc;

#[derive(Clone)]
pub struct ListAssetsOperation {
    catalog: Arc<AssetCatalog>,
}

#[derive(Debug, Clone, Default)]
pub struct ListAssetsOperationRequest {
    /// Only list assets committed by this caller.
    pub owner: Option<CallerId>,
}

#[derive(Debug, Clone)]
pub struct ListAssetsOperationResult {
    pub items: Vec<AssetSummary>,
}

impl ListAssetsOperation {
    pub fn new(catalog: Arc<AssetCatalog>) -> Self {
        Self { catalog }
    }

    pub fn run(&self, request: ListAssetsOperationRequest) -> Result<ListAssetsOperationResult> {
        let mut items = self.catalog.list()?;
        if let Some(owner) = request.owner {
            items.retain(|item| item.owner == owner);
        }

        Ok(ListAssetsOperationResult { items })
    }
}
