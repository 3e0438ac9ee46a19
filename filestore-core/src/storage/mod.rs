//! Storage modules for Filestore
//!
//! Provides the volatile chunk staging area and the durable asset catalog.

pub mod asset_catalog;
pub mod chunk_store;

pub use asset_catalog::AssetCatalog;
pub use chunk_store::{ChunkRemoval, ChunkStore};
