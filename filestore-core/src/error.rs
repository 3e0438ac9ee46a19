use thiserror::Error;

/// Errors surfaced by the filestore core.
///
/// The display strings of `NotOwner` and `ChecksumMismatch` are part of the
/// client contract and are returned verbatim by the commit protocol.
#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("Caller does not own the chunk.")]
    NotOwner,

    #[error("Checksum mismatch.")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("Capacity exceeded.")]
    CapacityExceeded { used: u64, threshold: u64 },

    #[error("Not found")]
    AssetNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, FileStoreError>;
