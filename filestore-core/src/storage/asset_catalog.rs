use crate::error::Result;
use crate::types::{Asset, AssetSummary, CallerId, ContentEncoding};
use bytes::Bytes;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::PathBuf;
use std::time::Duration;

const SUMMARY_COLUMNS: &str = "asset_id, owner, filename, content_type, content_encoding,
    checksum, size, chunk_count, sha256, created_at";

/// Durable catalog of committed assets, backed by SQLite.
pub struct AssetCatalog {
    db_path: PathBuf,
}

impl AssetCatalog {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let catalog = Self { db_path };
        catalog.init_schema()?;
        Ok(catalog)
    }

    fn get_conn(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.get_conn()?;

        // pk keeps insertion order for listing
        conn.execute(
            "CREATE TABLE IF NOT EXISTS assets (
                pk INTEGER PRIMARY KEY AUTOINCREMENT,
                asset_id TEXT NOT NULL UNIQUE,
                owner TEXT NOT NULL,
                filename TEXT NOT NULL,
                content_type TEXT NOT NULL,
                content_encoding TEXT NOT NULL,
                checksum INTEGER NOT NULL,
                size INTEGER NOT NULL,
                chunk_count INTEGER NOT NULL,
                sha256 TEXT NOT NULL,
                created_at TEXT NOT NULL,
                content BLOB NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Store a newly committed asset.
    pub fn insert(&self, asset: &Asset) -> Result<()> {
        let conn = self.get_conn()?;

        conn.execute(
            "INSERT INTO assets (
                asset_id, owner, filename, content_type, content_encoding,
                checksum, size, chunk_count, sha256, created_at, content
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                asset.id,
                asset.owner.as_str(),
                asset.filename,
                asset.content_type,
                asset.content_encoding.as_str(),
                asset.checksum as i64,
                asset.size as i64,
                asset.chunk_count as i64,
                asset.sha256,
                asset.created_at.to_rfc3339(),
                asset.content.as_ref(),
            ],
        )?;

        Ok(())
    }

    /// Fetch an asset with its content.
    pub fn get(&self, asset_id: &str) -> Result<Option<Asset>> {
        let conn = self.get_conn()?;

        let row: Option<(AssetSummary, Vec<u8>)> = conn
            .query_row(
                &format!(
                    "SELECT {}, content FROM assets WHERE asset_id = ?1",
                    SUMMARY_COLUMNS
                ),
                [asset_id],
                |row| Ok((summary_from_row(row)?, row.get(10)?)),
            )
            .optional()?;

        Ok(row.map(|(summary, content)| Asset {
            id: summary.id,
            owner: summary.owner,
            filename: summary.filename,
            content_type: summary.content_type,
            content_encoding: summary.content_encoding,
            checksum: summary.checksum,
            size: summary.size,
            chunk_count: summary.chunk_count,
            sha256: summary.sha256,
            created_at: summary.created_at,
            content: Bytes::from(content),
        }))
    }

    /// List asset metadata in insertion order, without content.
    pub fn list(&self) -> Result<Vec<AssetSummary>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM assets ORDER BY pk ASC",
            SUMMARY_COLUMNS
        ))?;
        let rows = stmt.query_map([], summary_from_row)?;

        let mut assets = Vec::new();
        for row in rows {
            assets.push(row?);
        }

        Ok(assets)
    }

    /// Delete an asset. Returns the freed content size, or `None` if absent.
    pub fn delete(&self, asset_id: &str) -> Result<Option<u64>> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let size: Option<i64> = tx
            .query_row(
                "SELECT size FROM assets WHERE asset_id = ?1",
                [asset_id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(size) = size else {
            return Ok(None);
        };

        tx.execute("DELETE FROM assets WHERE asset_id = ?1", [asset_id])?;
        tx.commit()?;

        Ok(Some(size as u64))
    }

    pub fn exists(&self, asset_id: &str) -> Result<bool> {
        let conn = self.get_conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT pk FROM assets WHERE asset_id = ?1",
                [asset_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Total content bytes held by the catalog.
    pub fn total_size(&self) -> Result<u64> {
        let conn = self.get_conn()?;
        let total: i64 = conn.query_row("SELECT COALESCE(SUM(size), 0) FROM assets", [], |row| {
            row.get(0)
        })?;
        Ok(total as u64)
    }
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<AssetSummary> {
    let owner: String = row.get(1)?;
    let content_encoding: String = row.get(4)?;
    let checksum: i64 = row.get(5)?;
    let size: i64 = row.get(6)?;
    let chunk_count: i64 = row.get(7)?;
    let created_at: String = row.get(9)?;

    Ok(AssetSummary {
        id: row.get(0)?,
        owner: CallerId::new(owner).map_err(decode_error(1))?,
        filename: row.get(2)?,
        content_type: row.get(3)?,
        content_encoding: content_encoding
            .parse::<ContentEncoding>()
            .map_err(decode_error(4))?,
        checksum: checksum as u32,
        size: size as u64,
        chunk_count: chunk_count as u32,
        sha256: row.get(8)?,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
            .map_err(decode_error(9))?
            .with_timezone(&chrono::Utc),
    })
}

/// Maps a failure to decode text column `column` into a rusqlite error.
fn decode_error<E>(column: usize) -> impl FnOnce(E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |error| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(error))
}
