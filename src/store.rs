use crate::models::{Category, ListingRecord};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::path::Path;
use thiserror::Error;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Store failures, split by operation so the per-category catch can
/// report connectivity problems and data problems differently.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open store at {path}: {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },
    #[error("failed to read existing keys from {table}: {source}")]
    Read {
        table: &'static str,
        source: rusqlite::Error,
    },
    #[error("constraint violation while writing to {table}: {source}")]
    Constraint {
        table: &'static str,
        source: rusqlite::Error,
    },
    #[error("failed to write to {table}: {source}")]
    Write {
        table: &'static str,
        source: rusqlite::Error,
    },
}

/// Single connection to the persistent store, opened once per run and
/// shared by both categories. No transaction spans the two category
/// tables; each category's write stands on its own.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the store from a connection string: a filesystem path, with
    /// an optional sqlite:// scheme prefix accepted.
    pub fn open(database: &str) -> Result<Store, StoreError> {
        let path = database.strip_prefix("sqlite://").unwrap_or(database);
        let conn = Connection::open(Path::new(path)).map_err(|source| StoreError::Open {
            path: path.to_string(),
            source,
        })?;
        Ok(Store { conn })
    }

    pub fn open_in_memory() -> Result<Store, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: ":memory:".to_string(),
            source,
        })?;
        Ok(Store { conn })
    }

    /// Create both category tables when missing. `id` is the logical key
    /// for dedup purposes; it is deliberately not a UNIQUE column, the
    /// sync step is what keeps the tables duplicate-free.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        for category in Category::ALL {
            let table = category.table();
            self.conn
                .execute_batch(&format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        id TEXT NOT NULL,
                        post_link TEXT NOT NULL,
                        region TEXT NOT NULL,
                        post_datetime TEXT NOT NULL,
                        neighborhood TEXT NOT NULL,
                        title TEXT NOT NULL,
                        price INTEGER NOT NULL
                    )",
                    table
                ))
                .map_err(|source| StoreError::Write { table, source })?;
        }
        Ok(())
    }

    /// All (id, post_link) pairs currently persisted for a category.
    pub fn existing_keys(&self, category: Category) -> Result<Vec<(String, String)>, StoreError> {
        let table = category.table();
        let read_err = |source| StoreError::Read { table, source };

        let mut stmt = self
            .conn
            .prepare(&format!("SELECT id, post_link FROM {}", table))
            .map_err(read_err)?;
        let pairs = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(read_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_err)?;

        Ok(pairs)
    }

    /// Append records to a category table in one batch. The write is
    /// transactional: either every row lands or none do.
    pub fn append_listings(
        &mut self,
        category: Category,
        records: &[ListingRecord],
    ) -> Result<usize, StoreError> {
        let table = category.table();
        let tx = self
            .conn
            .transaction()
            .map_err(|source| StoreError::Write { table, source })?;

        {
            let mut stmt = tx
                .prepare(&format!(
                    "INSERT INTO {} (id, post_link, region, post_datetime, neighborhood, title, price)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    table
                ))
                .map_err(|source| StoreError::Write { table, source })?;

            for record in records {
                stmt.execute(params![
                    record.id,
                    record.post_link,
                    record.region,
                    record.post_datetime.format(DATETIME_FORMAT).to_string(),
                    record.neighborhood,
                    record.title,
                    record.price,
                ])
                .map_err(|source| classify_write_error(table, source))?;
            }
        }

        tx.commit()
            .map_err(|source| StoreError::Write { table, source })?;
        Ok(records.len())
    }

    /// Full table read, used for the dashboard snapshot and CSV export.
    pub fn load_listings(&self, category: Category) -> Result<Vec<ListingRecord>, StoreError> {
        let table = category.table();
        let read_err = |source| StoreError::Read { table, source };

        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT id, post_link, region, post_datetime, neighborhood, title, price FROM {}",
                table
            ))
            .map_err(read_err)?;
        let records = stmt
            .query_map([], |row| {
                let datetime: String = row.get(3)?;
                let post_datetime = NaiveDateTime::parse_from_str(&datetime, DATETIME_FORMAT)
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            3,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                Ok(ListingRecord {
                    id: row.get(0)?,
                    post_link: row.get(1)?,
                    region: row.get(2)?,
                    post_datetime,
                    neighborhood: row.get(4)?,
                    title: row.get(5)?,
                    price: row.get(6)?,
                })
            })
            .map_err(read_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_err)?;

        Ok(records)
    }
}

fn classify_write_error(table: &'static str, source: rusqlite::Error) -> StoreError {
    match &source {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::Constraint { table, source }
        }
        _ => StoreError::Write { table, source },
    }
}
