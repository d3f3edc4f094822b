//! SQLite access to the quote table

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;

use crate::clock::MINUTES_PER_DAY;
use crate::storage::models::{NewQuote, Quote};
use crate::{ProseClockError, Result};

/// Rows are addressed through `rowid` so seeds keyed by either `id` or `_id` read the same.
const LOOKUP_SQL: &str = "SELECT rowid, minute, text, author, book
     FROM quotes
     WHERE minute = ?1
     ORDER BY RANDOM()
     LIMIT 1";

const SEED_SCHEMA_VERSION: i64 = 1;

/// Connection to a quote store
pub struct QuoteStore {
    conn: Connection,
}

impl QuoteStore {
    /// Open an existing store read-only.
    ///
    /// Fails if the file is missing or has no `quotes` table.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| ProseClockError::StorageOpen(format!("{}: {}", path.display(), e)))?;

        let store = Self { conn };
        store.check_schema().map_err(|e| {
            ProseClockError::StorageOpen(format!("{}: {}", path.display(), e))
        })?;

        Ok(store)
    }

    /// Create a fresh seed store at `path` with an empty `quotes` table
    pub fn create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Err(ProseClockError::Import(format!(
                "{} already exists",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.create_schema()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing)
    #[cfg(test)]
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.create_schema()?;
        Ok(store)
    }

    fn check_schema(&self) -> rusqlite::Result<()> {
        self.conn.prepare_cached(LOOKUP_SQL)?;
        Ok(())
    }

    fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS quotes (
                id INTEGER PRIMARY KEY,
                minute INTEGER NOT NULL,
                text TEXT NOT NULL,
                author TEXT NOT NULL,
                book TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_quotes_minute ON quotes(minute);
            "#,
        )?;

        self.conn.execute(
            &format!("PRAGMA user_version = {}", SEED_SCHEMA_VERSION),
            [],
        )?;
        Ok(())
    }

    /// Insert quotes in a single transaction, returning how many were written
    pub fn insert_quotes(&self, quotes: &[NewQuote]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;

        for quote in quotes {
            tx.execute(
                "INSERT INTO quotes (minute, text, author, book) VALUES (?1, ?2, ?3, ?4)",
                params![quote.minute, quote.text, quote.author, quote.book],
            )?;
        }

        tx.commit()?;
        Ok(quotes.len())
    }

    /// Pick one quote for `minute` at random, if any exists
    pub fn random_for_minute(&self, minute: i32) -> Result<Option<Quote>> {
        let mut stmt = self.conn.prepare_cached(LOOKUP_SQL)?;

        let quote = stmt
            .query_row(params![minute], |row| {
                Ok(Quote {
                    id: row.get(0)?,
                    minute: row.get(1)?,
                    text: row.get(2)?,
                    author: row.get(3)?,
                    book: row.get(4)?,
                })
            })
            .optional()?;

        Ok(quote)
    }

    /// Distinct minutes of day that have at least one quote, ascending
    pub fn covered_minutes(&self) -> Result<Vec<i32>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT minute FROM quotes
             WHERE minute >= 0 AND minute < ?1
             ORDER BY minute",
        )?;

        let minutes = stmt
            .query_map(params![MINUTES_PER_DAY], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i32>>>()?;

        Ok(minutes)
    }

    /// Get store statistics
    pub fn get_stats(&self) -> Result<StoreStats> {
        let total_quotes: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM quotes", [], |row| row.get(0))?;

        let covered = self.covered_minutes()?;

        Ok(StoreStats {
            total_quotes: total_quotes as usize,
            covered_minutes: covered.len(),
            longest_gap: longest_gap(&covered),
        })
    }
}

/// Store statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub total_quotes: usize,
    pub covered_minutes: usize,
    /// Longest run of consecutive minutes without a quote (midnight does not wrap)
    pub longest_gap: usize,
}

fn longest_gap(covered: &[i32]) -> usize {
    let mut longest = 0;
    let mut previous = -1;

    for &minute in covered.iter().chain(std::iter::once(&MINUTES_PER_DAY)) {
        let gap = (minute - previous - 1).max(0) as usize;
        longest = longest.max(gap);
        previous = minute;
    }

    longest
}
