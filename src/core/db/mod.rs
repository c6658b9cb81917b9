//! SQLite store adapter for tags and item-tag links
//!
//! This module wraps a single `rusqlite::Connection` and provides:
//! - Row, column, single-row and scalar query primitives
//! - A transaction guard whose nesting is counted, so helpers that open a
//!   transaction compose with callers that already hold one
//! - A read counter used to observe cache effectiveness
//!
//! Only the outermost guard issues `BEGIN`/`COMMIT`. A guard dropped without
//! `commit()` rolls back the whole transaction: immediately when it is the
//! outermost, otherwise when the outermost guard finishes.

mod schema;

pub use schema::SCHEMA_VERSION;

use std::cell::Cell;
use std::path::Path;
use std::time::Duration;

use rusqlite::types::FromSql;
use rusqlite::{Connection, OptionalExtension, Params, Row};
use tracing::{debug, warn};

use crate::core::error::{Result, TagError};

/// The tag store backed by SQLite
pub struct Database {
    conn: Connection,
    depth: Cell<u32>,
    rollback_only: Cell<bool>,
    reads: Cell<u64>,
}

impl Database {
    /// Open or create a store file
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a store file, waiting up to `busy_timeout_ms` for locks
    pub fn open_with_timeout(path: &Path, busy_timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;
        if let Some(timeout) = busy_timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        }
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store (tests, scratch work)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn,
            depth: Cell::new(0),
            rollback_only: Cell::new(false),
            reads: Cell::new(0),
        })
    }

    // =====================================================================
    // Transactions
    // =====================================================================

    /// Enter a transaction scope
    pub fn begin(&self) -> Result<Transaction<'_>> {
        let depth = self.depth.get();
        if depth == 0 {
            self.conn.execute_batch("BEGIN IMMEDIATE")?;
            self.rollback_only.set(false);
        }
        self.depth.set(depth + 1);
        Ok(Transaction {
            db: self,
            finished: false,
        })
    }

    /// Whether a transaction scope is currently open
    pub fn in_transaction(&self) -> bool {
        self.depth.get() > 0
    }

    fn finish(&self, commit: bool) -> Result<()> {
        let depth = self.depth.get();
        if depth == 0 {
            return Ok(());
        }
        self.depth.set(depth - 1);

        if depth > 1 {
            if !commit {
                debug!("nested transaction scope rolled back, outer scope will abort");
                self.rollback_only.set(true);
            }
            return Ok(());
        }

        let aborted = self.rollback_only.replace(false);
        if commit && !aborted {
            if let Err(e) = self.conn.execute_batch("COMMIT") {
                if let Err(rb) = self.conn.execute_batch("ROLLBACK") {
                    warn!("rollback after failed commit also failed: {}", rb);
                }
                return Err(e.into());
            }
            return Ok(());
        }

        self.conn.execute_batch("ROLLBACK")?;
        if commit {
            Err(TagError::TransactionAborted)
        } else {
            Ok(())
        }
    }

    // =====================================================================
    // Query primitives
    // =====================================================================

    /// Run a query and decode every row
    pub fn query_rows<T, P, F>(&self, sql: &str, params: P, mut decode: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> Result<T>,
    {
        self.count_read();
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(decode(row)?);
        }
        Ok(out)
    }

    /// Run a query and collect its first column
    pub fn column_query<T: FromSql, P: Params>(&self, sql: &str, params: P) -> Result<Vec<T>> {
        self.query_rows(sql, params, |row| Ok(row.get(0)?))
    }

    /// Run a query and decode only its first row
    pub fn row_query<T, P, F>(&self, sql: &str, params: P, decode: F) -> Result<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> Result<T>,
    {
        self.count_read();
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        match rows.next()? {
            Some(row) => Ok(Some(decode(row)?)),
            None => Ok(None),
        }
    }

    /// Run a query returning a single scalar
    pub fn value_query<T: FromSql, P: Params>(&self, sql: &str, params: P) -> Result<Option<T>> {
        self.count_read();
        Ok(self
            .conn
            .query_row(sql, params, |row| row.get(0))
            .optional()?)
    }

    /// Execute a single write statement, returning the number of changed rows
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        Ok(self.conn.execute(sql, params)?)
    }

    /// Execute several statements without parameters
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        Ok(self.conn.execute_batch(sql)?)
    }

    /// Row id assigned by the last successful insert
    pub fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// Create a temporary single-column id table filled with `ids`
    ///
    /// Duplicates are ignored; the table keeps first-seen insertion order.
    pub fn create_id_table(&self, table: &str, ids: &[i64]) -> Result<()> {
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS temp.{table}; CREATE TEMPORARY TABLE {table} (id INTEGER PRIMARY KEY ON CONFLICT IGNORE, seq INTEGER NOT NULL);"
        ))?;
        let mut stmt = self
            .conn
            .prepare(&format!("INSERT INTO {table} (id, seq) VALUES (?1, ?2)"))?;
        for (seq, id) in ids.iter().enumerate() {
            stmt.execute(rusqlite::params![id, seq as i64])?;
        }
        Ok(())
    }

    /// Drop a temporary table created by `create_id_table`
    pub fn drop_id_table(&self, table: &str) -> Result<()> {
        self.conn
            .execute_batch(&format!("DROP TABLE IF EXISTS temp.{table};"))?;
        Ok(())
    }

    /// Number of read queries issued so far
    pub fn read_count(&self) -> u64 {
        self.reads.get()
    }

    fn count_read(&self) {
        self.reads.set(self.reads.get() + 1);
    }
}

/// An open transaction scope; see the module docs for nesting rules
#[must_use = "a transaction rolls back when dropped without commit()"]
pub struct Transaction<'a> {
    db: &'a Database,
    finished: bool,
}

impl Transaction<'_> {
    /// Commit this scope
    ///
    /// For a nested scope this only closes the scope. For the outermost scope
    /// this commits, or rolls back and returns `TransactionAborted` if a
    /// nested scope was rolled back.
    pub fn commit(mut self) -> Result<()> {
        self.finished = true;
        self.db.finish(true)
    }

    /// Roll back this scope explicitly
    pub fn rollback(mut self) -> Result<()> {
        self.finished = true;
        self.db.finish(false)
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.db.finish(false) {
                warn!("failed to roll back transaction: {}", e);
            }
        }
    }
}
