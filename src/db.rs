// 🗄️ Transaction Store - SQLite persistence
// Append-only: records are inserted and read back by date range, never updated

use crate::error::{Error, Result};
use crate::models::{Category, NewTransaction, Transaction, TransactionInput, DATE_FORMAT};
use crate::schema::{validate_transaction, DateRange, ValidationError};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL for file databases; in-memory databases report "memory" and ignore it
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    debug!(journal_mode = %mode, "journal mode set");

    // AUTOINCREMENT keeps ids from ever being reused
    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            amount REAL NOT NULL,
            category TEXT NOT NULL CHECK (category IN ('Income', 'Expense')),
            sub_category TEXT,
            description TEXT,
            import_hash TEXT UNIQUE,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date, id)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// ROW MAPPING
// ============================================================================

const SELECT_COLUMNS: &str = "SELECT id, date, amount, category, sub_category, description
     FROM transactions";

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let date_str: String = row.get(1)?;
    let category_str: String = row.get(3)?;

    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let category = category_str.parse::<Category>().map_err(|msg| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::new(ValidationError::new("category", msg)),
        )
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        date,
        amount: row.get(2)?,
        category,
        sub_category: row.get(4)?,
        description: row.get(5)?,
    })
}

// ============================================================================
// CONNECTION-LEVEL OPERATIONS
// ============================================================================

/// Insert a validated transaction and return it with its new id
pub fn insert_transaction(conn: &Connection, tx: &NewTransaction) -> Result<Transaction> {
    insert_row(conn, tx, None)?;
    let id = conn.last_insert_rowid();
    Ok(tx.clone().into_transaction(id))
}

fn insert_row(conn: &Connection, tx: &NewTransaction, import_hash: Option<&str>) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO transactions (date, amount, category, sub_category, description, import_hash)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            tx.date.format(DATE_FORMAT).to_string(),
            tx.amount,
            tx.category.as_str(),
            tx.sub_category,
            tx.description,
            import_hash,
        ],
    )
}

/// Transactions dated within the inclusive range, oldest first, ties in insertion order
pub fn get_transactions_in_range(conn: &Connection, range: &DateRange) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC, id ASC",
        SELECT_COLUMNS
    ))?;

    let transactions = stmt
        .query_map(
            params![
                range.start_date.format(DATE_FORMAT).to_string(),
                range.end_date.format(DATE_FORMAT).to_string(),
            ],
            row_to_transaction,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(transactions)
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;

    Ok(count)
}

// ============================================================================
// BULK IMPORT (idempotent)
// ============================================================================

/// Fingerprint of a row's content, used to skip rows already imported
///
/// `occurrence` distinguishes identical rows within one batch, so two equal
/// purchases on the same day both land, while re-importing the batch adds nothing.
pub fn compute_import_hash(tx: &NewTransaction, occurrence: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "{}|{}|{}|{}|{}|{}",
        tx.date.format(DATE_FORMAT),
        tx.amount,
        tx.category.as_str(),
        tx.sub_category.as_deref().unwrap_or(""),
        tx.description.as_deref().unwrap_or(""),
        occurrence
    ));
    format!("{:x}", hasher.finalize())
}

/// A row that failed validation during import
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub line: usize,
    pub errors: Vec<ValidationError>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub inserted: usize,
    pub duplicates: usize,
    pub rejected: Vec<RejectedRow>,
}

/// Import validated rows inside one SQLite transaction
pub fn import_transactions(conn: &Connection, rows: &[NewTransaction]) -> Result<ImportReport> {
    let db_tx = conn.unchecked_transaction()?;
    let mut report = ImportReport::default();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for tx in rows {
        let content_hash = compute_import_hash(tx, 0);
        let occurrence = seen.entry(content_hash).or_insert(0);
        let hash = compute_import_hash(tx, *occurrence);
        *occurrence += 1;

        match insert_row(&db_tx, tx, Some(&hash)) {
            Ok(_) => report.inserted += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                report.duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    db_tx.commit()?;

    info!(
        inserted = report.inserted,
        duplicates = report.duplicates,
        "import committed"
    );
    Ok(report)
}

// ============================================================================
// SHARED STORE
// ============================================================================

/// Thread-safe handle over one SQLite connection
///
/// Every operation takes the lock, so inserts are serialized and each read
/// sees a consistent snapshot.
pub struct TransactionStore {
    conn: Mutex<Connection>,
}

impl TransactionStore {
    pub fn new(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(TransactionStore {
            conn: Mutex::new(conn),
        })
    }

    /// Open a database file, or an in-memory database for `:memory:`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = if path == Path::new(":memory:") {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        info!(path = %path.display(), "transaction store opened");
        Self::new(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Validate and insert a raw payload
    pub fn insert(&self, input: &TransactionInput) -> Result<Transaction> {
        let tx = validate_transaction(input).map_err(|errors| {
            warn!(?errors, "rejected transaction");
            Error::Validation(errors)
        })?;
        self.insert_new(&tx)
    }

    pub fn insert_new(&self, tx: &NewTransaction) -> Result<Transaction> {
        let conn = self.lock()?;
        let stored = insert_transaction(&conn, tx)?;
        info!(
            id = stored.id,
            date = %stored.date,
            category = %stored.category,
            "transaction inserted"
        );
        Ok(stored)
    }

    pub fn query(&self, range: &DateRange) -> Result<Vec<Transaction>> {
        let conn = self.lock()?;
        let transactions = get_transactions_in_range(&conn, range)?;
        debug!(
            start = %range.start_date,
            end = %range.end_date,
            count = transactions.len(),
            "range query"
        );
        Ok(transactions)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        Ok(verify_count(&conn)? as usize)
    }

    /// Validate raw rows (with their source line numbers) and import the valid ones
    pub fn import(&self, rows: &[(usize, TransactionInput)]) -> Result<ImportReport> {
        let mut valid = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();

        for (line, input) in rows {
            match validate_transaction(input) {
                Ok(tx) => valid.push(tx),
                Err(errors) => {
                    warn!(line, ?errors, "skipping invalid row");
                    rejected.push(RejectedRow { line: *line, errors });
                }
            }
        }

        let conn = self.lock()?;
        let mut report = import_transactions(&conn, &valid)?;
        report.rejected = rejected;
        Ok(report)
    }
}
