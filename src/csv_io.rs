// CSV import/export
// Header: date,amount,category,sub_category,description

use crate::db::{ImportReport, RejectedRow, TransactionStore};
use crate::error::Result;
use crate::models::{AmountInput, Transaction, TransactionInput, DATE_FORMAT};
use crate::schema::ValidationError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CsvRecord {
    date: String,
    amount: String,
    category: String,
    #[serde(default)]
    sub_category: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl From<CsvRecord> for TransactionInput {
    fn from(record: CsvRecord) -> Self {
        TransactionInput {
            date: Some(record.date),
            amount: Some(AmountInput::Text(record.amount)),
            category: Some(record.category),
            sub_category: record.sub_category,
            description: record.description,
        }
    }
}

impl From<&Transaction> for CsvRecord {
    fn from(tx: &Transaction) -> Self {
        CsvRecord {
            date: tx.date.format(DATE_FORMAT).to_string(),
            amount: tx.amount.to_string(),
            category: tx.category.as_str().to_string(),
            sub_category: tx.sub_category.clone(),
            description: tx.description.clone(),
        }
    }
}

/// Rows read from a CSV file, paired with their 1-based line numbers
#[derive(Debug, Clone, Default)]
pub struct CsvRows {
    pub rows: Vec<(usize, TransactionInput)>,
    /// Rows that could not be read into fields at all
    pub rejected: Vec<RejectedRow>,
}

fn unreadable_row(line: usize, err: &csv::Error) -> RejectedRow {
    warn!(line, error = %err, "skipping unreadable row");
    RejectedRow {
        line,
        errors: vec![ValidationError::new("row", err.to_string())],
    }
}

/// Read raw rows. Short rows leave the trailing optional columns empty;
/// rows that cannot be read are reported instead of aborting the load.
pub fn load_csv(csv_path: &Path) -> Result<CsvRows> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(csv_path)?;

    let headers = rdr.headers()?.clone();

    let mut loaded = CsvRows::default();
    let mut last_line = 1;
    for result in rdr.records() {
        let raw = match result {
            Ok(raw) => raw,
            Err(err) => {
                let line = err
                    .position()
                    .map(|pos| pos.line() as usize)
                    .unwrap_or(last_line + 1);
                last_line = line;
                loaded.rejected.push(unreadable_row(line, &err));
                continue;
            }
        };
        let line = raw
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(last_line + 1);
        last_line = line;

        match raw.deserialize::<CsvRecord>(Some(&headers)) {
            Ok(record) => loaded.rows.push((line, record.into())),
            Err(err) => loaded.rejected.push(unreadable_row(line, &err)),
        }
    }

    Ok(loaded)
}

pub fn import_csv(store: &TransactionStore, csv_path: &Path) -> Result<ImportReport> {
    let loaded = load_csv(csv_path)?;
    info!(
        path = %csv_path.display(),
        rows = loaded.rows.len(),
        unreadable = loaded.rejected.len(),
        "csv loaded"
    );

    let mut report = store.import(&loaded.rows)?;
    report.rejected.extend(loaded.rejected);
    report.rejected.sort_by_key(|row| row.line);
    Ok(report)
}

pub fn write_csv<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for tx in transactions {
        wtr.serialize(CsvRecord::from(tx))?;
    }
    wtr.flush()?;
    Ok(())
}
