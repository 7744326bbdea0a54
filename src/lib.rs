// Finance Tracker - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod error;
pub mod models;
pub mod schema;     // Input validation
pub mod db;         // Transaction Store
pub mod summary;    // Aggregation: totals
pub mod health;     // Aggregation: health score
pub mod csv_io;
pub mod config;
pub mod logging;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{Error, Result};
pub use models::{AmountInput, Category, NewTransaction, Transaction, TransactionInput};
pub use schema::{validate_transaction, DateRange, ValidationError};
pub use db::{
    ImportReport, RejectedRow, TransactionStore,
    setup_database, insert_transaction, get_transactions_in_range,
    import_transactions, verify_count,
};
pub use summary::{summarize, Summary, SummaryReport};
pub use health::{health_score, HealthLabel, HealthReport, HealthScore};
pub use csv_io::{import_csv, load_csv, write_csv, CsvRows};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
