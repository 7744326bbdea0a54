use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use finance_tracker::logging::init_tracing;
use finance_tracker::{
    import_csv, write_csv, AmountInput, DateRange, Error, HealthReport, SummaryReport,
    TransactionInput, TransactionStore,
};

#[derive(Parser)]
#[command(name = "finance-tracker", version, about = "Personal income/expense tracker")]
struct Cli {
    /// SQLite database file (":memory:" for a throwaway store)
    #[arg(long, env = "FT_DB_PATH", default_value = "finance.db", global = true)]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a single transaction
    Add {
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
        /// Income or Expense
        #[arg(long)]
        category: String,
        #[arg(long)]
        sub_category: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Import transactions from a CSV file (re-importing skips rows already stored)
    Import { file: PathBuf },
    /// Export transactions in a date range as CSV
    Export {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show totals and transactions in a date range
    Summary {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Show the health score for a date range
    Health {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("warn", false);

    let cli = Cli::parse();
    let store = TransactionStore::open(&cli.db)
        .with_context(|| format!("Failed to open database at {}", cli.db.display()))?;

    match cli.command {
        Command::Add {
            date,
            amount,
            category,
            sub_category,
            description,
        } => run_add(
            &store,
            TransactionInput {
                date: Some(date),
                amount: Some(AmountInput::Text(amount)),
                category: Some(category),
                sub_category,
                description,
            },
        ),
        Command::Import { file } => run_import(&store, &file),
        Command::Export { start, end, output } => run_export(&store, &start, &end, output),
        Command::Summary { start, end } => run_summary(&store, &start, &end),
        Command::Health { start, end } => run_health(&store, &start, &end),
    }
}

fn parse_range(start: &str, end: &str) -> Result<DateRange> {
    DateRange::parse(Some(start), Some(end)).map_err(|errors| Error::Validation(errors).into())
}

fn run_add(store: &TransactionStore, input: TransactionInput) -> Result<()> {
    let tx = store.insert(&input)?;
    println!(
        "✓ Recorded #{}: {} {} {:.2}",
        tx.id, tx.date, tx.category, tx.amount
    );
    Ok(())
}

fn run_import(store: &TransactionStore, file: &Path) -> Result<()> {
    println!("📂 Importing {}...", file.display());

    let report = import_csv(store, file)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    println!("✓ Inserted: {} transactions", report.inserted);
    println!("✓ Skipped duplicates: {}", report.duplicates);
    if !report.rejected.is_empty() {
        println!("✗ Rejected: {} rows", report.rejected.len());
        for row in &report.rejected {
            for err in &row.errors {
                println!("   line {}: {}", row.line, err);
            }
        }
    }
    println!("✓ Database contains {} transactions", store.count()?);

    Ok(())
}

fn run_export(store: &TransactionStore, start: &str, end: &str, output: Option<PathBuf>) -> Result<()> {
    let range = parse_range(start, end)?;
    let transactions = store.query(&range)?;

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_csv(file, &transactions)?;
            eprintln!("✓ Exported {} transactions to {}", transactions.len(), path.display());
        }
        None => write_csv(io::stdout().lock(), &transactions)?,
    }

    Ok(())
}

fn run_summary(store: &TransactionStore, start: &str, end: &str) -> Result<()> {
    let range = parse_range(start, end)?;
    let report = SummaryReport::build(&range, store.query(&range)?);

    println!("📊 Summary {} → {}", report.start_date, report.end_date);
    println!("   Total Income:  {:>12.2}", report.summary.total_income);
    println!("   Total Expense: {:>12.2}", report.summary.total_expense);
    println!("   Net Savings:   {:>12.2}", report.summary.net_savings);

    if report.transactions.is_empty() {
        println!("\n   No transactions in range");
        return Ok(());
    }

    println!(
        "\n   {:<6} {:<10} {:>12} {:<8} {:<14} {}",
        "ID", "Date", "Amount", "Category", "Sub-category", "Description"
    );
    for tx in &report.transactions {
        println!(
            "   {:<6} {:<10} {:>12.2} {:<8} {:<14} {}",
            tx.id,
            tx.date,
            tx.amount,
            tx.category,
            tx.sub_category.as_deref().unwrap_or("-"),
            tx.description.as_deref().unwrap_or("")
        );
    }

    Ok(())
}

fn run_health(store: &TransactionStore, start: &str, end: &str) -> Result<()> {
    let range = parse_range(start, end)?;
    let transactions = store.query(&range)?;
    let report = HealthReport::build(&range, &transactions);
    let health = &report.health;

    println!("🩺 Health {} → {}", report.start_date, report.end_date);
    println!("   Score:        {} / 100 ({})", health.score, health.label);
    match health.savings_rate {
        Some(rate) => println!("   Savings rate: {:.1}%", rate * 100.0),
        None => println!("   Savings rate: n/a (no income)"),
    }

    if !health.expense_breakdown.is_empty() {
        println!("\n   Expense breakdown:");
        for (sub_category, share) in &health.expense_breakdown {
            println!("   {:<16} {:>6.1}%", sub_category, share * 100.0);
        }
    }

    Ok(())
}
