// Transaction data model
// Raw client input, validated records ready for storage, and stored records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire and storage format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Money coming in
    Income,

    /// Money going out
    Expense,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Income => "Income",
            Category::Expense => "Expense",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("income") {
            Ok(Category::Income)
        } else if s.eq_ignore_ascii_case("expense") {
            Ok(Category::Expense)
        } else {
            Err(format!("Must be one of Income, Expense (got '{}')", s))
        }
    }
}

// ============================================================================
// STORED TRANSACTION
// ============================================================================

/// A persisted transaction. Never mutated after the store returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Assigned by the store, never reused
    pub id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub category: Category,
    pub sub_category: Option<String>,
    pub description: Option<String>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.category == Category::Expense
    }
}

// ============================================================================
// VALIDATED INPUT
// ============================================================================

/// A transaction that passed validation and has no id yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub amount: f64,
    pub category: Category,
    pub sub_category: Option<String>,
    pub description: Option<String>,
}

impl NewTransaction {
    pub fn new(date: NaiveDate, amount: f64, category: Category) -> Self {
        NewTransaction {
            date,
            amount,
            category,
            sub_category: None,
            description: None,
        }
    }

    pub fn with_sub_category(mut self, sub_category: &str) -> Self {
        self.sub_category = Some(sub_category.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Attach the id assigned by the store
    pub fn into_transaction(self, id: i64) -> Transaction {
        Transaction {
            id,
            date: self.date,
            amount: self.amount,
            category: self.category,
            sub_category: self.sub_category,
            description: self.description,
        }
    }
}

// ============================================================================
// RAW INPUT
// ============================================================================

/// Amount as sent by a client: JSON number, or text from a form/CSV cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        AmountInput::Number(value)
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        AmountInput::Text(value.to_string())
    }
}

/// Unvalidated transaction payload (HTTP body, CLI arguments, CSV row).
/// Every field is optional so that validation can report all problems at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub amount: Option<AmountInput>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub sub_category: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}
