// 📐 Shape Layer - Input Validation
// Turns raw client input into typed values, collecting every field error

use crate::models::{AmountInput, Category, NewTransaction, TransactionInput, DATE_FORMAT};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MAX_SUB_CATEGORY_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 255;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = Result<T, Vec<ValidationError>>;

// ============================================================================
// FIELD PARSERS
// ============================================================================

fn required<'a>(value: Option<&'a str>, field: &str, errors: &mut Vec<ValidationError>) -> Option<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.push(ValidationError::new(field, "Required field is missing"));
            None
        }
    }
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        ValidationError::new(
            field,
            format!("Must be a calendar date in YYYY-MM-DD format (got '{}')", raw.trim()),
        )
    })
}

fn parse_amount(raw: &AmountInput) -> Result<f64, ValidationError> {
    let value = match raw {
        AmountInput::Number(n) => *n,
        AmountInput::Text(s) => s.trim().parse::<f64>().map_err(|_| {
            ValidationError::new("amount", format!("Must be numeric (got '{}')", s.trim()))
        })?,
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::new("amount", "Must be a finite number"))
    }
}

/// Trim optional text; blank becomes None
fn optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    let text = value.map(str::trim).filter(|v| !v.is_empty())?;
    if text.chars().count() > max_len {
        errors.push(ValidationError::new(
            field,
            format!("Must be at most {} characters", max_len),
        ));
        return None;
    }
    Some(text.to_string())
}

// ============================================================================
// TRANSACTION VALIDATION
// ============================================================================

/// Validate a raw transaction payload
///
/// Required: date (YYYY-MM-DD), amount (finite number), category (Income/Expense).
/// Optional: sub_category, description (trimmed, blank treated as absent).
pub fn validate_transaction(input: &TransactionInput) -> ValidationResult<NewTransaction> {
    let mut errors = Vec::new();

    let date = required(input.date.as_deref(), "date", &mut errors)
        .and_then(|raw| parse_date("date", raw).map_err(|e| errors.push(e)).ok());

    let amount = match &input.amount {
        Some(raw) => parse_amount(raw).map_err(|e| errors.push(e)).ok(),
        None => {
            errors.push(ValidationError::new("amount", "Required field is missing"));
            None
        }
    };

    let category = required(input.category.as_deref(), "category", &mut errors).and_then(|raw| {
        raw.parse::<Category>()
            .map_err(|msg| errors.push(ValidationError::new("category", msg)))
            .ok()
    });

    let sub_category = optional_text(
        input.sub_category.as_deref(),
        "sub_category",
        MAX_SUB_CATEGORY_LEN,
        &mut errors,
    );
    let description = optional_text(
        input.description.as_deref(),
        "description",
        MAX_DESCRIPTION_LEN,
        &mut errors,
    );

    match (date, amount, category) {
        (Some(date), Some(amount), Some(category)) if errors.is_empty() => Ok(NewTransaction {
            date,
            amount,
            category,
            sub_category,
            description,
        }),
        _ => Err(errors),
    }
}

// ============================================================================
// DATE RANGE
// ============================================================================

/// Inclusive calendar range `[start, end]`. Only built through `new`/`parse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> ValidationResult<Self> {
        if start_date > end_date {
            return Err(vec![ValidationError::new(
                "date_range",
                format!(
                    "start_date ({}) must not be after end_date ({})",
                    start_date, end_date
                ),
            )]);
        }
        Ok(DateRange { start_date, end_date })
    }

    /// Parse query-string bounds, reporting missing and malformed values together
    pub fn parse(start: Option<&str>, end: Option<&str>) -> ValidationResult<Self> {
        let mut errors = Vec::new();

        let start_date = required(start, "start_date", &mut errors)
            .and_then(|raw| parse_date("start_date", raw).map_err(|e| errors.push(e)).ok());
        let end_date = required(end, "end_date", &mut errors)
            .and_then(|raw| parse_date("end_date", raw).map_err(|e| errors.push(e)).ok());

        match (start_date, end_date) {
            (Some(start_date), Some(end_date)) if errors.is_empty() => {
                DateRange::new(start_date, end_date)
            }
            _ => Err(errors),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

// ============================================================================
// TESTS
// ============================================================================
