// 🩺 Health Score - savings rate, spending mix, and a 0-100 wellness score
//
// Scoring starts at MAX_SCORE and subtracts fixed penalties:
// - savings rate (or missing income)
// - discretionary spending share (Shopping + Entertainment)
// - food spending share
// The result is clamped to [MIN_SCORE, MAX_SCORE] and bucketed into a label.

use crate::models::Transaction;
use crate::schema::DateRange;
use crate::summary::summarize;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// CONSTANTS
// ============================================================================

pub const MAX_SCORE: i32 = 100;
pub const MIN_SCORE: i32 = 0;

/// Applied instead of a savings-rate penalty when the range has no positive income
pub const NO_INCOME_PENALTY: i32 = 15;
pub const NEGATIVE_SAVINGS_PENALTY: i32 = 40;
pub const LOW_SAVINGS_RATE: f64 = 0.10;
pub const LOW_SAVINGS_PENALTY: i32 = 25;
pub const MODERATE_SAVINGS_RATE: f64 = 0.20;
pub const MODERATE_SAVINGS_PENALTY: i32 = 10;

pub const DISCRETIONARY_SUB_CATEGORIES: [&str; 2] = ["Shopping", "Entertainment"];
pub const DISCRETIONARY_HIGH_SHARE: f64 = 0.50;
pub const DISCRETIONARY_HIGH_PENALTY: i32 = 25;
pub const DISCRETIONARY_ELEVATED_SHARE: f64 = 0.30;
pub const DISCRETIONARY_ELEVATED_PENALTY: i32 = 10;

pub const FOOD_SUB_CATEGORY: &str = "Food";
pub const FOOD_HEAVY_SHARE: f64 = 0.50;
pub const FOOD_HEAVY_PENALTY: i32 = 10;

pub const HEALTHY_MIN_SCORE: u8 = 80;
pub const NEUTRAL_MIN_SCORE: u8 = 60;

/// Breakdown key for expenses recorded without a sub-category
pub const UNCATEGORIZED: &str = "Uncategorized";

// ============================================================================
// LABEL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthLabel {
    Healthy,
    Neutral,
    Risky,
}

impl HealthLabel {
    pub fn from_score(score: u8) -> Self {
        if score >= HEALTHY_MIN_SCORE {
            HealthLabel::Healthy
        } else if score >= NEUTRAL_MIN_SCORE {
            HealthLabel::Neutral
        } else {
            HealthLabel::Risky
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthLabel::Healthy => "Healthy",
            HealthLabel::Neutral => "Neutral",
            HealthLabel::Risky => "Risky",
        }
    }
}

impl std::fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// HEALTH SCORE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    pub score: u8,
    pub label: HealthLabel,
    /// `None` (JSON `null`) when there is no positive income
    pub savings_rate: Option<f64>,
    /// Expense sub-category -> fraction of total expense
    pub expense_breakdown: BTreeMap<String, f64>,
}

/// Fraction of total expense per expense sub-category; empty when there is no expense
pub fn expense_breakdown(transactions: &[Transaction], total_expense: f64) -> BTreeMap<String, f64> {
    let mut breakdown = BTreeMap::new();
    if total_expense <= 0.0 {
        return breakdown;
    }

    for tx in transactions.iter().filter(|tx| tx.is_expense()) {
        let key = tx.sub_category.as_deref().unwrap_or(UNCATEGORIZED);
        *breakdown.entry(key.to_string()).or_insert(0.0) += tx.amount;
    }

    for share in breakdown.values_mut() {
        *share /= total_expense;
    }

    breakdown
}

fn share_of(breakdown: &BTreeMap<String, f64>, sub_category: &str) -> f64 {
    breakdown
        .iter()
        .filter(|(key, _)| key.eq_ignore_ascii_case(sub_category))
        .map(|(_, share)| share)
        .sum()
}

fn savings_penalty(savings_rate: Option<f64>) -> i32 {
    let Some(savings_rate) = savings_rate else {
        return NO_INCOME_PENALTY;
    };

    if savings_rate < 0.0 {
        NEGATIVE_SAVINGS_PENALTY
    } else if savings_rate < LOW_SAVINGS_RATE {
        LOW_SAVINGS_PENALTY
    } else if savings_rate < MODERATE_SAVINGS_RATE {
        MODERATE_SAVINGS_PENALTY
    } else {
        0
    }
}

fn spending_mix_penalty(breakdown: &BTreeMap<String, f64>) -> i32 {
    let discretionary: f64 = DISCRETIONARY_SUB_CATEGORIES
        .iter()
        .map(|name| share_of(breakdown, name))
        .sum();

    let mut penalty = if discretionary > DISCRETIONARY_HIGH_SHARE {
        DISCRETIONARY_HIGH_PENALTY
    } else if discretionary > DISCRETIONARY_ELEVATED_SHARE {
        DISCRETIONARY_ELEVATED_PENALTY
    } else {
        0
    };

    if share_of(breakdown, FOOD_SUB_CATEGORY) > FOOD_HEAVY_SHARE {
        penalty += FOOD_HEAVY_PENALTY;
    }

    penalty
}

pub fn health_score(transactions: &[Transaction]) -> HealthScore {
    let summary = summarize(transactions);

    let savings_rate = (summary.total_income > 0.0).then(|| summary.net_savings / summary.total_income);

    let expense_breakdown = expense_breakdown(transactions, summary.total_expense);

    let raw = MAX_SCORE
        - savings_penalty(savings_rate)
        - spending_mix_penalty(&expense_breakdown);
    let score = raw.clamp(MIN_SCORE, MAX_SCORE) as u8;

    HealthScore {
        score,
        label: HealthLabel::from_score(score),
        savings_rate,
        expense_breakdown,
    }
}

/// Range report returned by `GET /health-score`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(flatten)]
    pub health: HealthScore,
}

impl HealthReport {
    pub fn build(range: &DateRange, transactions: &[Transaction]) -> Self {
        HealthReport {
            start_date: range.start_date,
            end_date: range.end_date,
            health: health_score(transactions),
        }
    }
}
