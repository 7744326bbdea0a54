// 📊 Summary - income/expense totals over a set of transactions

use crate::models::{Category, Transaction};
use crate::schema::DateRange;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Add;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_savings: f64,
}

impl Add for Summary {
    type Output = Summary;

    fn add(self, other: Summary) -> Summary {
        Summary {
            total_income: self.total_income + other.total_income,
            total_expense: self.total_expense + other.total_expense,
            net_savings: self.net_savings + other.net_savings,
        }
    }
}

/// Sum amounts by category; amounts are taken at face value
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut total_income = 0.0;
    let mut total_expense = 0.0;

    for tx in transactions {
        match tx.category {
            Category::Income => total_income += tx.amount,
            Category::Expense => total_expense += tx.amount,
        }
    }

    Summary {
        total_income,
        total_expense,
        net_savings: total_income - total_expense,
    }
}

/// Range report returned by `GET /transactions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(flatten)]
    pub summary: Summary,
    pub transactions: Vec<Transaction>,
}

impl SummaryReport {
    pub fn build(range: &DateRange, transactions: Vec<Transaction>) -> Self {
        SummaryReport {
            start_date: range.start_date,
            end_date: range.end_date,
            summary: summarize(&transactions),
            transactions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTransaction;

    fn tx(id: i64, day: u32, amount: f64, category: Category) -> Transaction {
        NewTransaction::new(NaiveDate::from_ymd_opt(2024, 1, day).unwrap(), amount, category)
            .into_transaction(id)
    }

    #[test]
    fn test_summarize_empty_is_zero() {
        assert_eq!(summarize(&[]), Summary::default());
    }

    #[test]
    fn test_summarize_income_and_expense() {
        let txs = vec![
            tx(1, 5, 1000.0, Category::Income),
            tx(2, 10, 200.0, Category::Expense),
        ];

        let summary = summarize(&txs);
        assert_eq!(summary.total_income, 1000.0);
        assert_eq!(summary.total_expense, 200.0);
        assert_eq!(summary.net_savings, 800.0);
    }

    #[test]
    fn test_summarize_takes_amounts_at_face_value() {
        let txs = vec![
            tx(1, 5, 50.0, Category::Income),
            tx(2, 6, -20.0, Category::Expense),
        ];

        let summary = summarize(&txs);
        assert_eq!(summary.total_expense, -20.0);
        assert_eq!(summary.net_savings, 70.0);
    }

    #[test]
    fn test_summarize_is_additive_over_disjoint_sets() {
        let a = vec![
            tx(1, 1, 1500.0, Category::Income),
            tx(2, 2, 250.5, Category::Expense),
        ];
        let b = vec![
            tx(3, 3, 300.25, Category::Income),
            tx(4, 4, 75.0, Category::Expense),
            tx(5, 5, 12.5, Category::Expense),
        ];
        let union: Vec<Transaction> = a.iter().chain(b.iter()).cloned().collect();

        assert_eq!(summarize(&union), summarize(&a) + summarize(&b));
    }

    #[test]
    fn test_report_flattens_totals() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap();
        let report = SummaryReport::build(&range, vec![tx(1, 5, 1000.0, Category::Income)]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["start_date"], "2024-01-01");
        assert_eq!(json["total_income"], 1000.0);
        assert_eq!(json["net_savings"], 1000.0);
        assert_eq!(json["transactions"].as_array().unwrap().len(), 1);
    }
}
