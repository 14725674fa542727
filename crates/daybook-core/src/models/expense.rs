use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::lenient;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Expense {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "lenient::option_f64")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub formatted_amount: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub expense_date: Option<String>,
}

impl Expense {
    pub fn amount_display(&self) -> String {
        match (&self.formatted_amount, self.amount) {
            (Some(formatted), _) => formatted.clone(),
            (None, Some(amount)) => format!("{:.2}", amount),
            (None, None) => "-".to_string(),
        }
    }
}

/// Body for creating or replacing an expense.
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseInput {
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub expense_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ExpenseCategory {
    pub id: i64,
    pub name: String,
}

/// Response of `/expenses/dashboard`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ExpenseDashboard {
    #[serde(default)]
    pub summary: Option<ExpenseSummary>,
    #[serde(default)]
    pub category_breakdown: Vec<CategoryTotal>,
    #[serde(default)]
    pub recent_expenses: Vec<Expense>,
}

impl ExpenseDashboard {
    pub fn total_display(&self) -> String {
        self.summary
            .as_ref()
            .and_then(|s| s.total_expenses.as_ref())
            .and_then(|t| t.formatted.clone())
            .unwrap_or_else(|| "0.00".to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ExpenseSummary {
    #[serde(default)]
    pub total_expenses: Option<FormattedAmount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct FormattedAmount {
    #[serde(default, deserialize_with = "lenient::option_f64")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub formatted: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CategoryTotal {
    pub category: String,
    #[serde(default, deserialize_with = "lenient::option_f64")]
    pub total: Option<f64>,
    #[serde(default)]
    pub formatted_total: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dashboard() {
        let json = r#"{
            "summary": {"total_expenses": {"amount": "1520.50", "formatted": "৳1,520.50"}},
            "category_breakdown": [{"category": "food", "total": 820, "formatted_total": "৳820.00"}],
            "recent_expenses": [{"id": 3, "title": "Lunch", "amount": "12.00", "formatted_amount": "৳12.00", "category": "food", "expense_date": "Mar 01, 2025"}]
        }"#;
        let dashboard: ExpenseDashboard = serde_json::from_str(json).unwrap();
        assert_eq!(dashboard.total_display(), "৳1,520.50");
        assert_eq!(dashboard.category_breakdown[0].total, Some(820.0));
        assert_eq!(dashboard.recent_expenses[0].amount, Some(12.0));
        assert_eq!(dashboard.recent_expenses[0].amount_display(), "৳12.00");
    }

    #[test]
    fn test_empty_dashboard() {
        let dashboard: ExpenseDashboard = serde_json::from_str("{}").unwrap();
        assert_eq!(dashboard.total_display(), "0.00");
        assert!(dashboard.recent_expenses.is_empty());
    }

    #[test]
    fn test_amount_display_fallbacks() {
        let expense: Expense = serde_json::from_str(r#"{"id": 1, "title": "x", "amount": 4.5}"#).unwrap();
        assert_eq!(expense.amount_display(), "4.50");
        let expense: Expense = serde_json::from_str(r#"{"id": 1, "title": "x"}"#).unwrap();
        assert_eq!(expense.amount_display(), "-");
    }
}
