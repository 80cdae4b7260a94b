//! Transaction and budget category records, mirroring the backend row shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionType {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => anyhow::bail!("unknown transaction type: {other}"),
        }
    }
}

/// A single income or expense entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    /// None when the category was deleted or never set
    pub category_id: Option<String>,
    /// Always positive; direction comes from `transaction_type`
    pub amount: f64,
    pub description: String,
    pub transaction_date: DateTime<Utc>,
    pub transaction_type: TransactionType,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }
}

/// Fields supplied when recording a transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTransaction {
    pub user_id: String,
    pub category_id: Option<String>,
    pub amount: f64,
    pub description: String,
    pub transaction_date: DateTime<Utc>,
    pub transaction_type: TransactionType,
}

impl NewTransaction {
    pub fn expense(user_id: impl Into<String>, amount: f64, date: DateTime<Utc>) -> Self {
        Self::new(user_id, amount, date, TransactionType::Expense)
    }

    pub fn income(user_id: impl Into<String>, amount: f64, date: DateTime<Utc>) -> Self {
        Self::new(user_id, amount, date, TransactionType::Income)
    }

    fn new(user_id: impl Into<String>, amount: f64, date: DateTime<Utc>, kind: TransactionType) -> Self {
        Self {
            user_id: user_id.into(),
            category_id: None,
            amount,
            description: String::new(),
            transaction_date: date,
            transaction_type: kind,
        }
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Partial transaction update; `None` leaves a field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransactionUpdate {
    pub category_id: Option<Option<String>>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
    pub transaction_type: Option<TransactionType>,
}

impl TransactionUpdate {
    pub(crate) fn apply(self, t: &mut Transaction) {
        if let Some(v) = self.category_id {
            t.category_id = v;
        }
        if let Some(v) = self.amount {
            t.amount = v;
        }
        if let Some(v) = self.description {
            t.description = v;
        }
        if let Some(v) = self.transaction_date {
            t.transaction_date = v;
        }
        if let Some(v) = self.transaction_type {
            t.transaction_type = v;
        }
    }
}

/// Spending category with an optional monthly budget (0 = no budget)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetCategory {
    pub id: String,
    /// None for built-in categories shared by every user
    pub user_id: Option<String>,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub is_default: bool,
    pub monthly_budget: f64,
    pub created_at: DateTime<Utc>,
}

impl BudgetCategory {
    pub fn new(
        id: impl Into<String>,
        user_id: Option<String>,
        name: impl Into<String>,
        monthly_budget: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id,
            name: name.into(),
            color: "#6B7280".to_string(),
            icon: "tag".to_string(),
            is_default: false,
            monthly_budget,
            created_at,
        }
    }

    pub fn with_style(mut self, color: impl Into<String>, icon: impl Into<String>) -> Self {
        self.color = color.into();
        self.icon = icon.into();
        self
    }
}

/// Built-in categories every ledger starts with.
pub fn default_categories(created_at: DateTime<Utc>) -> Vec<BudgetCategory> {
    [
        ("1", "Food & Dining", "#EF4444", "utensils", 500.0),
        ("2", "Exercise & Fitness", "#10B981", "dumbbell", 200.0),
        ("3", "Entertainment", "#F59E0B", "film", 300.0),
    ]
    .into_iter()
    .map(|(id, name, color, icon, budget)| BudgetCategory {
        is_default: true,
        ..BudgetCategory::new(id, None, name, budget, created_at).with_style(color, icon)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_categories() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let cats = default_categories(ts);
        assert_eq!(cats.len(), 3);
        assert!(cats.iter().all(|c| c.is_default && c.user_id.is_none()));
        assert_eq!(cats[0].name, "Food & Dining");
        assert_eq!(cats[0].monthly_budget, 500.0);
    }

    #[test]
    fn test_transaction_type_serde() {
        let json = serde_json::to_string(&TransactionType::Expense).unwrap();
        assert_eq!(json, "\"expense\"");
        assert_eq!("Income".parse::<TransactionType>().unwrap(), TransactionType::Income);
    }
}
