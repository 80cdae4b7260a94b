//! Ledger: the user's transactions and budget categories.
//!
//! Like the habit store this is an in-memory collection; loading and saving
//! it is left to the caller.

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use finavatar_core::time::{local_year_month, month_bounds_utc};
use finavatar_core::{FinancialSnapshot, GoalProfile};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::records::{
    default_categories, BudgetCategory, NewTransaction, Transaction, TransactionType,
    TransactionUpdate,
};

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    categories: Vec<BudgetCategory>,
}

/// Income and expense sums for one calendar month
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MonthlyTotals {
    pub income: f64,
    pub expenses: f64,
    pub transaction_count: usize,
}

impl MonthlyTotals {
    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryTotal {
    pub name: String,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BudgetStatus {
    #[serde(rename = "on-track")]
    OnTrack,
    #[serde(rename = "warning")]
    Warning,
    #[serde(rename = "exceeded")]
    Exceeded,
}

impl BudgetStatus {
    /// under 80% on track, up to 100% warning, above that exceeded
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < 0.8 {
            BudgetStatus::OnTrack
        } else if ratio <= 1.0 {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Exceeded
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetUsage {
    pub category_id: String,
    pub name: String,
    pub spent: f64,
    pub budget: f64,
    pub ratio: f64,
    pub status: BudgetStatus,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty ledger seeded with the built-in categories.
    pub fn with_default_categories(now: DateTime<Utc>) -> Self {
        Self {
            transactions: Vec::new(),
            categories: default_categories(now),
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn categories(&self) -> &[BudgetCategory] {
        &self.categories
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&BudgetCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Case-insensitive name lookup
    pub fn category_by_name(&self, name: &str) -> Option<&BudgetCategory> {
        let needle = name.trim().to_lowercase();
        self.categories.iter().find(|c| c.name.to_lowercase() == needle)
    }

    /// Display name of a transaction's category
    pub fn category_name(&self, t: &Transaction) -> &str {
        t.category_id
            .as_deref()
            .and_then(|id| self.category(id))
            .map(|c| c.name.as_str())
            .unwrap_or(UNCATEGORIZED)
    }

    pub fn add_transaction(&mut self, data: NewTransaction, created_at: DateTime<Utc>) -> Transaction {
        let t = Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: data.user_id,
            category_id: data.category_id,
            amount: data.amount,
            description: data.description,
            transaction_date: data.transaction_date,
            transaction_type: data.transaction_type,
            created_at,
        };
        debug!(id = %t.id, amount = t.amount, kind = t.transaction_type.as_str(), "transaction added");
        self.transactions.push(t.clone());
        t
    }

    pub fn update_transaction(&mut self, id: &str, update: TransactionUpdate) -> bool {
        match self.transactions.iter_mut().find(|t| t.id == id) {
            Some(t) => {
                update.apply(t);
                true
            }
            None => false,
        }
    }

    pub fn delete_transaction(&mut self, id: &str) -> Option<Transaction> {
        let idx = self.transactions.iter().position(|t| t.id == id)?;
        Some(self.transactions.remove(idx))
    }

    pub fn add_category(
        &mut self,
        user_id: Option<String>,
        name: &str,
        monthly_budget: f64,
        created_at: DateTime<Utc>,
    ) -> BudgetCategory {
        let c = BudgetCategory::new(Uuid::new_v4().to_string(), user_id, name.trim(), monthly_budget, created_at);
        debug!(id = %c.id, name = %c.name, "category added");
        self.categories.push(c.clone());
        c
    }

    pub fn set_category_budget(&mut self, id: &str, monthly_budget: f64) -> bool {
        match self.categories.iter_mut().find(|c| c.id == id) {
            Some(c) => {
                c.monthly_budget = monthly_budget;
                true
            }
            None => false,
        }
    }

    /// Remove a category; its transactions become uncategorized.
    pub fn delete_category(&mut self, id: &str) -> Option<BudgetCategory> {
        let idx = self.categories.iter().position(|c| c.id == id)?;
        for t in self.transactions.iter_mut() {
            if t.category_id.as_deref() == Some(id) {
                t.category_id = None;
            }
        }
        Some(self.categories.remove(idx))
    }

    /// Filter by category and/or type; `None` matches everything.
    pub fn filter(&self, category_id: Option<&str>, kind: Option<TransactionType>) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| category_id.is_none_or(|c| t.category_id.as_deref() == Some(c)))
            .filter(|t| kind.is_none_or(|k| t.transaction_type == k))
            .collect()
    }

    /// Most recent first by transaction date.
    pub fn recent(&self, limit: usize) -> Vec<&Transaction> {
        let mut all: Vec<&Transaction> = self.transactions.iter().collect();
        all.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
        all.truncate(limit);
        all
    }

    fn in_month(&self, year: i32, month: u32, tz: Tz) -> Result<Vec<&Transaction>> {
        let (start, end) = month_bounds_utc(year, month, tz)?;
        Ok(self
            .transactions
            .iter()
            .filter(|t| t.transaction_date >= start && t.transaction_date < end)
            .collect())
    }

    pub fn monthly_totals(&self, year: i32, month: u32, tz: Tz) -> Result<MonthlyTotals> {
        let rows = self.in_month(year, month, tz)?;
        let sum = |kind: TransactionType| {
            rows.iter()
                .filter(|t| t.transaction_type == kind)
                .fold(0.0, |acc, t| acc + t.amount)
        };
        Ok(MonthlyTotals {
            income: sum(TransactionType::Income),
            expenses: sum(TransactionType::Expense),
            transaction_count: rows.len(),
        })
    }

    /// Expenses in the calendar month containing `now`, as seen in `tz`.
    pub fn current_month_spending(&self, now: DateTime<Utc>, tz: Tz) -> Result<f64> {
        let (year, month) = local_year_month(now, tz);
        Ok(self.monthly_totals(year, month, tz)?.expenses)
    }

    /// Expense totals per category name, largest first.
    pub fn category_totals(&self, limit: usize) -> Vec<CategoryTotal> {
        let mut totals: Vec<CategoryTotal> = Vec::new();
        for t in self.transactions.iter().filter(|t| t.is_expense()) {
            let name = self.category_name(t);
            match totals.iter_mut().find(|c| c.name == name) {
                Some(c) => c.total += t.amount,
                None => totals.push(CategoryTotal {
                    name: name.to_string(),
                    total: t.amount,
                }),
            }
        }
        totals.sort_by(|a, b| b.total.total_cmp(&a.total));
        totals.truncate(limit);
        totals
    }

    /// Spend against budget for every category that has one.
    pub fn budget_usage(&self, year: i32, month: u32, tz: Tz) -> Result<Vec<BudgetUsage>> {
        let rows = self.in_month(year, month, tz)?;
        Ok(self
            .categories
            .iter()
            .filter(|c| c.monthly_budget > 0.0)
            .map(|c| {
                let spent: f64 = rows
                    .iter()
                    .filter(|t| t.is_expense() && t.category_id.as_deref() == Some(c.id.as_str()))
                    .fold(0.0, |acc, t| acc + t.amount);
                let ratio = spent / c.monthly_budget;
                BudgetUsage {
                    category_id: c.id.clone(),
                    name: c.name.clone(),
                    spent,
                    budget: c.monthly_budget,
                    ratio,
                    status: BudgetStatus::from_ratio(ratio),
                }
            })
            .collect())
    }

    /// Scorer input with income and expenses taken from the month's rows.
    pub fn snapshot_for_month(
        &self,
        year: i32,
        month: u32,
        tz: Tz,
        savings: f64,
        debt: f64,
        investments: f64,
        goal_profile: GoalProfile,
    ) -> Result<FinancialSnapshot> {
        let totals = self.monthly_totals(year, month, tz)?;
        Ok(FinancialSnapshot {
            monthly_income: totals.income,
            monthly_expenses: totals.expenses,
            savings,
            debt,
            investments,
            goal_profile,
        })
    }
}
