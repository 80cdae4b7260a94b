//! Monthly analytics report: habit spend set against income and expenses.
//!
//! Feeds the enhanced recommendation prompt, but is deterministic and useful
//! on its own. Percentages are on a 0 - 100 scale.

use serde::{Deserialize, Serialize};

use crate::habits::Habit;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MonthlyTrend {
    #[serde(rename = "improving")]
    Improving,
    #[serde(rename = "stable")]
    Stable,
    #[serde(rename = "declining")]
    Declining,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    /// Monthly-normalized amount
    pub amount: f64,
    /// Share of monthly expenses
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialAnalytics {
    pub savings_rate: f64,
    pub expense_to_income: f64,
    pub discretionary_spending: f64,
    pub health_score: i32,
    pub risk_level: RiskLevel,
    pub top_spending_categories: Vec<CategoryShare>,
    pub monthly_trend: MonthlyTrend,
    pub recommendations: Vec<String>,
}

pub const TOP_SHARE_LIMIT: usize = 5;

fn category_shares(habits: &[Habit], monthly_expenses: f64) -> Vec<CategoryShare> {
    let mut shares: Vec<CategoryShare> = Vec::new();
    for h in habits {
        let monthly = h.monthly_amount();
        match shares.iter_mut().find(|s| s.category == h.category) {
            Some(s) => s.amount += monthly,
            None => shares.push(CategoryShare {
                category: h.category.clone(),
                amount: monthly,
                percentage: 0.0,
            }),
        }
    }
    for s in shares.iter_mut() {
        s.percentage = if monthly_expenses > 0.0 {
            s.amount / monthly_expenses * 100.0
        } else {
            0.0
        };
    }
    shares.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    shares.truncate(TOP_SHARE_LIMIT);
    shares
}

fn health_score(savings_rate: f64, expense_to_income: f64, discretionary: f64, income: f64) -> i32 {
    let mut score = 50.0;

    if savings_rate > 20.0 {
        score += 20.0;
    } else if savings_rate > 10.0 {
        score += 10.0;
    } else if savings_rate < 5.0 {
        score -= 15.0;
    }

    if expense_to_income < 30.0 {
        score += 15.0;
    } else if expense_to_income > 50.0 {
        score -= 20.0;
    }

    if discretionary < income * 0.2 {
        score += 10.0;
    } else if discretionary > income * 0.4 {
        score -= 10.0;
    }

    f64::clamp(score, 0.0, 100.0).round() as i32
}

pub fn financial_analytics(habits: &[Habit], monthly_income: f64, monthly_expenses: f64) -> FinancialAnalytics {
    let recurring: f64 = habits
        .iter()
        .filter(|h| h.is_recurring)
        .map(Habit::monthly_amount)
        .fold(0.0, |acc, v| acc + v);
    let top = category_shares(habits, monthly_expenses);

    let (savings_rate, expense_to_income) = if monthly_income > 0.0 {
        (
            (monthly_income - monthly_expenses) / monthly_income * 100.0,
            monthly_expenses / monthly_income * 100.0,
        )
    } else {
        (0.0, 0.0)
    };
    let discretionary = monthly_expenses - recurring;

    let health_score = health_score(savings_rate, expense_to_income, discretionary, monthly_income);

    let risk_level = if health_score > 70 {
        RiskLevel::Low
    } else if health_score < 30 {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    };

    let monthly_trend = if savings_rate > 15.0 {
        MonthlyTrend::Improving
    } else if savings_rate > 5.0 {
        MonthlyTrend::Stable
    } else {
        MonthlyTrend::Declining
    };

    let mut recommendations = Vec::new();
    if savings_rate < 10.0 {
        recommendations.push("Increase your savings rate to at least 10% of income".to_string());
    }
    if expense_to_income > 40.0 {
        recommendations.push("Reduce your debt-to-income ratio below 40%".to_string());
    }
    if discretionary > monthly_income * 0.3 {
        recommendations.push("Reduce discretionary spending to free up more money for savings".to_string());
    }
    for c in top.iter().filter(|c| c.percentage > 25.0) {
        recommendations.push(format!(
            "Consider reducing spending in {} which represents {:.1}% of expenses",
            c.category, c.percentage
        ));
    }

    FinancialAnalytics {
        savings_rate,
        expense_to_income,
        discretionary_spending: discretionary,
        health_score,
        risk_level,
        top_spending_categories: top,
        monthly_trend,
        recommendations,
    }
}
