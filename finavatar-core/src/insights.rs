//! Spending insights over the habit collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::habits::{Habit, HabitPattern, Trend};
use crate::time::{trailing_window_start, TRAILING_WINDOW_DAYS};

/// Categories reported in `top_categories`
pub const TOP_CATEGORY_LIMIT: usize = 3;

/// An increasing category only triggers a warning above this total
pub const INCREASING_SPEND_THRESHOLD: f64 = 500.0;

/// Daily spend above which the high-spend warning fires
pub const HIGH_DAILY_SPEND: f64 = 100.0;

/// Share of a month's spend that counts as "mostly recurring"
pub const RECURRING_SHARE_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpendingInsights {
    pub top_categories: Vec<String>,
    pub total_recurring_monthly_cost: f64,
    pub average_daily_spending: f64,
    pub recommendations: Vec<String>,
}

/// Patterns ordered by total spent, largest first. Ties keep their original order.
pub fn ranked_patterns(patterns: &[HabitPattern]) -> Vec<&HabitPattern> {
    let mut ranked: Vec<&HabitPattern> = patterns.iter().collect();
    ranked.sort_by(|a, b| b.total_spent.total_cmp(&a.total_spent));
    ranked
}

/// Monthly-normalized cost of every recurring habit.
pub fn recurring_monthly_cost(habits: &[Habit]) -> f64 {
    habits
        .iter()
        .filter(|h| h.is_recurring)
        .map(Habit::monthly_amount)
        .fold(0.0, |acc, v| acc + v)
}

/// Daily-normalized spend of habits created in the trailing window, spread over the window.
pub fn average_daily_spending(habits: &[Habit], now: DateTime<Utc>) -> f64 {
    let cutoff = trailing_window_start(now);
    let total: f64 = habits
        .iter()
        .filter(|h| h.created_at > cutoff)
        .map(Habit::daily_amount)
        .fold(0.0, |acc, v| acc + v);
    total / TRAILING_WINDOW_DAYS as f64
}

pub fn spending_insights(
    habits: &[Habit],
    patterns: &[HabitPattern],
    now: DateTime<Utc>,
) -> SpendingInsights {
    let ranked = ranked_patterns(patterns);

    let top_categories = ranked
        .iter()
        .take(TOP_CATEGORY_LIMIT)
        .map(|p| p.category.clone())
        .collect();

    let recurring = recurring_monthly_cost(habits);
    let daily = average_daily_spending(habits, now);

    let mut recommendations: Vec<String> = ranked
        .iter()
        .filter(|p| p.trend == Trend::Increasing && p.total_spent > INCREASING_SPEND_THRESHOLD)
        .map(|p| {
            format!(
                "Consider reducing spending in {} - it's been increasing lately",
                p.category
            )
        })
        .collect();

    if recurring > daily * TRAILING_WINDOW_DAYS as f64 * RECURRING_SHARE_THRESHOLD {
        recommendations.push(
            "A large portion of your spending is recurring - look for subscription services to cancel"
                .to_string(),
        );
    }
    if daily > HIGH_DAILY_SPEND {
        recommendations
            .push("Your daily spending is quite high - try setting daily spending limits".to_string());
    }

    SpendingInsights {
        top_categories,
        total_recurring_monthly_cost: recurring,
        average_daily_spending: daily,
        recommendations,
    }
}
