//! finavatar-core: health scoring and habit analytics for the finance avatar

pub mod analytics;
pub mod habits;
pub mod health;
pub mod insights;
pub mod time;

pub use analytics::{financial_analytics, CategoryShare, FinancialAnalytics, MonthlyTrend, RiskLevel};
pub use habits::{
    analyze_patterns, Frequency, Habit, HabitPattern, HabitStore, HabitUpdate, NewHabit, Trend,
};
pub use health::{
    advise_on, financial_score, score, BodyArchetype, FinancialRatios, FinancialSnapshot,
    GoalProfile, HealthMetrics,
};
pub use insights::{spending_insights, SpendingInsights};
pub use time::{Clock, FixedClock, SystemClock};
