//! Financial health scoring: snapshot in, avatar metrics out.
//!
//! Everything here is a pure function of a [`FinancialSnapshot`]. The composite
//! score is built from five bands (savings, debt, expenses, investments, goal
//! profile) worth 100 points in total, then mapped onto the four avatar levels.

use serde::{Deserialize, Serialize};

/// Monthly money picture supplied by the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FinancialSnapshot {
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub savings: f64,
    pub debt: f64,
    pub investments: f64,
    pub goal_profile: GoalProfile,
}

/// How hard the user wants to push toward their goals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum GoalProfile {
    #[serde(rename = "conservative")]
    #[default]
    Conservative,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "aggressive")]
    Aggressive,
}

impl GoalProfile {
    /// Points contributed to the composite score (max 10)
    pub fn points(&self) -> f64 {
        match self {
            GoalProfile::Aggressive => 10.0,
            GoalProfile::Moderate => 7.0,
            GoalProfile::Conservative => 5.0,
        }
    }
}

impl std::str::FromStr for GoalProfile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "conservative" => Ok(GoalProfile::Conservative),
            "moderate" => Ok(GoalProfile::Moderate),
            "aggressive" => Ok(GoalProfile::Aggressive),
            other => anyhow::bail!("unknown goal profile: {other}"),
        }
    }
}

/// Avatar build derived from the fitness/weight/stress levels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BodyArchetype {
    #[serde(rename = "average")]
    Average,
    #[serde(rename = "fit")]
    Fit,
    #[serde(rename = "heavy")]
    Heavy,
}

impl BodyArchetype {
    pub fn classify(fitness: f64, weight: f64, stress: f64) -> Self {
        if fitness > 0.7 && stress < 0.3 {
            BodyArchetype::Fit
        } else if weight > 0.7 || stress > 0.6 {
            BodyArchetype::Heavy
        } else {
            BodyArchetype::Average
        }
    }
}

/// Normalized avatar levels, each in 0.0 - 1.0
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HealthMetrics {
    pub fitness_level: f64,
    pub weight_level: f64,
    pub stress_level: f64,
    pub happiness_level: f64,
    pub body_archetype: BodyArchetype,
}

impl HealthMetrics {
    /// Dashboard headline: round((fitness + happiness - stress) * 100 / 3)
    pub fn overall_score(&self) -> i32 {
        ((self.fitness_level + self.happiness_level - self.stress_level) * 100.0 / 3.0).round() as i32
    }
}

/// The four income-relative ratios. All zero when income is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinancialRatios {
    pub savings_rate: f64,
    pub debt_to_income: f64,
    pub expense_ratio: f64,
    pub investment_ratio: f64,
}

impl FinancialRatios {
    pub fn from_snapshot(s: &FinancialSnapshot) -> Self {
        let per_income = |v: f64| {
            if s.monthly_income > 0.0 {
                v / s.monthly_income
            } else {
                0.0
            }
        };
        Self {
            savings_rate: per_income(s.savings),
            debt_to_income: per_income(s.debt),
            expense_ratio: per_income(s.monthly_expenses),
            investment_ratio: per_income(s.investments),
        }
    }
}

fn savings_points(rate: f64) -> f64 {
    if rate >= 0.20 {
        30.0
    } else if rate >= 0.15 {
        25.0
    } else if rate >= 0.10 {
        20.0
    } else if rate >= 0.05 {
        15.0
    } else {
        rate * 300.0
    }
}

fn debt_points(ratio: f64) -> f64 {
    match ratio {
        r if r <= 0.10 => 25.0,
        r if r <= 0.20 => 20.0,
        r if r <= 0.30 => 15.0,
        r if r <= 0.40 => 10.0,
        r if r <= 0.50 => 5.0,
        _ => 0.0,
    }
}

fn expense_points(ratio: f64) -> f64 {
    match ratio {
        r if r <= 0.60 => 20.0,
        r if r <= 0.70 => 15.0,
        r if r <= 0.80 => 10.0,
        r if r <= 0.90 => 5.0,
        _ => 0.0,
    }
}

fn investment_points(ratio: f64) -> f64 {
    match ratio {
        r if r >= 0.15 => 15.0,
        r if r >= 0.10 => 12.0,
        r if r >= 0.05 => 8.0,
        r if r >= 0.02 => 4.0,
        _ => 0.0,
    }
}

/// Composite financial score, clamped to 0 - 100.
pub fn financial_score(snapshot: &FinancialSnapshot) -> f64 {
    let r = FinancialRatios::from_snapshot(snapshot);
    let total = savings_points(r.savings_rate)
        + debt_points(r.debt_to_income)
        + expense_points(r.expense_ratio)
        + investment_points(r.investment_ratio)
        + snapshot.goal_profile.points();
    total.clamp(0.0, 100.0)
}

/// Map a snapshot onto avatar health metrics.
pub fn score(snapshot: &FinancialSnapshot) -> HealthMetrics {
    let r = FinancialRatios::from_snapshot(snapshot);
    let normalized = financial_score(snapshot) / 100.0;

    let fitness = (r.savings_rate * 3.0 + r.investment_ratio * 2.0).min(1.0).clamp(0.0, 1.0);
    let weight = r.expense_ratio.min(1.0).clamp(0.0, 1.0);
    let stress = (r.debt_to_income * 2.0 + (r.expense_ratio - 0.7).max(0.0) * 2.0)
        .min(1.0)
        .clamp(0.0, 1.0);
    let happiness = (normalized * 1.2).min(1.0).clamp(0.0, 1.0);

    HealthMetrics {
        fitness_level: fitness,
        weight_level: weight,
        stress_level: stress,
        happiness_level: happiness,
        body_archetype: BodyArchetype::classify(fitness, weight, stress),
    }
}

/// Rule-based advice. Every matching rule fires, in a fixed order.
pub fn advise_on(snapshot: &FinancialSnapshot) -> Vec<String> {
    let r = FinancialRatios::from_snapshot(snapshot);
    let mut advice = Vec::new();

    if r.savings_rate < 0.10 {
        advice.push("Consider increasing your savings rate to at least 10% of your income".to_string());
    }
    if r.debt_to_income > 0.30 {
        advice.push("Your debt-to-income ratio is high. Focus on debt reduction strategies".to_string());
    }
    if r.expense_ratio > 0.80 {
        advice.push(
            "Your expenses are consuming too much of your income. Review your spending habits".to_string(),
        );
    }
    if r.investment_ratio < 0.05 {
        advice.push("Consider starting or increasing your investment contributions".to_string());
    }
    if r.savings_rate >= 0.20 && r.debt_to_income <= 0.20 && r.expense_ratio <= 0.70 {
        advice.push("Excellent financial health! Keep up the good work".to_string());
    }

    advice
}
