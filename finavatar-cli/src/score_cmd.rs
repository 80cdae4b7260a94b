use anyhow::Result;
use clap::Args;
use finavatar_core::time::local_year_month;
use finavatar_core::{advise_on, financial_score, score, FinancialSnapshot, GoalProfile};
use serde::Serialize;
use tracing::info;

use crate::{label, print_json, Ctx};

#[derive(Args, Debug, Default)]
pub struct ScoreArgs {
    #[arg(long)]
    pub income: Option<f64>,
    #[arg(long)]
    pub expenses: Option<f64>,
    #[arg(long)]
    pub savings: Option<f64>,
    #[arg(long)]
    pub debt: Option<f64>,
    #[arg(long)]
    pub investments: Option<f64>,
    /// conservative | moderate | aggressive
    #[arg(long)]
    pub goal: Option<GoalProfile>,

    /// Remember the resulting snapshot for later runs
    #[arg(long)]
    pub save: bool,

    #[arg(long)]
    pub json: bool,
}

/// Saved snapshot if there is one, else this month's ledger totals with
/// zero savings, debt and investments.
pub fn base_snapshot(ctx: &Ctx) -> Result<FinancialSnapshot> {
    if let Some(s) = ctx.state.load_snapshot()? {
        return Ok(s);
    }
    let ledger = ctx.state.load_ledger(ctx.now)?;
    let (year, month) = local_year_month(ctx.now, ctx.tz);
    ledger.snapshot_for_month(year, month, ctx.tz, 0.0, 0.0, 0.0, GoalProfile::default())
}

fn apply_overrides(mut s: FinancialSnapshot, args: &ScoreArgs) -> FinancialSnapshot {
    if let Some(v) = args.income {
        s.monthly_income = v;
    }
    if let Some(v) = args.expenses {
        s.monthly_expenses = v;
    }
    if let Some(v) = args.savings {
        s.savings = v;
    }
    if let Some(v) = args.debt {
        s.debt = v;
    }
    if let Some(v) = args.investments {
        s.investments = v;
    }
    if let Some(v) = args.goal {
        s.goal_profile = v;
    }
    s
}

#[derive(Serialize)]
struct ScoreReport {
    snapshot: FinancialSnapshot,
    financial_score: f64,
    overall_score: i32,
    metrics: finavatar_core::HealthMetrics,
    advice: Vec<String>,
}

pub fn run(ctx: &Ctx, args: ScoreArgs) -> Result<()> {
    let snapshot = apply_overrides(base_snapshot(ctx)?, &args);
    if args.save {
        ctx.state.save_snapshot(&snapshot)?;
        info!("snapshot saved");
    }

    let metrics = score(&snapshot);
    let report = ScoreReport {
        snapshot,
        financial_score: financial_score(&snapshot),
        overall_score: metrics.overall_score(),
        metrics,
        advice: advise_on(&snapshot),
    };

    if args.json {
        return print_json(&report);
    }

    let m = &report.metrics;
    println!(
        "Income {}  Expenses {}  Savings {}  Debt {}  Investments {}  Goal {}",
        ctx.cfg.money(snapshot.monthly_income),
        ctx.cfg.money(snapshot.monthly_expenses),
        ctx.cfg.money(snapshot.savings),
        ctx.cfg.money(snapshot.debt),
        ctx.cfg.money(snapshot.investments),
        label(&snapshot.goal_profile),
    );
    println!("\nFinancial score: {:.1}/100  (overall {})", report.financial_score, report.overall_score);
    println!("  fitness    {:.2}", m.fitness_level);
    println!("  weight     {:.2}", m.weight_level);
    println!("  stress     {:.2}", m.stress_level);
    println!("  happiness  {:.2}", m.happiness_level);
    println!("  archetype  {}", label(&m.body_archetype));

    println!("\nAdvice:");
    for a in &report.advice {
        println!("- {a}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_only_touch_given_fields() {
        let base = FinancialSnapshot {
            monthly_income: 5000.0,
            monthly_expenses: 3000.0,
            savings: 1000.0,
            debt: 0.0,
            investments: 0.0,
            goal_profile: GoalProfile::Conservative,
        };
        let args = ScoreArgs {
            debt: Some(800.0),
            goal: Some(GoalProfile::Aggressive),
            ..Default::default()
        };
        let s = apply_overrides(base, &args);
        assert_eq!(s.monthly_income, 5000.0);
        assert_eq!(s.debt, 800.0);
        assert_eq!(s.goal_profile, GoalProfile::Aggressive);
    }
}
