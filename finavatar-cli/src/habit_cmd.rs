use anyhow::{bail, Result};
use chrono::Duration;
use clap::Subcommand;
use finavatar_core::{financial_analytics, Frequency, Habit, HabitStore, HabitUpdate, NewHabit};
use tracing::info;

use crate::score_cmd::base_snapshot;
use crate::{label, print_json, Ctx};

#[derive(Subcommand, Debug)]
pub enum HabitCommand {
    /// Record a spending habit
    Add {
        #[arg(long)]
        category: String,
        #[arg(long)]
        amount: f64,
        /// daily | weekly | monthly | yearly
        #[arg(long, default_value = "monthly")]
        frequency: Frequency,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        recurring: bool,
        /// Backdate the habit (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Change fields of an existing habit
    Update {
        id: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        frequency: Option<Frequency>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        recurring: Option<bool>,
    },

    Delete {
        id: String,
    },

    List {
        #[arg(long)]
        json: bool,
    },

    /// Habits in one category (case-insensitive)
    Category {
        name: String,
    },

    /// Habits created between two days, inclusive
    Range {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },

    /// Per-category patterns and trends
    Patterns {
        #[arg(long)]
        json: bool,
    },

    /// Top categories, recurring cost, daily spend, and recommendations
    Insights {
        #[arg(long)]
        json: bool,
    },

    /// Savings rate, risk level, and category shares against income
    Report {
        #[arg(long)]
        income: Option<f64>,
        #[arg(long)]
        expenses: Option<f64>,
        #[arg(long)]
        json: bool,
    },
}

fn print_habits(ctx: &Ctx, habits: &[&Habit]) {
    if habits.is_empty() {
        println!("No habits.");
        return;
    }
    for h in habits {
        println!(
            "{}  {}  {:<16} {:>10} {:<8}{}  {}",
            h.id,
            ctx.show_day(h.created_at),
            h.category,
            ctx.cfg.money(h.amount),
            h.frequency.as_str(),
            if h.is_recurring { " (recurring)" } else { "" },
            h.description
        );
    }
}

pub fn run(ctx: &Ctx, command: HabitCommand) -> Result<()> {
    let mut store = HabitStore::from_habits(ctx.state.load_habits()?);

    match command {
        HabitCommand::Add {
            category,
            amount,
            frequency,
            description,
            recurring,
            date,
        } => {
            if amount <= 0.0 {
                bail!("amount must be positive");
            }
            let data = NewHabit::new(ctx.owner(), category, amount, frequency)
                .with_description(description)
                .recurring(recurring);
            let habit = match date {
                Some(d) => store.add_habit_at(data, ctx.parse_day(&d)?),
                None => store.add_habit(data),
            };
            ctx.state.save_habits(store.habits())?;
            info!(id = %habit.id, "habit added");
            println!("Added {}", habit.id);
        }

        HabitCommand::Update {
            id,
            category,
            amount,
            frequency,
            description,
            recurring,
        } => {
            let update = HabitUpdate {
                category,
                amount,
                frequency,
                description,
                is_recurring: recurring,
                ..Default::default()
            };
            if !store.update_habit(&id, update) {
                bail!("no habit with id {id}");
            }
            ctx.state.save_habits(store.habits())?;
            println!("Updated {id}");
        }

        HabitCommand::Delete { id } => {
            let Some(removed) = store.delete_habit(&id) else {
                bail!("no habit with id {id}");
            };
            ctx.state.save_habits(store.habits())?;
            println!("Deleted {} ({})", removed.id, removed.category);
        }

        HabitCommand::List { json } => {
            if json {
                return print_json(&store.habits());
            }
            let all: Vec<&Habit> = store.habits().iter().collect();
            print_habits(ctx, &all);
        }

        HabitCommand::Category { name } => {
            print_habits(ctx, &store.habits_by_category(&name));
        }

        HabitCommand::Range { from, to } => {
            let start = ctx.parse_day(&from)?;
            // through the end of the `to` day
            let end = ctx.parse_day(&to)? + Duration::days(1) - Duration::nanoseconds(1);
            if end < start {
                bail!("--to is before --from");
            }
            print_habits(ctx, &store.habits_in_range(start, end));
        }

        HabitCommand::Patterns { json } => {
            if json {
                return print_json(&store.patterns());
            }
            if store.patterns().is_empty() {
                println!("No habits.");
            }
            for p in store.patterns() {
                println!(
                    "{:<16} count={:<3} avg={:>10} total={:>10} trend={}",
                    p.category,
                    p.frequency,
                    ctx.cfg.money(p.average_amount),
                    ctx.cfg.money(p.total_spent),
                    label(&p.trend)
                );
            }
        }

        HabitCommand::Insights { json } => {
            let insights = store.spending_insights();
            if json {
                return print_json(&insights);
            }
            println!("Top categories: {}", insights.top_categories.join(", "));
            println!("Recurring monthly cost: {}", ctx.cfg.money(insights.total_recurring_monthly_cost));
            println!("Average daily spending (30d): {}", ctx.cfg.money(insights.average_daily_spending));
            if !insights.recommendations.is_empty() {
                println!("\nRecommendations:");
                for r in &insights.recommendations {
                    println!("- {r}");
                }
            }
        }

        HabitCommand::Report { income, expenses, json } => {
            let snapshot = base_snapshot(ctx)?;
            let income = income.unwrap_or(snapshot.monthly_income);
            let expenses = expenses.unwrap_or(snapshot.monthly_expenses);
            let report = financial_analytics(store.habits(), income, expenses);
            if json {
                return print_json(&report);
            }
            println!("Health score: {}/100 (risk {}, trend {})", report.health_score, label(&report.risk_level), label(&report.monthly_trend));
            println!("Savings rate: {:.1}%", report.savings_rate);
            println!("Expenses to income: {:.1}%", report.expense_to_income);
            println!("Discretionary spending: {}", ctx.cfg.money(report.discretionary_spending));
            println!("\nTop categories:");
            for c in &report.top_spending_categories {
                println!("- {:<16} {:>10} ({:.1}%)", c.category, ctx.cfg.money(c.amount), c.percentage);
            }
            if !report.recommendations.is_empty() {
                println!("\nRecommendations:");
                for r in &report.recommendations {
                    println!("- {r}");
                }
            }
        }
    }

    Ok(())
}
