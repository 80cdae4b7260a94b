use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::Subcommand;
use finavatar_core::time::local_year_month;
use finavatar_ledger::{
    export_csv, import_csv, Ledger, NewTransaction, Transaction, TransactionType, TransactionUpdate,
};
use std::path::PathBuf;
use tracing::info;

use crate::{label, print_json, Ctx};

#[derive(Subcommand, Debug)]
pub enum TxCommand {
    Add {
        #[arg(long)]
        amount: f64,
        /// income | expense
        #[arg(long = "type", default_value = "expense")]
        kind: TransactionType,
        /// Category name; created when unknown
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    Update {
        id: String,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long = "type")]
        kind: Option<TransactionType>,
        #[arg(long)]
        category: Option<String>,
        /// Detach from its category
        #[arg(long, conflicts_with = "category")]
        uncategorize: bool,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },

    Delete {
        id: String,
    },

    /// Most recent first
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "type")]
        kind: Option<TransactionType>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },

    /// Income, expenses, and top spending categories for a month
    Summary {
        /// YYYY-MM, defaults to the current month
        #[arg(long)]
        month: Option<String>,
        #[arg(long, default_value_t = 5)]
        top: usize,
    },

    /// Spend against each category budget for a month
    Budgets {
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        json: bool,
    },

    Export {
        path: PathBuf,
    },

    Import {
        path: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    Add {
        name: String,
        /// Monthly budget, 0 for none
        #[arg(long, default_value_t = 0.0)]
        budget: f64,
    },
    List,
    /// Change a category's monthly budget
    Budget {
        id: String,
        amount: f64,
    },
    /// Remove a category; its transactions become uncategorized
    Delete {
        id: String,
    },
}

fn parse_month(ctx: &Ctx, month: Option<&str>) -> Result<(i32, u32)> {
    let Some(m) = month else {
        return Ok(local_year_month(ctx.now, ctx.tz));
    };
    let first = NaiveDate::parse_from_str(&format!("{}-01", m.trim()), "%Y-%m-%d")
        .with_context(|| format!("invalid month (want YYYY-MM): {m}"))?;
    Ok((first.year(), first.month()))
}

/// Category id for a name, creating the category when it doesn't exist.
fn category_id(ctx: &Ctx, ledger: &mut Ledger, name: &str) -> Result<String> {
    if name.trim().is_empty() {
        bail!("category name is empty");
    }
    if let Some(c) = ledger.category_by_name(name) {
        return Ok(c.id.clone());
    }
    let c = ledger.add_category(Some(ctx.owner().to_string()), name, 0.0, ctx.now);
    println!("Created category {} ({})", c.name, c.id);
    Ok(c.id)
}

fn print_transactions(ctx: &Ctx, ledger: &Ledger, rows: &[&Transaction]) {
    if rows.is_empty() {
        println!("No transactions.");
        return;
    }
    for t in rows {
        let signed = if t.is_income() { t.amount } else { -t.amount };
        println!(
            "{}  {}  {:>11}  {:<18} {}",
            t.id,
            ctx.show_day(t.transaction_date),
            ctx.cfg.money(signed),
            ledger.category_name(t),
            t.description
        );
    }
}

pub fn run_tx(ctx: &Ctx, command: TxCommand) -> Result<()> {
    let mut ledger = ctx.state.load_ledger(ctx.now)?;

    match command {
        TxCommand::Add {
            amount,
            kind,
            category,
            description,
            date,
        } => {
            if amount <= 0.0 {
                bail!("amount must be positive");
            }
            let when = match date {
                Some(d) => ctx.parse_day(&d)?,
                None => ctx.now,
            };
            let mut data = match kind {
                TransactionType::Income => NewTransaction::income(ctx.owner(), amount, when),
                TransactionType::Expense => NewTransaction::expense(ctx.owner(), amount, when),
            }
            .with_description(description);
            if let Some(name) = category {
                data.category_id = Some(category_id(ctx, &mut ledger, &name)?);
            }
            let t = ledger.add_transaction(data, ctx.now);
            ctx.state.save_ledger(&ledger)?;
            info!(id = %t.id, "transaction added");
            println!("Added {}", t.id);
        }

        TxCommand::Update {
            id,
            amount,
            kind,
            category,
            uncategorize,
            description,
            date,
        } => {
            if amount.is_some_and(|a| a <= 0.0) {
                bail!("amount must be positive");
            }
            let category_change = match (category, uncategorize) {
                (_, true) => Some(None),
                (Some(name), false) => Some(Some(category_id(ctx, &mut ledger, &name)?)),
                (None, false) => None,
            };
            let update = TransactionUpdate {
                category_id: category_change,
                amount,
                description,
                transaction_date: date.map(|d| ctx.parse_day(&d)).transpose()?,
                transaction_type: kind,
            };
            if !ledger.update_transaction(&id, update) {
                bail!("no transaction with id {id}");
            }
            ctx.state.save_ledger(&ledger)?;
            println!("Updated {id}");
        }

        TxCommand::Delete { id } => {
            if ledger.delete_transaction(&id).is_none() {
                bail!("no transaction with id {id}");
            }
            ctx.state.save_ledger(&ledger)?;
            println!("Deleted {id}");
        }

        TxCommand::List {
            category,
            kind,
            limit,
            json,
        } => {
            let filter_id = match category {
                Some(name) => match ledger.category_by_name(&name) {
                    Some(c) => Some(c.id.clone()),
                    None => bail!("no category named {name}"),
                },
                None => None,
            };
            let mut rows = ledger.filter(filter_id.as_deref(), kind);
            rows.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
            rows.truncate(limit);
            if json {
                return print_json(&rows);
            }
            print_transactions(ctx, &ledger, &rows);
        }

        TxCommand::Summary { month, top } => {
            let (year, month) = parse_month(ctx, month.as_deref())?;
            let totals = ledger.monthly_totals(year, month, ctx.tz)?;
            println!("{year}-{month:02} ({} transactions)", totals.transaction_count);
            println!("  income    {:>12}", ctx.cfg.money(totals.income));
            println!("  expenses  {:>12}", ctx.cfg.money(totals.expenses));
            println!("  net       {:>12}", ctx.cfg.money(totals.net()));

            let cats = ledger.category_totals(top);
            if !cats.is_empty() {
                println!("\nTop spending categories (all time):");
                for c in cats {
                    println!("- {:<18} {:>12}", c.name, ctx.cfg.money(c.total));
                }
            }
        }

        TxCommand::Budgets { month, json } => {
            let (year, month) = parse_month(ctx, month.as_deref())?;
            let usage = ledger.budget_usage(year, month, ctx.tz)?;
            if json {
                return print_json(&usage);
            }
            if usage.is_empty() {
                println!("No categories have a budget.");
            }
            for u in usage {
                println!(
                    "{:<18} {:>11} / {:>11}  {:>5.0}%  {}",
                    u.name,
                    ctx.cfg.money(u.spent),
                    ctx.cfg.money(u.budget),
                    u.ratio * 100.0,
                    label(&u.status)
                );
            }
        }

        TxCommand::Export { path } => {
            let n = export_csv(&ledger, &path, ctx.tz)?;
            println!("Exported {n} transactions to {}", path.display());
        }

        TxCommand::Import { path } => {
            let file = std::fs::File::open(&path).with_context(|| format!("open {}", path.display()))?;
            let n = import_csv(&mut ledger, file, ctx.owner(), ctx.tz, ctx.now)
                .with_context(|| format!("importing {}", path.display()))?;
            ctx.state.save_ledger(&ledger)?;
            println!("Imported {n} transactions from {}", path.display());
        }
    }

    Ok(())
}

pub fn run_category(ctx: &Ctx, command: CategoryCommand) -> Result<()> {
    let mut ledger = ctx.state.load_ledger(ctx.now)?;

    match command {
        CategoryCommand::Add { name, budget } => {
            if ledger.category_by_name(&name).is_some() {
                bail!("category {name} already exists");
            }
            if budget < 0.0 {
                bail!("budget can't be negative");
            }
            let c = ledger.add_category(Some(ctx.owner().to_string()), &name, budget, ctx.now);
            ctx.state.save_ledger(&ledger)?;
            println!("Added {} ({})", c.name, c.id);
        }

        CategoryCommand::List => {
            for c in ledger.categories() {
                let budget = if c.monthly_budget > 0.0 {
                    ctx.cfg.money(c.monthly_budget)
                } else {
                    "-".to_string()
                };
                println!(
                    "{:<38} {:<18} {:>11}{}",
                    c.id,
                    c.name,
                    budget,
                    if c.is_default { "  (default)" } else { "" }
                );
            }
        }

        CategoryCommand::Budget { id, amount } => {
            if amount < 0.0 {
                bail!("budget can't be negative");
            }
            if !ledger.set_category_budget(&id, amount) {
                bail!("no category with id {id}");
            }
            ctx.state.save_ledger(&ledger)?;
            println!("Budget for {id} set to {}", ctx.cfg.money(amount));
        }

        CategoryCommand::Delete { id } => {
            let Some(c) = ledger.delete_category(&id) else {
                bail!("no category with id {id}");
            };
            ctx.state.save_ledger(&ledger)?;
            println!("Deleted {}", c.name);
        }
    }

    Ok(())
}
