use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod ai_cmd;
mod auth;
mod config;
mod habit_cmd;
mod ledger_cmd;
mod score_cmd;
mod state;

use config::Config;
use state::StateDir;

#[derive(Parser, Debug)]
#[command(
    name = "finavatar",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("FINAVATAR_BUILD_SHA"), ")"),
    about = "Financial health avatar: scoring, habits, ledger, and AI coaching"
)]
struct Cli {
    /// Debug logging (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a financial snapshot into avatar metrics and advice
    Score(score_cmd::ScoreArgs),

    /// Spending habits and their analytics
    Habit {
        #[command(subcommand)]
        command: habit_cmd::HabitCommand,
    },

    /// Income and expense transactions
    Tx {
        #[command(subcommand)]
        command: ledger_cmd::TxCommand,
    },

    /// Budget categories
    Category {
        #[command(subcommand)]
        command: ledger_cmd::CategoryCommand,
    },

    /// AI recommendations, questions, voice notes, and coaching tips
    Ai {
        #[command(subcommand)]
        command: ai_cmd::AiCommand,
    },

    /// Store provider API keys in ~/.finavatar/auth.json
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Manage ~/.finavatar/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    PasteGeminiKey,
    PasteAnthropicToken,
    PasteOpenaiKey,
    /// Show where each provider's key comes from
    Status,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,
    /// Print the effective config
    Show,
}

/// Everything a command needs: settings, state files, and the current instant.
pub struct Ctx {
    pub cfg: Config,
    pub state: StateDir,
    pub tz: Tz,
    pub now: DateTime<Utc>,
}

impl Ctx {
    fn load() -> Result<Self> {
        let cfg = config::load_config()?;
        let tz = cfg.timezone()?;
        let ctx = Self {
            state: StateDir::open()?,
            tz,
            now: Utc::now(),
            cfg,
        };
        debug!(tz = %ctx.tz, owner = ctx.owner(), "loaded context");
        Ok(ctx)
    }

    pub fn owner(&self) -> &str {
        &self.cfg.profile.owner_id
    }

    /// `YYYY-MM-DD` at local midnight.
    pub fn parse_day(&self, s: &str) -> Result<DateTime<Utc>> {
        let day = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid date (want YYYY-MM-DD): {s}"))?;
        finavatar_core::time::local_midnight_utc(day, self.tz)
    }

    pub fn show_day(&self, ts: DateTime<Utc>) -> String {
        ts.with_timezone(&self.tz).format("%Y-%m-%d").to_string()
    }
}

/// Serialized name of a unit enum variant, e.g. `Trend::Increasing` -> "increasing".
pub fn label<T: Serialize>(v: &T) -> String {
    match serde_json::to_value(v) {
        Ok(serde_json::Value::String(s)) => s,
        _ => "?".to_string(),
    }
}

pub fn print_json<T: Serialize>(v: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(v)?);
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "finavatar=debug,finavatar_core=debug,finavatar_ledger=debug,finavatar_ai=debug"
    } else {
        "warn,finavatar=info,finavatar_ai=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Auth { command } => match command {
            AuthCommand::PasteGeminiKey => auth::paste_key(finavatar_ai::Provider::Gemini)?,
            AuthCommand::PasteAnthropicToken => auth::paste_key(finavatar_ai::Provider::Anthropic)?,
            AuthCommand::PasteOpenaiKey => auth::paste_key(finavatar_ai::Provider::OpenAI)?,
            AuthCommand::Status => auth::print_status()?,
        },

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },

        Command::Score(args) => score_cmd::run(&Ctx::load()?, args)?,
        Command::Habit { command } => habit_cmd::run(&Ctx::load()?, command)?,
        Command::Tx { command } => ledger_cmd::run_tx(&Ctx::load()?, command)?,
        Command::Category { command } => ledger_cmd::run_category(&Ctx::load()?, command)?,
        Command::Ai { command } => ai_cmd::run(&Ctx::load()?, command)?,
    }

    Ok(())
}
