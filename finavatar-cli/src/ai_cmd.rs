use anyhow::{anyhow, Result};
use clap::Subcommand;
use finavatar_ai::{
    AssistantReply, FinancialAssistant, LlmClient, QuestionContext, Recommendation, VoiceContext,
};
use finavatar_core::Habit;
use tracing::warn;

use crate::auth;
use crate::score_cmd::base_snapshot;
use crate::{label, print_json, Ctx};

/// Habits passed along as context for a voice note
const VOICE_CONTEXT_HABITS: usize = 5;

#[derive(Subcommand, Debug)]
pub enum AiCommand {
    /// Budgeting recommendations from your habits
    Recommend {
        /// Include the analytics report in the prompt
        #[arg(long)]
        enhanced: bool,
        /// Free-text goals, used with --enhanced
        #[arg(long, requires = "enhanced")]
        goals: Option<String>,
        #[arg(long)]
        json: bool,
    },

    /// Ask a personal finance question
    Ask {
        question: String,
    },

    /// Interpret a spoken request (already transcribed)
    Voice {
        transcript: String,
        #[arg(long)]
        json: bool,
    },

    /// A short coaching tip based on recent habits
    Tip,
}

/// Model client for the configured provider. A missing key or bad provider
/// still yields a generator; it just fails every call, so the assistant
/// degrades the same way it does for a network error.
fn generator(ctx: &Ctx) -> impl Fn(&str) -> Result<String> {
    let client = ctx.cfg.provider().and_then(|provider| {
        let key = auth::api_key(provider)?.ok_or_else(|| {
            anyhow!(
                "no {} API key; set {} or store one with `finavatar auth`",
                provider.as_str(),
                auth::env_var(provider)
            )
        })?;
        LlmClient::new(ctx.cfg.llm_config(key)?)
    });
    if let Err(e) = &client {
        warn!(error = %format!("{e:#}"), "AI client unavailable");
    }

    move |prompt: &str| match &client {
        Ok(c) => c.complete(prompt),
        Err(e) => Err(anyhow!("{e:#}")),
    }
}

fn print_notice<T>(reply: &AssistantReply<T>) {
    if let Some(n) = &reply.notice {
        eprintln!("note: {n}");
    }
}

fn print_recommendations(ctx: &Ctx, recs: &[Recommendation]) {
    for (i, r) in recs.iter().enumerate() {
        println!("{}. {} [{} priority, {}]", i + 1, r.title, label(&r.priority), r.timeframe);
        if !r.description.is_empty() {
            println!("   {}", r.description);
        }
        if let Some(s) = r.estimated_savings {
            println!("   saves about {}/month", ctx.cfg.money(s));
        }
        println!(
            "   urgency {} / impact {} / feasibility {}",
            r.urgency_score, r.impact_score, r.feasibility_score
        );
        for step in &r.implementation_steps {
            println!("   - {step}");
        }
    }
}

pub fn run(ctx: &Ctx, command: AiCommand) -> Result<()> {
    let habits: Vec<Habit> = ctx.state.load_habits()?;
    let snapshot = base_snapshot(ctx)?;
    let assistant = FinancialAssistant::new(generator(ctx));

    match command {
        AiCommand::Recommend { enhanced, goals, json } => {
            let reply = if enhanced {
                assistant.enhanced_recommendations(
                    &habits,
                    snapshot.monthly_income,
                    snapshot.monthly_expenses,
                    goals.as_deref(),
                )
            } else {
                assistant.recommendations(&habits, snapshot.monthly_income, snapshot.monthly_expenses)
            };
            if json {
                return print_json(&reply);
            }
            print_notice(&reply);
            print_recommendations(ctx, &reply.value);
        }

        AiCommand::Ask { question } => {
            let qctx = QuestionContext {
                monthly_income: snapshot.monthly_income,
                monthly_expenses: snapshot.monthly_expenses,
                habit_count: habits.len(),
            };
            let reply = assistant.answer_question(&question, Some(&qctx));
            print_notice(&reply);
            println!("{}", reply.value);
        }

        AiCommand::Voice { transcript, json } => {
            let start = habits.len().saturating_sub(VOICE_CONTEXT_HABITS);
            let vctx = VoiceContext {
                recent_habits: habits[start..].to_vec(),
                monthly_income: snapshot.monthly_income,
                monthly_expenses: snapshot.monthly_expenses,
            };
            let reply = assistant.analyze_voice(&transcript, Some(&vctx));
            if json {
                return print_json(&reply);
            }
            print_notice(&reply);
            let v = &reply.value;
            println!("{}", v.response);
            println!("\nintent {} (confidence {:.2})", label(&v.intent), v.confidence);
            let d = &v.extracted_data;
            if let Some(a) = d.amount {
                println!("  amount    {}", ctx.cfg.money(a));
            }
            for (name, value) in [
                ("category", &d.category),
                ("date", &d.date),
                ("merchant", &d.merchant),
                ("payment", &d.payment_method),
                ("note", &d.description),
            ] {
                if let Some(value) = value {
                    println!("  {name:<9} {value}");
                }
            }
            for q in &v.follow_up_questions {
                println!("? {q}");
            }
            for a in &v.suggested_actions {
                println!("> {a}");
            }
        }

        AiCommand::Tip => {
            let reply = assistant.coaching_tip(&habits);
            print_notice(&reply);
            println!("{}", reply.value);
        }
    }

    Ok(())
}
