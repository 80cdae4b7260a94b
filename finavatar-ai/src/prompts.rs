//! Prompt text for each assistant request.
//!
//! Every prompt that expects structured output spells out the JSON shape with
//! camelCase keys, matching what `reply` parses.

use std::fmt::Write as _;

use finavatar_core::{FinancialAnalytics, Habit};

/// Habits shown to the coaching prompt
pub const COACHING_HABIT_LIMIT: usize = 5;

/// Optional background for a voice transcript
#[derive(Debug, Clone, Default)]
pub struct VoiceContext {
    pub recent_habits: Vec<Habit>,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
}

/// Optional background for a free-form question
#[derive(Debug, Clone, Default)]
pub struct QuestionContext {
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub habit_count: usize,
}

const RECOMMENDATION_SHAPE: &str = r#"Reply with JSON only, in this shape:
{
  "recommendations": [
    {
      "id": "short-unique-id",
      "title": "actionable title",
      "description": "explanation with concrete numbers",
      "category": "budgeting|savings|investment|debt|spending|emergency|optimization",
      "priority": "high|medium|low",
      "estimatedSavings": 0,
      "timeframe": "1 week|1 month|3 months|6 months|1 year",
      "impactScore": 1,
      "feasibilityScore": 1,
      "urgencyScore": 1,
      "relatedHabits": ["category"],
      "implementationSteps": ["step"],
      "monthlyImpact": 0
    }
  ]
}
Scores are integers from 1 to 10. Money amounts are monthly dollars."#;

const VOICE_SHAPE: &str = r#"Reply with JSON only, in this shape:
{
  "intent": "expense|income|question|budget|savings|unknown",
  "confidence": 0.0,
  "extractedData": {
    "amount": null,
    "category": null,
    "description": null,
    "date": "YYYY-MM-DD or null",
    "merchant": null,
    "paymentMethod": null
  },
  "response": "short reply to the user",
  "followUpQuestions": [],
  "suggestedActions": []
}
Confidence is between 0 and 1."#;

fn habit_line(h: &Habit) -> String {
    let mut line = format!("- {}: ${:.2} {}", h.category, h.amount, h.frequency.as_str());
    if !h.description.is_empty() {
        let _ = write!(line, " - {}", h.description);
    }
    if h.is_recurring {
        line.push_str(" (recurring)");
    }
    line
}

fn habit_list(habits: &[Habit]) -> String {
    if habits.is_empty() {
        return "- none recorded".to_string();
    }
    habits.iter().map(habit_line).collect::<Vec<_>>().join("\n")
}

/// Recommendations from income, expenses, and the raw habit list.
pub fn recommendations_prompt(habits: &[Habit], monthly_income: f64, monthly_expenses: f64) -> String {
    format!(
        "You are a personal finance coach. Suggest 3 to 5 concrete budgeting changes for this user.\n\n\
         Monthly income: ${monthly_income:.2}\n\
         Monthly expenses: ${monthly_expenses:.2}\n\n\
         Spending habits:\n{}\n\n{RECOMMENDATION_SHAPE}",
        habit_list(habits)
    )
}

/// Recommendations grounded in the deterministic analytics report, plus the
/// user's own goals when given.
pub fn enhanced_recommendations_prompt(
    habits: &[Habit],
    monthly_income: f64,
    monthly_expenses: f64,
    analytics: &FinancialAnalytics,
    goals: Option<&str>,
) -> String {
    let mut p = String::new();
    p.push_str("You are a personal finance coach. Use the analysis below to suggest 5 to 7 specific changes, ");
    p.push_str("mixing quick wins (1-2 weeks), medium-term fixes (1-3 months), and long-term strategy (6+ months).\n\n");

    p.push_str("Overview:\n");
    let _ = writeln!(p, "- Monthly income: ${monthly_income:.2}");
    let _ = writeln!(p, "- Monthly expenses: ${monthly_expenses:.2}");
    let _ = writeln!(p, "- Savings rate: {:.1}%", analytics.savings_rate);
    let _ = writeln!(p, "- Expenses to income: {:.1}%", analytics.expense_to_income);
    let _ = writeln!(p, "- Health score: {}/100", analytics.health_score);
    let _ = writeln!(p, "- Risk level: {:?}", analytics.risk_level);
    let _ = writeln!(p, "- Trend: {:?}", analytics.monthly_trend);
    let _ = writeln!(p, "- Discretionary spending: ${:.2}", analytics.discretionary_spending);

    p.push_str("\nTop categories:\n");
    if analytics.top_spending_categories.is_empty() {
        p.push_str("- none\n");
    }
    for c in &analytics.top_spending_categories {
        let _ = writeln!(p, "- {}: ${:.2} ({:.1}%)", c.category, c.amount, c.percentage);
    }

    let _ = write!(p, "\nSpending habits:\n{}\n", habit_list(habits));

    if let Some(goals) = goals.map(str::trim).filter(|g| !g.is_empty()) {
        let _ = write!(p, "\nUser goals: {goals}\n");
    }

    let _ = write!(p, "\n{RECOMMENDATION_SHAPE}");
    p
}

pub fn voice_prompt(transcript: &str, ctx: Option<&VoiceContext>) -> String {
    let mut p = format!(
        "A user of a budgeting app said the following out loud:\n\"{}\"\n\n\
         Classify the intent, pull out any money details, and write a short helpful reply.\n",
        transcript.trim()
    );

    if let Some(ctx) = ctx {
        let recent = if ctx.recent_habits.is_empty() {
            "none".to_string()
        } else {
            ctx.recent_habits
                .iter()
                .map(|h| format!("{}: ${:.2}", h.category, h.amount))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = write!(
            p,
            "\nContext:\n- Monthly income: ${:.2}\n- Monthly expenses: ${:.2}\n- Recent habits: {recent}\n",
            ctx.monthly_income, ctx.monthly_expenses
        );
    }

    let _ = write!(p, "\n{VOICE_SHAPE}");
    p
}

pub fn question_prompt(question: &str, ctx: Option<&QuestionContext>) -> String {
    let mut p = format!(
        "Answer this personal finance question plainly, with a worked example if it helps \
         and one or two next steps:\n\"{}\"\n",
        question.trim()
    );
    if let Some(ctx) = ctx {
        let _ = write!(
            p,
            "\nContext:\n- Monthly income: ${:.2}\n- Monthly expenses: ${:.2}\n- Habits tracked: {}\n",
            ctx.monthly_income, ctx.monthly_expenses, ctx.habit_count
        );
    }
    p.push_str("\nKeep it short.");
    p
}

/// One encouraging tip based on the most recent habits.
pub fn coaching_prompt(habits: &[Habit]) -> String {
    let start = habits.len().saturating_sub(COACHING_HABIT_LIMIT);
    let recent: Vec<String> = habits[start..]
        .iter()
        .map(|h| format!("- {}: ${:.2} {}", h.category, h.amount, h.description).trim_end().to_string())
        .collect();
    let recent = if recent.is_empty() {
        "- none recorded".to_string()
    } else {
        recent.join("\n")
    };

    format!(
        "Recent spending habits:\n{recent}\n\n\
         Give one practical, encouraging coaching tip in one or two sentences. \
         Point at a specific pattern above."
    )
}
