use std::cell::RefCell;

use anyhow::{bail, Result};
use chrono::{TimeZone, Utc};
use finavatar_ai::{FinancialAssistant, Priority, TextGenerator, VoiceContext, VoiceIntent};
use finavatar_core::{Frequency, FixedClock, HabitStore, NewHabit};

/// Replays canned replies in order and records each prompt it was given.
struct Scripted {
    replies: RefCell<Vec<Result<String>>>,
    prompts: RefCell<Vec<String>>,
}

impl Scripted {
    fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: RefCell::new(replies.into_iter().rev().collect()),
            prompts: RefCell::new(Vec::new()),
        }
    }
}

impl TextGenerator for Scripted {
    fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        match self.replies.borrow_mut().pop() {
            Some(r) => r,
            None => bail!("script exhausted"),
        }
    }
}

fn store() -> HabitStore<FixedClock> {
    let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
    let mut s = HabitStore::with_clock(FixedClock(now));
    s.add_habit(NewHabit::new("u1", "Dining", 35.0, Frequency::Daily).with_description("takeout"));
    s.add_habit(NewHabit::new("u1", "Streaming", 45.0, Frequency::Monthly).recurring(true));
    s
}

#[test]
fn test_enhanced_flow_end_to_end() {
    let s = store();
    let script = Scripted::new(vec![Ok(r#"Sure! {"recommendations":[
        {"title":"Cook at home three nights","priority":"HIGH","estimatedSavings":"315",
         "urgencyScore":8,"impactScore":8,"relatedHabits":["Dining"]},
        {"description":"missing a title"},
        {"title":"Rotate streaming services","priority":"low","urgencyScore":3}
    ]}"#
    .to_string())]);

    let a = FinancialAssistant::new(script);
    let reply = a.enhanced_recommendations(s.habits(), 4000.0, 2000.0, Some("emergency fund"));

    assert!(reply.notice.is_none());
    assert_eq!(reply.value.len(), 2);
    assert_eq!(reply.value[0].title, "Cook at home three nights");
    assert_eq!(reply.value[0].priority, Priority::High);
    assert_eq!(reply.value[0].estimated_savings, Some(315.0));
    assert_eq!(reply.value[1].priority, Priority::Low);
}

#[test]
fn test_prompt_carries_analytics() {
    let s = store();
    let script = Scripted::new(vec![Ok("{}".to_string())]);
    let a = FinancialAssistant::new(script);
    let reply = a.enhanced_recommendations(s.habits(), 4000.0, 2000.0, None);
    assert!(reply.value.is_empty());
    assert!(reply.notice.is_some());

    let prompts = a.generator().prompts.borrow();
    assert_eq!(prompts.len(), 1);
    // Dining 35/day -> 1050/month, 52.5% of expenses
    assert!(prompts[0].contains("- Dining: $1050.00 (52.5%)"));
    assert!(prompts[0].contains("Savings rate: 50.0%"));
}

#[test]
fn test_voice_then_outage() {
    let s = store();
    let script = Scripted::new(vec![
        Ok(r#"{"intent":"expense","confidence":0.8,"extractedData":{"amount":14,"category":"Dining"},"response":"Added $14 for dining."}"#.to_string()),
        Err(anyhow::anyhow!("503 service unavailable")),
    ]);
    let a = FinancialAssistant::new(script);
    let ctx = VoiceContext {
        recent_habits: s.habits().to_vec(),
        monthly_income: 4000.0,
        monthly_expenses: 2000.0,
    };

    let first = a.analyze_voice("fourteen dollars on dinner", Some(&ctx));
    assert_eq!(first.value.intent, VoiceIntent::Expense);
    assert_eq!(first.value.extracted_data.amount, Some(14.0));

    let second = a.analyze_voice("and a tip", Some(&ctx));
    assert!(second.is_degraded());
    assert_eq!(second.value.intent, VoiceIntent::Unknown);
    assert_eq!(second.value.confidence, 0.0);
}
