//! The assistant: prompt, generate, parse, and degrade.
//!
//! No method here returns an error. A failed model call or an unusable reply
//! produces an empty or fallback value, and `notice` says why.

use finavatar_core::{financial_analytics, Habit};
use serde::Serialize;
use tracing::{info, warn};

use crate::client::TextGenerator;
use crate::prompts::{self, QuestionContext, VoiceContext};
use crate::reply::{
    parse_recommendations, parse_voice_analysis, rank_recommendations, Recommendation,
    VoiceAnalysis, TROUBLE_PROCESSING,
};

pub const QUESTION_FALLBACK: &str = "I'm sorry, I'm having trouble answering your question. Please try again.";
pub const COACHING_FALLBACK: &str = "Keep tracking your expenses to build better financial habits!";

pub const NOTICE_UNAVAILABLE: &str = "AI recommendations are temporarily unavailable.";
pub const NOTICE_NOTHING_USABLE: &str = "The AI reply contained no usable recommendations.";

/// A result plus an optional user-facing note about degraded output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply<T> {
    pub value: T,
    pub notice: Option<String>,
}

impl<T> AssistantReply<T> {
    fn ok(value: T) -> Self {
        Self { value, notice: None }
    }

    fn degraded(value: T, notice: impl Into<String>) -> Self {
        Self {
            value,
            notice: Some(notice.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.notice.is_some()
    }
}

pub struct FinancialAssistant<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> FinancialAssistant<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    fn ask(&self, what: &str, prompt: &str) -> Option<String> {
        match self.generator.generate(prompt) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(request = what, error = %format!("{e:#}"), "model call failed");
                None
            }
        }
    }

    fn recommendations_from(&self, what: &str, prompt: &str) -> AssistantReply<Vec<Recommendation>> {
        let Some(text) = self.ask(what, prompt) else {
            return AssistantReply::degraded(Vec::new(), NOTICE_UNAVAILABLE);
        };
        let mut recs = parse_recommendations(&text);
        if recs.is_empty() {
            return AssistantReply::degraded(recs, NOTICE_NOTHING_USABLE);
        }
        rank_recommendations(&mut recs);
        info!(request = what, count = recs.len(), "recommendations ready");
        AssistantReply::ok(recs)
    }

    /// Recommendations from the habit list alone.
    pub fn recommendations(
        &self,
        habits: &[Habit],
        monthly_income: f64,
        monthly_expenses: f64,
    ) -> AssistantReply<Vec<Recommendation>> {
        let prompt = prompts::recommendations_prompt(habits, monthly_income, monthly_expenses);
        self.recommendations_from("recommendations", &prompt)
    }

    /// Recommendations backed by the analytics report and optional goals.
    pub fn enhanced_recommendations(
        &self,
        habits: &[Habit],
        monthly_income: f64,
        monthly_expenses: f64,
        goals: Option<&str>,
    ) -> AssistantReply<Vec<Recommendation>> {
        let analytics = financial_analytics(habits, monthly_income, monthly_expenses);
        let prompt = prompts::enhanced_recommendations_prompt(
            habits,
            monthly_income,
            monthly_expenses,
            &analytics,
            goals,
        );
        self.recommendations_from("enhanced_recommendations", &prompt)
    }

    pub fn analyze_voice(&self, transcript: &str, ctx: Option<&VoiceContext>) -> AssistantReply<VoiceAnalysis> {
        let prompt = prompts::voice_prompt(transcript, ctx);
        match self.ask("voice", &prompt) {
            Some(text) => AssistantReply::ok(parse_voice_analysis(&text)),
            None => AssistantReply::degraded(VoiceAnalysis::fallback(TROUBLE_PROCESSING), NOTICE_UNAVAILABLE),
        }
    }

    pub fn answer_question(&self, question: &str, ctx: Option<&QuestionContext>) -> AssistantReply<String> {
        let prompt = prompts::question_prompt(question, ctx);
        match self.ask("question", &prompt) {
            Some(text) if !text.trim().is_empty() => AssistantReply::ok(text.trim().to_string()),
            Some(_) => AssistantReply::degraded(QUESTION_FALLBACK.to_string(), NOTICE_NOTHING_USABLE),
            None => AssistantReply::degraded(QUESTION_FALLBACK.to_string(), NOTICE_UNAVAILABLE),
        }
    }

    pub fn coaching_tip(&self, habits: &[Habit]) -> AssistantReply<String> {
        let prompt = prompts::coaching_prompt(habits);
        match self.ask("coaching", &prompt) {
            Some(text) if !text.trim().is_empty() => AssistantReply::ok(text.trim().to_string()),
            Some(_) => AssistantReply::degraded(COACHING_FALLBACK.to_string(), NOTICE_NOTHING_USABLE),
            None => AssistantReply::degraded(COACHING_FALLBACK.to_string(), NOTICE_UNAVAILABLE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::VoiceIntent;
    use anyhow::{anyhow, Result};

    fn failing(_: &str) -> Result<String> {
        Err(anyhow!("connection refused"))
    }

    #[test]
    fn test_service_failure_degrades() {
        let a = FinancialAssistant::new(failing);

        let recs = a.recommendations(&[], 1000.0, 900.0);
        assert!(recs.value.is_empty());
        assert_eq!(recs.notice.as_deref(), Some(NOTICE_UNAVAILABLE));

        let voice = a.analyze_voice("bought coffee", None);
        assert_eq!(voice.value.intent, VoiceIntent::Unknown);
        assert_eq!(voice.value.confidence, 0.0);
        assert_eq!(voice.value.response, TROUBLE_PROCESSING);

        assert_eq!(a.answer_question("should I refinance?", None).value, QUESTION_FALLBACK);
        assert_eq!(a.coaching_tip(&[]).value, COACHING_FALLBACK);
    }

    #[test]
    fn test_recommendations_ranked() {
        let a = FinancialAssistant::new(|_: &str| -> Result<String> {
            Ok(r#"```json
{"recommendations":[{"title":"Later","urgencyScore":2},{"title":"Now","urgencyScore":9}]}
```"#
                .to_string())
        });
        let recs = a.recommendations(&[], 3000.0, 2500.0);
        assert!(!recs.is_degraded());
        assert_eq!(recs.value[0].title, "Now");
        assert_eq!(recs.value[1].title, "Later");
    }

    #[test]
    fn test_prose_reply_is_empty_with_notice() {
        let a = FinancialAssistant::new(|_: &str| -> Result<String> { Ok("Spend less!".to_string()) });
        let recs = a.enhanced_recommendations(&[], 3000.0, 2500.0, None);
        assert!(recs.value.is_empty());
        assert_eq!(recs.notice.as_deref(), Some(NOTICE_NOTHING_USABLE));
    }

    #[test]
    fn test_text_answers_trimmed() {
        let a = FinancialAssistant::new(|_: &str| -> Result<String> { Ok("  Pay the 24% card first.\n".to_string()) });
        let r = a.answer_question("which debt first?", None);
        assert_eq!(r.value, "Pay the 24% card first.");
        assert!(!r.is_degraded());

        let blank = FinancialAssistant::new(|_: &str| -> Result<String> { Ok("   ".to_string()) });
        assert_eq!(blank.coaching_tip(&[]).value, COACHING_FALLBACK);
    }
}
