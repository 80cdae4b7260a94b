//! Reply parsing for model output.
//!
//! Models wrap JSON in prose and code fences, drop fields, and send numbers
//! as strings. Parsing here never fails: anything unusable becomes an empty
//! set or a documented default.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

/// Neutral value for a missing 1-10 score
pub const DEFAULT_SCORE: u8 = 5;
pub const DEFAULT_TIMEFRAME: &str = "1 month";
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

pub const NOT_UNDERSTOOD: &str = "I didn't understand that. Could you please rephrase?";
pub const TROUBLE_PROCESSING: &str = "I'm having trouble processing your request. Please try again.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Priority {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    #[default]
    Medium,
    #[serde(rename = "high")]
    High,
}

impl Priority {
    fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

/// One budgeting recommendation, with every optional field resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
    pub estimated_savings: Option<f64>,
    pub timeframe: String,
    pub impact_score: u8,
    pub feasibility_score: u8,
    pub urgency_score: u8,
    pub related_habits: Vec<String>,
    pub implementation_steps: Vec<String>,
    pub monthly_impact: Option<f64>,
}

static JSON_OBJECT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").ok());

/// Span from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    JSON_OBJECT.as_ref()?.find(text).map(|m| m.as_str())
}

fn number(v: Option<&Value>) -> Option<f64> {
    let n: Option<f64> = match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('$').replace(',', "").parse().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn strings(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::Array(items)) => items.iter().filter_map(|i| text(Some(i))).collect(),
        _ => Vec::new(),
    }
}

fn score(v: Option<&Value>) -> u8 {
    number(v)
        .map(|n| n.round().clamp(1.0, 10.0) as u8)
        .unwrap_or(DEFAULT_SCORE)
}

fn recommendation_from_value(v: &Value) -> Option<Recommendation> {
    let obj = v.as_object()?;
    let title = text(obj.get("title"))?;

    Some(Recommendation {
        id: text(obj.get("id")).unwrap_or_else(|| Uuid::new_v4().to_string()),
        title,
        description: text(obj.get("description")).unwrap_or_default(),
        category: text(obj.get("category")).unwrap_or_else(|| "budgeting".to_string()),
        priority: obj
            .get("priority")
            .and_then(Value::as_str)
            .map(Priority::parse_lenient)
            .unwrap_or_default(),
        estimated_savings: number(obj.get("estimatedSavings")),
        timeframe: text(obj.get("timeframe")).unwrap_or_else(|| DEFAULT_TIMEFRAME.to_string()),
        impact_score: score(obj.get("impactScore")),
        feasibility_score: score(obj.get("feasibilityScore")),
        urgency_score: score(obj.get("urgencyScore")),
        related_habits: strings(obj.get("relatedHabits")),
        implementation_steps: strings(obj.get("implementationSteps")),
        monthly_impact: number(obj.get("monthlyImpact")),
    })
}

/// Parse a `{"recommendations": [...]}` reply. Never fails; bad input yields an empty list.
pub fn parse_recommendations(reply: &str) -> Vec<Recommendation> {
    let Some(span) = extract_json_object(reply) else {
        debug!("no JSON object in reply");
        return Vec::new();
    };
    let parsed: Value = match serde_json::from_str(span) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "malformed JSON in recommendations reply");
            return Vec::new();
        }
    };
    let Some(items) = parsed.get("recommendations").and_then(Value::as_array) else {
        return Vec::new();
    };

    let out: Vec<Recommendation> = items.iter().filter_map(recommendation_from_value).collect();
    if out.len() < items.len() {
        debug!(dropped = items.len() - out.len(), "dropped malformed recommendations");
    }
    out
}

/// Most urgent first, then highest impact, then most feasible.
pub fn rank_recommendations(recs: &mut [Recommendation]) {
    recs.sort_by(|a, b| {
        (b.urgency_score, b.impact_score, b.feasibility_score)
            .cmp(&(a.urgency_score, a.impact_score, a.feasibility_score))
    });
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum VoiceIntent {
    #[serde(rename = "expense")]
    Expense,
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "question")]
    Question,
    #[serde(rename = "budget")]
    Budget,
    #[serde(rename = "savings")]
    Savings,
    #[serde(rename = "unknown")]
    #[default]
    Unknown,
}

impl VoiceIntent {
    fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "expense" => VoiceIntent::Expense,
            "income" => VoiceIntent::Income,
            "question" => VoiceIntent::Question,
            "budget" => VoiceIntent::Budget,
            "savings" => VoiceIntent::Savings,
            _ => VoiceIntent::Unknown,
        }
    }
}

/// Financial details pulled out of a spoken request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedData {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// YYYY-MM-DD as spoken/inferred
    pub date: Option<String>,
    pub merchant: Option<String>,
    pub payment_method: Option<String>,
}

impl ExtractedData {
    pub fn is_empty(&self) -> bool {
        *self == ExtractedData::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoiceAnalysis {
    pub intent: VoiceIntent,
    pub confidence: f64,
    pub extracted_data: ExtractedData,
    pub response: String,
    pub follow_up_questions: Vec<String>,
    pub suggested_actions: Vec<String>,
}

impl VoiceAnalysis {
    /// Unknown intent, zero confidence, and a fixed response.
    pub fn fallback(response: &str) -> Self {
        Self {
            intent: VoiceIntent::Unknown,
            confidence: 0.0,
            extracted_data: ExtractedData::default(),
            response: response.to_string(),
            follow_up_questions: Vec::new(),
            suggested_actions: Vec::new(),
        }
    }
}

/// Parse a voice-analysis reply. No JSON reads as "not understood";
/// broken JSON reads as a processing failure.
pub fn parse_voice_analysis(reply: &str) -> VoiceAnalysis {
    let Some(span) = extract_json_object(reply) else {
        return VoiceAnalysis::fallback(NOT_UNDERSTOOD);
    };
    let parsed: Value = match serde_json::from_str(span) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "malformed JSON in voice reply");
            return VoiceAnalysis::fallback(TROUBLE_PROCESSING);
        }
    };

    let data = parsed.get("extractedData");
    let field = |k: &str| data.and_then(|d| d.get(k));

    VoiceAnalysis {
        intent: parsed
            .get("intent")
            .and_then(Value::as_str)
            .map(VoiceIntent::parse_lenient)
            .unwrap_or_default(),
        confidence: number(parsed.get("confidence"))
            .map(|c| c.clamp(0.0, 1.0))
            .unwrap_or(DEFAULT_CONFIDENCE),
        extracted_data: ExtractedData {
            amount: number(field("amount")),
            category: text(field("category")),
            description: text(field("description")),
            date: text(field("date")),
            merchant: text(field("merchant")),
            payment_method: text(field("paymentMethod")),
        },
        response: text(parsed.get("response")).unwrap_or_else(|| NOT_UNDERSTOOD.to_string()),
        follow_up_questions: strings(parsed.get("followUpQuestions")),
        suggested_actions: strings(parsed.get("suggestedActions")),
    }
}
