//! finavatar-ai: prompt building, tolerant reply parsing, and the LLM client

pub mod assistant;
pub mod client;
pub mod prompts;
pub mod reply;

pub use assistant::{AssistantReply, FinancialAssistant};
pub use client::{LlmClient, LlmConfig, Provider, TextGenerator};
pub use prompts::{QuestionContext, VoiceContext};
pub use reply::{
    parse_recommendations, parse_voice_analysis, rank_recommendations, ExtractedData, Priority,
    Recommendation, VoiceAnalysis, VoiceIntent,
};
