//! Symptom triage.
//!
//! Free-text symptoms are classified by urgency keywords and enriched with
//! text snippets from an external [`InsightLookup`]. The lookup is best
//! effort: [`SymptomAnalyzer::analyze_with_fallback`] degrades to a static
//! safety message when it fails or times out.

pub mod analysis;
pub mod chat;
pub mod error;
pub mod insights;
pub mod urgency;

pub use analysis::{
    Analysis, DEFAULT_LOOKUP_TIMEOUT, SAFETY_MESSAGE, SymptomAnalyzer, SymptomReport,
};
pub use chat::{ChatResponse, compose_reply, is_emergency, parse_symptoms, respond};
pub use error::{Result, TriageError};
pub use insights::{
    HttpInsightLookup, InsightLookup, InsightStream, RESULT_CLASS, ResultBlocks, StaticInsightLookup,
    TextSegments, search_query,
};
pub use urgency::{URGENT_SYMPTOMS, UrgencyLevel, classify_urgency};
