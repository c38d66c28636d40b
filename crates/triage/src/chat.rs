//! Conversational replies for the symptom chat.

use serde::Serialize;

use crate::analysis::{SymptomAnalyzer, SymptomReport};
use crate::error::{Result, TriageError};
use crate::insights::InsightLookup;
use crate::urgency::UrgencyLevel;

const EMERGENCY_KEYWORDS: [&str; 5] = [
    "heart attack",
    "stroke",
    "unconscious",
    "severe bleeding",
    "difficulty breathing",
];

const EMERGENCY_REPLY: &str = "🚨 **EMERGENCY MEDICAL ATTENTION REQUIRED**

Based on what you've described, you should seek immediate emergency medical care. Please:

1. Call emergency services (911 in the US) immediately
2. Do not wait or delay seeking help
3. If possible, have someone stay with you

This is not a situation for online consultation. Your safety is the top priority.";

const APOLOGY_REPLY: &str = "I apologize, but I'm having trouble analyzing your symptoms right now. For your safety and well-being, I recommend:

1. Consulting with a healthcare professional directly
2. Visiting an urgent care center if you're concerned
3. Calling emergency services if you feel your situation is serious

Is there something else I can help you with?";

/// Splits a chat message into trimmed, non-empty symptoms on commas.
pub fn parse_symptoms(message: &str) -> Vec<String> {
    message
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn is_emergency(message: &str) -> bool {
    let message = message.to_lowercase();
    EMERGENCY_KEYWORDS.iter().any(|k| message.contains(k))
}

/// Reply text for `message`.
///
/// Emergencies always get the emergency reply. Otherwise the reply summarizes
/// `report`, or apologizes when no report could be produced.
pub fn compose_reply(message: &str, report: Option<&SymptomReport>) -> String {
    if is_emergency(message) {
        return EMERGENCY_REPLY.to_string();
    }
    let Some(report) = report else {
        return APOLOGY_REPLY.to_string();
    };

    let analysis = &report.analysis;
    let mut reply = String::from("Thank you for sharing your symptoms. Here's what I can tell you:\n\n");

    if analysis.urgency_level == UrgencyLevel::High {
        reply.push_str("⚠️ These symptoms suggest you should seek prompt medical attention.\n\n");
    }

    reply.push_str("**Based on the information provided:**\n");
    for insight in &analysis.insights {
        reply.push_str(&format!("- {insight}\n"));
    }

    reply.push_str("\n**General Recommendations:**\n");
    for recommendation in &analysis.recommendations {
        reply.push_str(&format!("- {recommendation}\n"));
    }

    if analysis.should_see_doctor {
        reply.push_str(
            "\n👨‍⚕️ It would be advisable to consult with a healthcare professional for proper evaluation.\n",
        );
    }

    reply.push_str(
        "\n**Important Disclaimer:**\n\
         This information is for general guidance only and should not replace professional \
         medical advice. If your symptoms worsen or persist, please consult with a qualified \
         healthcare provider.\n\n\
         Is there anything specific about these recommendations you'd like me to clarify?",
    );
    reply
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(flatten)]
    pub report: Option<SymptomReport>,
}

/// Answers a chat message.
///
/// Fails only when the message holds no symptoms. Lookup failures produce
/// the apology reply without a report.
#[tracing::instrument(skip(analyzer, message))]
pub async fn respond<L: InsightLookup + ?Sized>(
    analyzer: &SymptomAnalyzer<L>,
    message: &str,
) -> Result<ChatResponse> {
    let symptoms = parse_symptoms(message);
    let report = match analyzer.analyze(&symptoms).await {
        Ok(report) => Some(report),
        Err(TriageError::InvalidSymptoms) => return Err(TriageError::InvalidSymptoms),
        Err(e) => {
            tracing::warn!(error = %e, "Chat analysis failed");
            None
        }
    };

    Ok(ChatResponse {
        reply: compose_reply(message, report.as_ref()),
        report,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::StaticInsightLookup;

    #[test]
    fn symptoms_split_on_commas() {
        assert_eq!(
            parse_symptoms(" headache, fever ,, sore throat "),
            vec!["headache", "fever", "sore throat"]
        );
        assert!(parse_symptoms(" , ").is_empty());
    }

    #[test]
    fn emergency_keywords_are_case_insensitive() {
        assert!(is_emergency("I think I'm having a Heart Attack"));
        assert!(is_emergency("severe bleeding, dizziness"));
        assert!(!is_emergency("bleeding gums"));
        assert!(!is_emergency("headache"));
    }

    #[tokio::test]
    async fn normal_reply_lists_insights_and_recommendations() {
        let snippet = "Tension headaches are the most common type of headache among adults worldwide.";
        let analyzer = SymptomAnalyzer::new(Arc::new(StaticInsightLookup::new([snippet])));

        let response = respond(&analyzer, "headache").await.unwrap();
        assert!(response.reply.starts_with("Thank you for sharing your symptoms."));
        assert!(response.reply.contains(&format!("- {snippet}")));
        assert!(response.reply.contains("- Consult a doctor"));
        assert!(!response.reply.contains("prompt medical attention"));
        assert_eq!(response.report.unwrap().results, vec![snippet.to_string()]);
    }

    #[tokio::test]
    async fn high_urgency_adds_warning() {
        let analyzer = SymptomAnalyzer::new(Arc::new(StaticInsightLookup::empty()));
        let response = respond(&analyzer, "chest pain, sweating").await.unwrap();
        assert!(response.reply.contains("prompt medical attention"));
    }

    #[tokio::test]
    async fn emergency_wins_over_lookup_failure() {
        let analyzer = SymptomAnalyzer::new(Arc::new(StaticInsightLookup::failing("offline")));

        let response = respond(&analyzer, "stroke symptoms").await.unwrap();
        assert!(response.reply.starts_with("🚨"));
        assert!(response.report.is_none());

        let response = respond(&analyzer, "cough").await.unwrap();
        assert!(response.reply.starts_with("I apologize"));
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let analyzer = SymptomAnalyzer::new(Arc::new(StaticInsightLookup::empty()));
        assert!(matches!(
            respond(&analyzer, " , ").await,
            Err(TriageError::InvalidSymptoms)
        ));
    }

    #[test]
    fn response_flattens_report() {
        let json = serde_json::to_value(ChatResponse {
            reply: "hi".to_string(),
            report: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "reply": "hi" }));
    }
}
