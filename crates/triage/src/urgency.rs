use serde::{Deserialize, Serialize};

/// Phrases that mark a symptom list as needing prompt attention.
pub const URGENT_SYMPTOMS: [&str; 7] = [
    "chest pain",
    "difficulty breathing",
    "severe pain",
    "unconscious",
    "bleeding",
    "stroke",
    "heart attack",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    High,
    Medium,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::High => "high",
            UrgencyLevel::Medium => "medium",
        }
    }
}

impl std::fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `High` if any symptom contains an urgent phrase, case-insensitively.
pub fn classify_urgency<S: AsRef<str>>(symptoms: &[S]) -> UrgencyLevel {
    let urgent = symptoms.iter().any(|symptom| {
        let symptom = symptom.as_ref().to_lowercase();
        URGENT_SYMPTOMS.iter().any(|phrase| symptom.contains(phrase))
    });

    if urgent {
        UrgencyLevel::High
    } else {
        UrgencyLevel::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgent_phrases_are_high() {
        assert_eq!(classify_urgency(&["chest pain"]), UrgencyLevel::High);
        assert_eq!(
            classify_urgency(&["fever", "Sudden BLEEDING from nose"]),
            UrgencyLevel::High
        );
    }

    #[test]
    fn everything_else_is_medium() {
        assert_eq!(classify_urgency(&["mild headache"]), UrgencyLevel::Medium);
        assert_eq!(classify_urgency::<&str>(&[]), UrgencyLevel::Medium);
        assert_eq!(classify_urgency(&["chest", "pain"]), UrgencyLevel::Medium);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(UrgencyLevel::High).unwrap(),
            serde_json::json!("high")
        );
    }
}
