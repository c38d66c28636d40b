//! Threshold rules mapping category scores onto advice.

use serde::{Deserialize, Serialize};

use crate::{Category, CategoryScores};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub text: String,
    pub category: Category,
    pub severity: Severity,
    pub urgent: bool,
}

struct Rule {
    category: Category,
    title: &'static str,
    text: &'static str,
    /// Scores strictly above this fire the rule.
    threshold: u32,
    severity: Severity,
    /// Scores strictly above this escalate to high and urgent.
    escalate_above: Option<u32>,
}

const RULES: [Rule; 6] = [
    Rule {
        category: Category::Depression,
        title: "Depression Screening",
        text: "Your responses suggest you may be experiencing symptoms of depression. Consider speaking with a mental health professional for proper evaluation and support.",
        threshold: 4,
        severity: Severity::Moderate,
        escalate_above: Some(8),
    },
    Rule {
        category: Category::Anxiety,
        title: "Anxiety Management",
        text: "Your responses indicate you may be experiencing anxiety symptoms. A mental health professional can provide strategies and support to help manage anxiety.",
        threshold: 4,
        severity: Severity::Moderate,
        escalate_above: Some(8),
    },
    Rule {
        category: Category::Stress,
        title: "Stress Management",
        text: "Your stress levels appear elevated. Consider incorporating stress management techniques like meditation, deep breathing, or professional support.",
        threshold: 6,
        severity: Severity::Moderate,
        escalate_above: Some(10),
    },
    Rule {
        category: Category::Sleep,
        title: "Sleep Health",
        text: "Your sleep quality might be affecting your mental health. Consider establishing a regular sleep schedule and consulting a healthcare provider about sleep improvement strategies.",
        threshold: 2,
        severity: Severity::Moderate,
        escalate_above: None,
    },
    Rule {
        category: Category::Social,
        title: "Social Connection",
        text: "Consider ways to strengthen your social support network. This might include reaching out to friends, joining community groups, or speaking with a counselor.",
        threshold: 2,
        severity: Severity::Low,
        escalate_above: None,
    },
    Rule {
        category: Category::Physical,
        title: "Physical Activity",
        text: "Regular physical activity can improve mental well-being. Consider incorporating more movement into your daily routine.",
        threshold: 2,
        severity: Severity::Low,
        escalate_above: None,
    },
];

impl Rule {
    fn apply(&self, scores: &CategoryScores) -> Option<Recommendation> {
        let value = scores.get(self.category);
        if value <= self.threshold {
            return None;
        }

        let escalated = self.escalate_above.is_some_and(|limit| value > limit);
        Some(Recommendation {
            title: self.title.to_string(),
            text: self.text.to_string(),
            category: self.category,
            severity: if escalated {
                Severity::High
            } else {
                self.severity
            },
            urgent: escalated,
        })
    }
}

/// Recommendations for `scores`, at most one per category, in category order.
pub fn recommend(scores: &CategoryScores) -> Vec<Recommendation> {
    RULES.iter().filter_map(|rule| rule.apply(scores)).collect()
}
