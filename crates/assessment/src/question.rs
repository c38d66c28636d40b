//! The screening question bank.

use serde::{Deserialize, Serialize};

use crate::Category;

/// One selectable answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub label: String,
    pub score: u32,
}

/// A screening question. Options are ordered from least to most concerning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub text: String,
    pub category: Category,
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn new(id: u32, text: impl Into<String>, category: Category) -> Self {
        Self {
            id,
            text: text.into(),
            category,
            options: Vec::new(),
        }
    }

    /// Appends an option; options are scored in the order they are added.
    pub fn option(mut self, label: impl Into<String>, score: u32) -> Self {
        self.options.push(QuestionOption {
            label: label.into(),
            score,
        });
        self
    }

    /// Highest score any option of this question carries.
    pub fn max_score(&self) -> u32 {
        self.options.iter().map(|o| o.score).max().unwrap_or(0)
    }

    /// Lowest score any option of this question carries.
    pub fn min_score(&self) -> u32 {
        self.options.iter().map(|o| o.score).min().unwrap_or(0)
    }
}

const FREQUENCY: [&str; 4] = [
    "Not at all",
    "Several days",
    "More than half the days",
    "Nearly every day",
];

fn frequency_question(id: u32, text: &str, category: Category) -> Question {
    FREQUENCY
        .iter()
        .zip(0..)
        .fold(Question::new(id, text, category), |q, (label, score)| {
            q.option(*label, score)
        })
}

/// The eight-question screening bank.
pub fn default_questions() -> Vec<Question> {
    vec![
        frequency_question(
            1,
            "Over the past 2 weeks, how often have you felt little interest or pleasure in doing things?",
            Category::Depression,
        ),
        frequency_question(
            2,
            "Over the past 2 weeks, how often have you felt down, depressed, or hopeless?",
            Category::Depression,
        ),
        frequency_question(
            3,
            "Over the past 2 weeks, how often have you felt nervous, anxious, or on edge?",
            Category::Anxiety,
        ),
        frequency_question(
            4,
            "Over the past 2 weeks, how often have you not been able to stop or control worrying?",
            Category::Anxiety,
        ),
        Question::new(
            5,
            "In the past month, how often have you felt that you were unable to control the important things in your life?",
            Category::Stress,
        )
        .option("Never", 0)
        .option("Almost never", 1)
        .option("Sometimes", 2)
        .option("Fairly often", 3)
        .option("Very often", 4),
        Question::new(
            6,
            "Over the past 2 weeks, how would you rate your sleep quality overall?",
            Category::Sleep,
        )
        .option("Very good", 0)
        .option("Fairly good", 1)
        .option("Fairly bad", 2)
        .option("Very bad", 3),
        Question::new(
            7,
            "How satisfied are you with your social connections and support system?",
            Category::Social,
        )
        .option("Very satisfied", 0)
        .option("Somewhat satisfied", 1)
        .option("Somewhat dissatisfied", 2)
        .option("Very dissatisfied", 3),
        Question::new(
            8,
            "How would you rate your physical activity level in the past 2 weeks?",
            Category::Physical,
        )
        .option("Very active", 0)
        .option("Moderately active", 1)
        .option("Somewhat active", 2)
        .option("Not active at all", 3),
    ]
}

/// Completion percentage after `answered` of `total` questions.
pub fn progress(answered: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (answered.min(total) as f64 / total as f64) * 100.0
}
