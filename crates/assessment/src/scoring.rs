use serde::{Deserialize, Serialize};

use crate::{AnswerSet, Category, Question};

/// Summed answer scores per category plus the derived wellbeing percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub depression: u32,
    pub anxiety: u32,
    pub stress: u32,
    pub wellbeing: f64,
    pub sleep: u32,
    pub social: u32,
    pub physical: u32,
}

impl CategoryScores {
    /// Summed score for a scored category. `Wellbeing` is not a sum and yields 0.
    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Depression => self.depression,
            Category::Anxiety => self.anxiety,
            Category::Stress => self.stress,
            Category::Sleep => self.sleep,
            Category::Social => self.social,
            Category::Physical => self.physical,
            Category::Wellbeing => 0,
        }
    }

    fn slot(&mut self, category: Category) -> Option<&mut u32> {
        match category {
            Category::Depression => Some(&mut self.depression),
            Category::Anxiety => Some(&mut self.anxiety),
            Category::Stress => Some(&mut self.stress),
            Category::Sleep => Some(&mut self.sleep),
            Category::Social => Some(&mut self.social),
            Category::Physical => Some(&mut self.physical),
            Category::Wellbeing => None,
        }
    }

    /// Sum over every scored category.
    pub fn total(&self) -> u32 {
        Category::SCORED.iter().map(|c| self.get(*c)).sum()
    }
}

/// Scores `answers` against `questions`.
///
/// Answers for ids not in `questions` are ignored. Wellbeing is
/// `100 - total / max_total * 100`, where `max_total` is the sum of every
/// question's highest option, clamped to `[0, 100]`.
pub fn score(answers: &AnswerSet, questions: &[Question]) -> CategoryScores {
    let mut scores = CategoryScores::default();
    let mut answered_total: u64 = 0;
    let mut max_total: u64 = 0;

    for question in questions {
        max_total += u64::from(question.max_score());

        let Some(value) = answers.get(question.id) else {
            continue;
        };
        answered_total += u64::from(value);
        if let Some(slot) = scores.slot(question.category) {
            *slot = slot.saturating_add(value);
        }
    }

    scores.wellbeing = if max_total == 0 {
        100.0
    } else {
        (100.0 - (answered_total as f64 / max_total as f64) * 100.0).clamp(0.0, 100.0)
    };
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_questions;

    #[test]
    fn sums_per_category() {
        let questions = default_questions();
        let answers: AnswerSet = [(1, 2), (2, 3), (3, 1), (5, 4), (8, 2)].into_iter().collect();

        let scores = score(&answers, &questions);
        assert_eq!(scores.depression, 5);
        assert_eq!(scores.anxiety, 1);
        assert_eq!(scores.stress, 4);
        assert_eq!(scores.sleep, 0);
        assert_eq!(scores.physical, 2);
        assert_eq!(scores.total(), 12);
    }

    #[test]
    fn wellbeing_uses_highest_option_of_each_question() {
        let questions = default_questions();
        // 7 questions top out at 3, the stress question at 4.
        let answers: AnswerSet = [(5, 4), (6, 1)].into_iter().collect();

        let scores = score(&answers, &questions);
        assert!((scores.wellbeing - 80.0).abs() < 1e-9);
    }

    #[test]
    fn mixed_complete_answers_pin_wellbeing() {
        let questions = default_questions();
        let answers: AnswerSet = [(1, 3), (2, 0), (3, 2), (4, 1), (5, 4), (6, 0), (7, 2), (8, 1)]
            .into_iter()
            .collect();
        assert!(answers.is_complete(&questions));

        let scores = score(&answers, &questions);
        assert_eq!(scores.depression, 3);
        assert_eq!(scores.anxiety, 3);
        assert_eq!(scores.stress, 4);
        assert_eq!(scores.sleep, 0);
        assert_eq!(scores.social, 2);
        assert_eq!(scores.physical, 1);
        assert_eq!(scores.total(), 13);
        // 100 - 13 / 25 * 100
        assert!((scores.wellbeing - 48.0).abs() < 1e-9, "{}", scores.wellbeing);

        let ones: AnswerSet = questions.iter().map(|q| (q.id, 1)).collect();
        assert!((score(&ones, &questions).wellbeing - 68.0).abs() < 1e-9);
    }

    #[test]
    fn empty_bank_is_fully_well() {
        let answers: AnswerSet = [(1, 3)].into_iter().collect();
        let scores = score(&answers, &[]);
        assert_eq!(scores.wellbeing, 100.0);
        assert_eq!(scores.total(), 0);
    }

    #[test]
    fn out_of_range_answers_are_clamped() {
        let questions = default_questions();
        let answers: AnswerSet = questions.iter().map(|q| (q.id, 50)).collect();

        let scores = score(&answers, &questions);
        assert_eq!(scores.wellbeing, 0.0);
    }

    #[test]
    fn serializes_as_flat_object() {
        let scores = CategoryScores {
            depression: 1,
            wellbeing: 96.0,
            ..Default::default()
        };
        let json = serde_json::to_value(scores).unwrap();
        assert_eq!(json["depression"], 1);
        assert_eq!(json["wellbeing"], 96.0);
        assert_eq!(json.as_object().unwrap().len(), 7);
    }
}
