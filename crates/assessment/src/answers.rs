use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Question;

/// Chosen option scores keyed by question id.
///
/// Answering the same question twice keeps the latest answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<u32, u32>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the score of the option chosen for `question_id`.
    pub fn answer(&mut self, question_id: u32, score: u32) -> &mut Self {
        self.0.insert(question_id, score);
        self
    }

    /// Records the option at `option_index` of `question`.
    ///
    /// Returns false, recording nothing, if the index is out of range.
    pub fn choose(&mut self, question: &Question, option_index: usize) -> bool {
        match question.options.get(option_index) {
            Some(option) => {
                self.0.insert(question.id, option.score);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, question_id: u32) -> Option<u32> {
        self.0.get(&question_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True once every question in `questions` has an answer.
    pub fn is_complete(&self, questions: &[Question]) -> bool {
        questions.iter().all(|q| self.0.contains_key(&q.id))
    }

    /// Questions from `questions` that have not been answered yet, in order.
    pub fn unanswered<'a>(&self, questions: &'a [Question]) -> Vec<&'a Question> {
        questions
            .iter()
            .filter(|q| !self.0.contains_key(&q.id))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.0.iter().map(|(id, score)| (*id, *score))
    }
}

impl FromIterator<(u32, u32)> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = (u32, u32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_questions;

    #[test]
    fn later_answer_replaces_earlier() {
        let mut answers = AnswerSet::new();
        answers.answer(1, 3).answer(1, 0);
        assert_eq!(answers.get(1), Some(0));
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn choose_records_option_score() {
        let questions = default_questions();
        let mut answers = AnswerSet::new();

        assert!(answers.choose(&questions[4], 4));
        assert_eq!(answers.get(5), Some(4));
        assert!(!answers.choose(&questions[0], 7));
        assert_eq!(answers.get(1), None);
    }

    #[test]
    fn completeness_tracks_unanswered_questions() {
        let questions = default_questions();
        let mut answers: AnswerSet = questions.iter().skip(1).map(|q| (q.id, 0)).collect();

        assert!(!answers.is_complete(&questions));
        let missing = answers.unanswered(&questions);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].id, 1);

        answers.answer(1, 2);
        assert!(answers.is_complete(&questions));
    }

    #[test]
    fn serializes_as_plain_map() {
        let answers: AnswerSet = [(1, 2), (3, 0)].into_iter().collect();
        let json = serde_json::to_value(&answers).unwrap();
        assert_eq!(json, serde_json::json!({ "1": 2, "3": 0 }));

        let back: AnswerSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, answers);
    }
}
