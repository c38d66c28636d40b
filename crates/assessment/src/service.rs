//! Evaluation and persistence of screening questionnaires.

use std::sync::Arc;

use common::{RecordId, UserId};
use health_store::{AssessmentRecord, AssessmentRepository};
use serde::{Deserialize, Serialize};

use crate::{
    AnswerSet, AssessmentError, CategoryScores, Question, Recommendation, default_questions,
    recommend, score,
};

/// Scores and recommendations for one answer set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub scores: CategoryScores,
    pub recommendations: Vec<Recommendation>,
}

/// A persisted assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittedAssessment {
    pub id: RecordId,
    #[serde(flatten)]
    pub result: AssessmentResult,
}

/// Scores questionnaires and stores completed ones.
pub struct AssessmentService<R> {
    repository: Arc<R>,
    questions: Vec<Question>,
}

impl<R> AssessmentService<R>
where
    R: AssessmentRepository,
{
    /// Creates a service over the default question bank.
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_questions(repository, default_questions())
    }

    pub fn with_questions(repository: Arc<R>, questions: Vec<Question>) -> Self {
        Self {
            repository,
            questions,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Scores an answer set without persisting it. Partial answer sets are allowed.
    #[tracing::instrument(skip(self, answers), fields(answered = answers.len()))]
    pub fn evaluate(&self, answers: &AnswerSet) -> AssessmentResult {
        let scores = score(answers, &self.questions);
        let recommendations = recommend(&scores);

        metrics::counter!("assessments_scored_total").increment(1);
        tracing::debug!(
            wellbeing = scores.wellbeing,
            recommendations = recommendations.len(),
            "Assessment scored"
        );

        AssessmentResult {
            scores,
            recommendations,
        }
    }

    /// Evaluates a complete answer set and stores its scores for `user_id`.
    #[tracing::instrument(skip(self, answers), fields(user_id = %user_id))]
    pub async fn submit(
        &self,
        user_id: UserId,
        answers: &AnswerSet,
    ) -> Result<SubmittedAssessment, AssessmentError> {
        if !answers.is_complete(&self.questions) {
            let total = self.questions.len();
            return Err(AssessmentError::Incomplete {
                answered: total - answers.unanswered(&self.questions).len(),
                total,
            });
        }

        let result = self.evaluate(answers);
        let record = AssessmentRecord::new(user_id, serde_json::to_value(result.scores)?);
        let id = self.repository.insert_assessment(record).await?;

        metrics::counter!("assessments_submitted_total").increment(1);
        tracing::info!(assessment_id = %id, "Assessment submitted");

        Ok(SubmittedAssessment { id, result })
    }

    /// A user's stored assessments, newest first.
    pub async fn history(&self, user_id: UserId) -> Result<Vec<AssessmentRecord>, AssessmentError> {
        Ok(self.repository.assessments_for_user(user_id).await?)
    }
}
