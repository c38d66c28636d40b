//! Mental-health screening engine.
//!
//! This crate provides:
//! - the fixed screening [`Question`] bank and the [`AnswerSet`] built while answering it
//! - [`score`], summing answers per [`Category`] and deriving a wellbeing percentage
//! - [`recommend`], mapping scores onto a fixed table of threshold rules
//! - [`AssessmentService`], which evaluates and persists completed assessments
//!
//! Scoring and recommendation are pure functions: the same answers always
//! produce the same scores and the same recommendation list.

pub mod answers;
pub mod category;
pub mod error;
pub mod question;
pub mod recommendation;
pub mod scoring;
pub mod service;

pub use answers::AnswerSet;
pub use category::Category;
pub use error::AssessmentError;
pub use question::{Question, QuestionOption, default_questions, progress};
pub use recommendation::{Recommendation, Severity, recommend};
pub use scoring::{CategoryScores, score};
pub use service::{AssessmentResult, AssessmentService, SubmittedAssessment};
