// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::question::PublicQuestion;

/// Final label attached to a finished quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizStatus {
    #[serde(rename = "Review & retry")]
    ReviewAndRetry,
    #[serde(rename = "Ready for next")]
    ReadyForNext,
    Confident,
    Proficient,
    Master,
    Champion,
    #[serde(rename = "Great progress")]
    GreatProgress,
}

impl QuizStatus {
    /// Status for a quiz that completed phase 2, keyed by (total asked, score).
    pub fn for_phase2(total: usize, score: usize) -> Self {
        match (total, score) {
            (6, 5) => QuizStatus::Confident,
            (7, 6) => QuizStatus::Proficient,
            (8, 7) => QuizStatus::Master,
            (8, 8) => QuizStatus::Champion,
            _ => QuizStatus::GreatProgress,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuizStatus::ReviewAndRetry => "Review & retry",
            QuizStatus::ReadyForNext => "Ready for next",
            QuizStatus::Confident => "Confident",
            QuizStatus::Proficient => "Proficient",
            QuizStatus::Master => "Master",
            QuizStatus::Champion => "Champion",
            QuizStatus::GreatProgress => "Great progress",
        }
    }
}

/// Outcome stored on a session once it reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub score: usize,
    pub total: usize,
    pub unlock_next: bool,
    pub status: QuizStatus,
    pub hints_used: usize,
}

/// What follows a graded answer.
#[derive(Debug, Clone, PartialEq)]
pub enum NextStep {
    Question(PublicQuestion),
    Finished(FinalResult),
}

/// Result of grading one submitted answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Grading {
    pub is_correct: bool,
    pub next: NextStep,
}

/// DTO for starting a quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct StartQuizRequest {
    #[validate(length(min = 1, max = 64, message = "subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, max = 200, message = "topic is required"))]
    pub topic: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartQuizResponse {
    pub session_id: String,
    pub question: PublicQuestion,
    pub finished: bool,
}

/// DTO for answering the outstanding question.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, message = "session_id is required"))]
    pub session_id: String,
    #[validate(
        required(message = "answer is required"),
        range(min = 0, max = 3, message = "answer must be between 0 and 3")
    )]
    pub answer: Option<i64>,
}

/// Response to an answer submission.
/// Carries either the next question or the flattened final result.
#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub is_correct: bool,
    pub finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<PublicQuestion>,
    #[serde(flatten)]
    pub result: Option<FinalResult>,
}

impl From<Grading> for AnswerResponse {
    fn from(grading: Grading) -> Self {
        match grading.next {
            NextStep::Question(q) => AnswerResponse {
                is_correct: grading.is_correct,
                finished: false,
                question: Some(q),
                result: None,
            },
            NextStep::Finished(result) => AnswerResponse {
                is_correct: grading.is_correct,
                finished: true,
                question: None,
                result: Some(result),
            },
        }
    }
}

/// Query parameters addressing a live session.
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct HintResponse {
    pub hint: Option<String>,
}

/// Read-only snapshot of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub subject: String,
    pub topic: String,
    pub finished: bool,
    pub asked: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<PublicQuestion>,
    #[serde(flatten)]
    pub result: Option<FinalResult>,
}
