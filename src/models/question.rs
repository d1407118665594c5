// src/models/question.rs

use serde::{Deserialize, Serialize};

/// Difficulty tier of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Normalizes a free-form source value.
    ///
    /// Case-folded and matched by first letter (`e`, `m`, `h`).
    /// Blank or unmatched values become `Medium`.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('e') => Difficulty::Easy,
            Some('h') => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }
}

/// A single multiple-choice question loaded from a bank.
/// Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRecord {
    pub text: String,
    pub options: [String; 4],
    /// Always in `0..=3`.
    pub correct_index: usize,
    pub difficulty: Difficulty,
    pub hint: Option<String>,
    pub explanation: Option<String>,
    pub tags: Vec<String>,
}

/// DTO for sending a question to the client.
/// Excludes the correct index, hint text and explanation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicQuestion {
    /// 1-based position within the quiz.
    pub number: usize,
    pub phase: u8,
    pub text: String,
    pub options: [String; 4],
    pub difficulty: Difficulty,
    pub has_hint: bool,
}

impl PublicQuestion {
    pub fn from_record(record: &QuestionRecord, number: usize, phase: u8) -> Self {
        Self {
            number,
            phase,
            text: record.text.clone(),
            options: record.options.clone(),
            difficulty: record.difficulty,
            has_hint: record.hint.as_deref().is_some_and(|h| !h.trim().is_empty()),
        }
    }
}
