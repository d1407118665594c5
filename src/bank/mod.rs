// src/bank/mod.rs

//! Question bank loading.
//!
//! The engine only sees the [`QuestionBank`] capability; [`JsonQuestionBank`]
//! is the file-backed implementation used by the server.

mod json;
mod normalize;

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::question::QuestionRecord;

pub use json::JsonQuestionBank;
pub use normalize::normalize_answer;

#[derive(Debug, Error)]
pub enum BankError {
    /// No data source for the subject, or no matching section in it.
    #[error("{0}")]
    NotFound(String),

    /// The source exists but is malformed or holds no usable questions.
    #[error("malformed question bank: {0}")]
    Schema(String),

    #[error("invalid subject '{0}'")]
    InvalidSubject(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves a (subject, topic key) pair to its ordered question records.
///
/// Implementations must be idempotent and return a non-empty collection.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    async fn load(
        &self,
        subject: &str,
        topic_key: &str,
    ) -> Result<Arc<Vec<QuestionRecord>>, BankError>;
}
