// src/engine/mod.rs

//! Adaptive quiz engine.
//!
//! Phase 1 asks up to five easy/medium questions. A perfect phase 1 unlocks
//! phase 2, three adaptive questions whose difficulty follows the learner's
//! previous answer. Sessions live in a [`SessionStore`] and are locked
//! individually while an answer is graded.

pub mod draw;
pub mod session;
pub mod store;

use std::sync::{Arc, Mutex};

use rand::{SeedableRng, rngs::StdRng};
use thiserror::Error;

use crate::{
    bank::{BankError, QuestionBank},
    config::QuizSettings,
    models::quiz::{Grading, NextStep, SessionView, StartQuizResponse},
    utils::topic::resolve_topic_key,
};

pub use draw::{ExhaustionError, QuestionPool};
pub use session::{Session, SessionState};
pub use store::{InMemorySessionStore, SessionHandle, SessionStore, spawn_reaper};

#[derive(Debug, Error)]
pub enum QuizError {
    /// Bad or missing caller input.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Bank(#[from] BankError),

    /// Pool underflow. Absorbed into a graceful finish inside sessions.
    #[error("question pool exhausted")]
    Exhausted,
}

impl From<ExhaustionError> for QuizError {
    fn from(_: ExhaustionError) -> Self {
        QuizError::Exhausted
    }
}

pub struct QuizEngine {
    bank: Arc<dyn QuestionBank>,
    store: Arc<dyn SessionStore>,
    settings: QuizSettings,
    seeder: Mutex<StdRng>,
}

impl QuizEngine {
    pub fn new(
        bank: Arc<dyn QuestionBank>,
        store: Arc<dyn SessionStore>,
        settings: QuizSettings,
    ) -> Self {
        let seeder = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            bank,
            store,
            settings,
            seeder: Mutex::new(seeder),
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Each session gets its own RNG so draws vary between sessions
    /// without sharing a lock during `submit`.
    fn session_rng(&self) -> StdRng {
        let mut seeder = self
            .seeder
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        StdRng::from_rng(&mut *seeder)
    }

    /// Starts a quiz for `subject` / `topic` and returns its first question.
    pub async fn start(&self, subject: &str, topic: &str) -> Result<StartQuizResponse, QuizError> {
        let subject = subject.trim();
        let topic_key = resolve_topic_key(topic)
            .ok_or_else(|| QuizError::Validation(format!("cannot resolve topic '{}'", topic)))?;

        // Loaded before any session exists, so no lock is held across I/O.
        let records = self.bank.load(subject, &topic_key).await?;

        let id = uuid::Uuid::new_v4().to_string();
        let session = Session::begin(
            id.clone(),
            subject.to_string(),
            topic_key,
            &records,
            &self.settings,
            self.session_rng(),
        )?;

        let question = session
            .current_question()
            .ok_or_else(|| QuizError::Validation("no questions for phase 1".to_string()))?;

        tracing::info!(
            "Started session {} for {} / {} ({} questions in bank)",
            id,
            session.subject,
            session.topic,
            records.len()
        );
        self.store.create(session).await;

        Ok(StartQuizResponse {
            session_id: id,
            question,
            finished: false,
        })
    }

    /// Grades `answer` for the outstanding question of `session_id`.
    pub async fn submit(&self, session_id: &str, answer: usize) -> Result<Grading, QuizError> {
        let handle = self.handle(session_id).await?;
        let mut session = handle.lock().await;

        let grading = session.submit(answer, &self.settings)?;
        if let NextStep::Finished(result) = &grading.next {
            tracing::info!(
                "Session {} finished: {}/{} ({})",
                session_id,
                result.score,
                result.total,
                result.status.as_str()
            );
        }
        Ok(grading)
    }

    pub async fn hint(&self, session_id: &str) -> Result<Option<String>, QuizError> {
        let handle = self.handle(session_id).await?;
        let mut session = handle.lock().await;
        session.reveal_hint()
    }

    /// Idempotent read of a session, including finished ones.
    pub async fn view(&self, session_id: &str) -> Result<SessionView, QuizError> {
        let handle = self.handle(session_id).await?;
        let session = handle.lock().await;
        Ok(session.view())
    }

    async fn handle(&self, session_id: &str) -> Result<SessionHandle, QuizError> {
        self.store
            .get(session_id)
            .await
            .ok_or_else(|| QuizError::Validation("unknown session".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        question::{Difficulty, QuestionRecord},
        quiz::QuizStatus,
    };
    use async_trait::async_trait;
    use std::time::Duration;

    /// Bank serving the same records for any known subject.
    struct StubBank {
        records: Arc<Vec<QuestionRecord>>,
    }

    #[async_trait]
    impl QuestionBank for StubBank {
        async fn load(
            &self,
            subject: &str,
            topic_key: &str,
        ) -> Result<Arc<Vec<QuestionRecord>>, BankError> {
            if subject != "LA" {
                return Err(BankError::NotFound(format!("no subject {}", subject)));
            }
            if topic_key != "1.1" {
                return Err(BankError::NotFound(format!("no section {}", topic_key)));
            }
            Ok(self.records.clone())
        }
    }

    fn records() -> Vec<QuestionRecord> {
        let mut out = Vec::new();
        for (tier, n) in [(Difficulty::Easy, 5), (Difficulty::Medium, 5), (Difficulty::Hard, 5)] {
            for i in 0..n {
                out.push(QuestionRecord {
                    text: format!("{:?} {}", tier, i),
                    options: ["a".into(), "b".into(), "c".into(), "d".into()],
                    correct_index: 2,
                    difficulty: tier,
                    hint: None,
                    explanation: None,
                    tags: vec![],
                });
            }
        }
        out
    }

    fn engine() -> QuizEngine {
        let settings = QuizSettings {
            seed: Some(5),
            ..QuizSettings::default()
        };
        QuizEngine::new(
            Arc::new(StubBank {
                records: Arc::new(records()),
            }),
            Arc::new(InMemorySessionStore::new()),
            settings,
        )
    }

    #[tokio::test]
    async fn test_start_resolves_topic_title() {
        let engine = engine();
        let started = engine.start("LA", "Tutorial 1.1 - Vectors").await.unwrap();

        assert!(!started.finished);
        assert_eq!(started.question.number, 1);
        assert_eq!(engine.store().len().await, 1);
    }

    #[tokio::test]
    async fn test_start_errors() {
        let engine = engine();

        assert!(matches!(
            engine.start("LA", "Vectors").await,
            Err(QuizError::Validation(_))
        ));
        assert!(matches!(
            engine.start("Physics", "1.1").await,
            Err(QuizError::Bank(BankError::NotFound(_)))
        ));
        assert!(matches!(
            engine.start("LA", "2.2").await,
            Err(QuizError::Bank(BankError::NotFound(_)))
        ));
        assert_eq!(engine.store().len().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let engine = engine();
        let err = engine.submit("nope", 0).await.unwrap_err();
        assert!(matches!(err, QuizError::Validation(msg) if msg == "unknown session"));
    }

    #[tokio::test]
    async fn test_champion_run_then_idempotent_view() {
        let engine = engine();
        let id = engine.start("LA", "1.1").await.unwrap().session_id;

        let mut last = None;
        for _ in 0..8 {
            last = Some(engine.submit(&id, 2).await.unwrap());
        }
        let result = match last.unwrap().next {
            NextStep::Finished(result) => result,
            NextStep::Question(_) => panic!("quiz should be finished"),
        };
        assert_eq!((result.total, result.score), (8, 8));
        assert_eq!(result.status, QuizStatus::Champion);

        let view = engine.view(&id).await.unwrap();
        assert!(view.finished);
        assert_eq!(view.result, Some(result.clone()));
        assert_eq!(engine.view(&id).await.unwrap().result, Some(result));

        let err = engine.submit(&id, 2).await.unwrap_err();
        assert!(matches!(err, QuizError::Validation(msg) if msg == "session already finished"));
    }

    #[tokio::test]
    async fn test_evicted_session_is_unknown() {
        let engine = engine();
        let id = engine.start("LA", "1.1").await.unwrap().session_id;

        engine.store().evict_idle(Duration::ZERO).await;

        let err = engine.submit(&id, 2).await.unwrap_err();
        assert!(matches!(err, QuizError::Validation(msg) if msg == "unknown session"));
    }

    #[tokio::test]
    async fn test_concurrent_answers_grade_distinct_questions() {
        let engine = Arc::new(engine());
        let id = engine.start("LA", "1.1").await.unwrap().session_id;

        let mut tasks = Vec::new();
        for _ in 0..5 {
            let engine = engine.clone();
            let id = id.clone();
            tasks.push(tokio::spawn(async move { engine.submit(&id, 2).await }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let view = engine.view(&id).await.unwrap();
        assert_eq!(view.asked, 5);
        assert_eq!(view.question.unwrap().number, 6);
    }
}
