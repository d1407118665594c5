// src/engine/session.rs

use std::collections::VecDeque;

use rand::rngs::StdRng;

use super::{
    QuizError,
    draw::{QuestionPool, draw, draw_one},
};
use crate::{
    config::QuizSettings,
    models::{
        question::{Difficulty, PublicQuestion, QuestionRecord},
        quiz::{FinalResult, Grading, NextStep, QuizStatus, SessionView},
    },
};

/// Where a session currently stands. The outstanding question lives
/// inside the running states, so a finished session cannot hold one.
#[derive(Debug, Clone)]
pub enum SessionState {
    Phase1 { index: usize, current: QuestionRecord },
    Phase2 { step: usize, current: QuestionRecord },
    Finished(FinalResult),
}

#[derive(Debug, Clone, Copy)]
enum Position {
    Phase1(usize),
    Phase2(usize),
}

/// One learner's pass through a quiz.
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub subject: String,
    pub topic: String,
    pool: QuestionPool,
    phase1_queue: VecDeque<QuestionRecord>,
    state: SessionState,
    score: usize,
    asked: usize,
    phase1_correct: usize,
    hints_used: usize,
    hint_shown: bool,
    rng: StdRng,
}

impl Session {
    /// Partitions `records` into a pool and draws the phase-1 sequence.
    pub fn begin(
        id: String,
        subject: String,
        topic: String,
        records: &[QuestionRecord],
        settings: &QuizSettings,
        mut rng: StdRng,
    ) -> Result<Self, QuizError> {
        let mut pool = QuestionPool::partition(records.iter().cloned());
        let mut phase1_queue: VecDeque<QuestionRecord> =
            draw(&mut pool, &settings.phase1_order, settings.phase1_count, &mut rng)
                .map_err(|_| QuizError::Validation("no questions for phase 1".to_string()))?
                .into();

        let current = phase1_queue
            .pop_front()
            .ok_or_else(|| QuizError::Validation("no questions for phase 1".to_string()))?;

        Ok(Self {
            id,
            subject,
            topic,
            pool,
            phase1_queue,
            state: SessionState::Phase1 { index: 0, current },
            score: 0,
            asked: 0,
            phase1_correct: 0,
            hints_used: 0,
            hint_shown: false,
            rng,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished(_))
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn asked(&self) -> usize {
        self.asked
    }

    fn current(&self) -> Option<(&QuestionRecord, u8)> {
        match &self.state {
            SessionState::Phase1 { current, .. } => Some((current, 1)),
            SessionState::Phase2 { current, .. } => Some((current, 2)),
            SessionState::Finished(_) => None,
        }
    }

    /// The outstanding question as the learner sees it.
    pub fn current_question(&self) -> Option<PublicQuestion> {
        self.current()
            .map(|(record, phase)| PublicQuestion::from_record(record, self.asked + 1, phase))
    }

    pub fn result(&self) -> Option<&FinalResult> {
        match &self.state {
            SessionState::Finished(result) => Some(result),
            _ => None,
        }
    }

    /// Grades `answer` against the outstanding question and advances.
    pub fn submit(&mut self, answer: usize, settings: &QuizSettings) -> Result<Grading, QuizError> {
        let (is_correct, position) = match &self.state {
            SessionState::Phase1 { index, current } => {
                (answer == current.correct_index, Position::Phase1(*index))
            }
            SessionState::Phase2 { step, current } => {
                (answer == current.correct_index, Position::Phase2(*step))
            }
            SessionState::Finished(_) => {
                return Err(QuizError::Validation("session already finished".to_string()));
            }
        };

        self.asked += 1;
        if is_correct {
            self.score += 1;
        }
        self.hint_shown = false;

        let next = match position {
            Position::Phase1(index) => self.after_phase1(index, is_correct, settings),
            Position::Phase2(step) => self.after_phase2(step, is_correct, settings),
        };

        Ok(Grading { is_correct, next })
    }

    fn after_phase1(&mut self, index: usize, is_correct: bool, settings: &QuizSettings) -> NextStep {
        if is_correct {
            self.phase1_correct += 1;
        }

        if let Some(next) = self.phase1_queue.pop_front() {
            return self.ask(SessionState::Phase1 { index: index + 1, current: next });
        }

        if self.phase1_correct < settings.phase1_pass {
            return self.finish(false, QuizStatus::ReviewAndRetry);
        }
        if self.phase1_correct < settings.phase1_count {
            return self.finish(true, QuizStatus::ReadyForNext);
        }

        match draw_one(&mut self.pool, settings.order_for(Difficulty::Hard), &mut self.rng) {
            Ok(next) => self.ask(SessionState::Phase2 { step: 0, current: next }),
            Err(_) => {
                tracing::warn!("Session {}: no questions left for phase 2", self.id);
                self.finish(true, QuizStatus::ReadyForNext)
            }
        }
    }

    fn after_phase2(&mut self, step: usize, is_correct: bool, settings: &QuizSettings) -> NextStep {
        let next_step = step + 1;
        if next_step >= settings.phase2_count {
            return self.finish_phase2();
        }

        let preferred = match (is_correct, step) {
            (true, _) => Difficulty::Hard,
            (false, 0) => Difficulty::Medium,
            (false, _) => Difficulty::Easy,
        };

        match draw_one(&mut self.pool, settings.order_for(preferred), &mut self.rng) {
            Ok(next) => self.ask(SessionState::Phase2 { step: next_step, current: next }),
            Err(_) => {
                tracing::warn!(
                    "Session {}: pool exhausted after {} questions",
                    self.id,
                    self.asked
                );
                self.finish_phase2()
            }
        }
    }

    fn ask(&mut self, state: SessionState) -> NextStep {
        self.state = state;
        match self.current_question() {
            Some(q) => NextStep::Question(q),
            None => unreachable!("ask is only called with a running state"),
        }
    }

    fn finish_phase2(&mut self) -> NextStep {
        let status = QuizStatus::for_phase2(self.asked, self.score);
        self.finish(true, status)
    }

    fn finish(&mut self, unlock_next: bool, status: QuizStatus) -> NextStep {
        let result = FinalResult {
            score: self.score,
            total: self.asked,
            unlock_next,
            status,
            hints_used: self.hints_used,
        };
        self.state = SessionState::Finished(result.clone());
        NextStep::Finished(result)
    }

    /// Reveals the hint of the outstanding question, counting it once.
    pub fn reveal_hint(&mut self) -> Result<Option<String>, QuizError> {
        let hint = match self.current() {
            Some((record, _)) => record.hint.clone().filter(|h| !h.trim().is_empty()),
            None => return Err(QuizError::Validation("session already finished".to_string())),
        };

        if hint.is_some() && !self.hint_shown {
            self.hints_used += 1;
            self.hint_shown = true;
        }
        Ok(hint)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id.clone(),
            subject: self.subject.clone(),
            topic: self.topic.clone(),
            finished: self.is_finished(),
            asked: self.asked,
            question: self.current_question(),
            result: self.result().cloned(),
        }
    }
}
