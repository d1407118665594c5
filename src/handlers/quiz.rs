// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    engine::QuizEngine,
    error::AppError,
    models::quiz::{
        AnswerResponse, HintResponse, SessionQuery, StartQuizRequest, SubmitAnswerRequest,
    },
};

/// Starts an adaptive quiz.
///
/// * Resolves the topic title to a bank key ("Tutorial 1.1" -> "1.1").
/// * Draws the phase-1 questions and returns the first one.
pub async fn start_quiz(
    State(engine): State<Arc<QuizEngine>>,
    Json(req): Json<StartQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let started = engine.start(&req.subject, &req.topic).await?;

    Ok(Json(started))
}

/// Grades the outstanding question of a session.
///
/// Returns the next question, or the final result once the quiz ends.
/// The correct option is never part of the response.
pub async fn submit_answer(
    State(engine): State<Arc<QuizEngine>>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let answer = req
        .answer
        .and_then(|a| usize::try_from(a).ok())
        .ok_or_else(|| AppError::BadRequest("answer is required".to_string()))?;

    let grading = engine.submit(&req.session_id, answer).await?;

    Ok(Json(AnswerResponse::from(grading)))
}

/// Returns the hint for the outstanding question, if it has one.
pub async fn get_hint(
    State(engine): State<Arc<QuizEngine>>,
    Query(params): Query<SessionQuery>,
) -> Result<impl IntoResponse, AppError> {
    let hint = engine.hint(&params.session_id).await?;

    Ok(Json(HintResponse { hint }))
}

/// Current question or stored final result of a session.
pub async fn get_session(
    State(engine): State<Arc<QuizEngine>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let view = engine.view(&session_id).await?;

    Ok(Json(view))
}
