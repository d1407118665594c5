// src/handlers/tutorials.rs

use std::path::Path;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{
    config::Config,
    error::AppError,
    models::tutorial::{HealthResponse, TutorialList, TutorialListParams},
    utils::topic::is_valid_subject,
};

/// Liveness probe. Also reports which tutorial subjects are on disk.
pub async fn healthz(State(config): State<Config>) -> Result<impl IntoResponse, AppError> {
    let tutorial_subjects = match list_entries(&config.tutorials_dir, |p| p.is_dir()).await {
        Ok(subjects) => subjects,
        Err(e) => {
            tracing::warn!(
                "Cannot read tutorials dir {}: {}",
                config.tutorials_dir.display(),
                e
            );
            Vec::new()
        }
    };

    Ok(Json(HealthResponse {
        ok: true,
        tutorial_subjects,
    }))
}

/// Lists the PDF tutorials available for a subject.
pub async fn list_tutorials(
    State(config): State<Config>,
    Query(params): Query<TutorialListParams>,
) -> Result<impl IntoResponse, AppError> {
    let not_found = || AppError::NotFound(format!("No tutorials found for subject {}", params.subject));

    if !is_valid_subject(&params.subject) {
        return Err(not_found());
    }

    let subject_dir = config.tutorials_dir.join(&params.subject);
    if !tokio::fs::try_exists(&subject_dir).await.unwrap_or(false) {
        return Err(not_found());
    }

    let files = list_entries(&subject_dir, |p| {
        p.is_file()
            && p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    })
    .await?;

    Ok(Json(TutorialList {
        subject: params.subject,
        files,
    }))
}

/// Sorted file names in `dir` whose path passes `keep`.
async fn list_entries(dir: &Path, keep: fn(&Path) -> bool) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if keep(&path) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
