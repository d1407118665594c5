// src/models/tutorial.rs

use serde::{Deserialize, Serialize};

/// Query parameters for listing tutorials.
#[derive(Debug, Deserialize)]
pub struct TutorialListParams {
    pub subject: String,
}

#[derive(Debug, Serialize)]
pub struct TutorialList {
    pub subject: String,
    pub files: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub tutorial_subjects: Vec<String>,
}
