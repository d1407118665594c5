// src/utils/topic.rs

use std::sync::LazyLock;

use regex::Regex;

static MAJOR_MINOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)").expect("valid major.minor regex"));

static STANDALONE_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+)\b").expect("valid integer regex"));

static SUBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid subject regex"));

/// Resolves a free-form topic title to a bank key.
///
/// Prefers a `major.minor` pattern ("Tutorial 1.1 - Vectors" -> "1.1"),
/// then the first standalone integer ("Week 3" -> "3").
pub fn resolve_topic_key(topic: &str) -> Option<String> {
    if let Some(caps) = MAJOR_MINOR.captures(topic) {
        return Some(format!("{}.{}", &caps[1], &caps[2]));
    }
    STANDALONE_INT
        .captures(topic)
        .map(|caps| caps[1].to_string())
}

/// Subjects name files and directories, so only a safe charset is accepted.
pub fn is_valid_subject(subject: &str) -> bool {
    SUBJECT.is_match(subject)
}
