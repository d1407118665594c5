// src/bank/json.rs

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{BankError, QuestionBank, normalize_answer};
use crate::{
    models::question::{Difficulty, QuestionRecord},
    utils::topic::{is_valid_subject, resolve_topic_key},
};

/// Raw row as stored in a bank file. Every field is optional here so that
/// missing keys can be reported as schema errors rather than parse failures.
#[derive(Debug, Deserialize)]
struct RawRow {
    question: Option<String>,
    options: Option<Vec<Value>>,
    answer: Option<Value>,
    difficulty: Option<String>,
    hint: Option<String>,
    explanation: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

type CacheKey = (String, String);

/// Question bank backed by `<root>/<subject>.json` files.
///
/// Each file is an object mapping section names to arrays of rows.
/// Parsed sections are cached for the lifetime of the process.
pub struct JsonQuestionBank {
    root: PathBuf,
    cache: RwLock<HashMap<CacheKey, Arc<Vec<QuestionRecord>>>>,
}

impl JsonQuestionBank {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn cached(&self, key: &CacheKey) -> Option<Arc<Vec<QuestionRecord>>> {
        self.cache
            .read()
            .ok()
            .and_then(|cache| cache.get(key).cloned())
    }

    async fn read_subject(&self, subject: &str) -> Result<Map<String, Value>, BankError> {
        let path = self.root.join(format!("{}.json", subject));

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BankError::NotFound(format!(
                    "No question bank found for subject {}",
                    subject
                )));
            }
            Err(source) => return Err(BankError::Io { path, source }),
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(sections)) => Ok(sections),
            Ok(_) => Err(BankError::Schema(format!(
                "{}: top level must be an object of sections",
                path.display()
            ))),
            Err(e) => Err(BankError::Schema(format!("{}: {}", path.display(), e))),
        }
    }
}

#[async_trait]
impl QuestionBank for JsonQuestionBank {
    async fn load(
        &self,
        subject: &str,
        topic_key: &str,
    ) -> Result<Arc<Vec<QuestionRecord>>, BankError> {
        if !is_valid_subject(subject) {
            return Err(BankError::InvalidSubject(subject.to_string()));
        }

        let key = (subject.to_string(), topic_key.to_string());
        if let Some(hit) = self.cached(&key) {
            return Ok(hit);
        }

        let sections = self.read_subject(subject).await?;
        let rows = find_section(&sections, topic_key).ok_or_else(|| {
            BankError::NotFound(format!(
                "No section {} found for subject {}",
                topic_key, subject
            ))
        })?;

        let records = Arc::new(parse_rows(rows)?);
        tracing::info!(
            "Loaded {} questions for {} / {}",
            records.len(),
            subject,
            topic_key
        );

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, records.clone());
        }

        Ok(records)
    }
}

/// Finds the section whose name is the key, or resolves to it
/// (so "1.1 Vectors" matches "1.1").
fn find_section<'a>(sections: &'a Map<String, Value>, topic_key: &str) -> Option<&'a Value> {
    sections.get(topic_key).or_else(|| {
        sections
            .iter()
            .find(|(name, _)| resolve_topic_key(name).as_deref() == Some(topic_key))
            .map(|(_, rows)| rows)
    })
}

fn parse_rows(rows: &Value) -> Result<Vec<QuestionRecord>, BankError> {
    let rows = rows
        .as_array()
        .ok_or_else(|| BankError::Schema("section must be an array of questions".to_string()))?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let raw: RawRow = serde_json::from_value(row.clone())
            .map_err(|e| BankError::Schema(format!("row {}: {}", i, e)))?;
        if let Some(record) = parse_row(raw, i)? {
            records.push(record);
        }
    }

    if records.is_empty() {
        return Err(BankError::Schema("no usable questions".to_string()));
    }
    Ok(records)
}

/// Returns `Ok(None)` for rows without question text.
fn parse_row(raw: RawRow, i: usize) -> Result<Option<QuestionRecord>, BankError> {
    let text = match raw.question.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => return Ok(None),
    };

    let options = raw
        .options
        .ok_or_else(|| BankError::Schema(format!("row {}: missing options", i)))?;
    let options = options
        .into_iter()
        .map(|opt| option_text(opt, i))
        .collect::<Result<Vec<_>, _>>()?;
    let options: [String; 4] = options.try_into().map_err(|v: Vec<String>| {
        BankError::Schema(format!("row {}: expected 4 options, found {}", i, v.len()))
    })?;

    let answer = raw
        .answer
        .ok_or_else(|| BankError::Schema(format!("row {}: missing answer", i)))?;
    let difficulty = raw
        .difficulty
        .ok_or_else(|| BankError::Schema(format!("row {}: missing difficulty", i)))?;

    let correct_index = normalize_answer(&answer, &options);

    Ok(Some(QuestionRecord {
        text,
        options,
        correct_index,
        difficulty: Difficulty::normalize(&difficulty),
        hint: raw.hint,
        explanation: raw.explanation,
        tags: raw.tags,
    }))
}

/// Options may be strings or bare scalars (`[1, 2, 3, 4]` in a maths bank).
fn option_text(opt: Value, i: usize) -> Result<String, BankError> {
    match opt {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(BankError::Schema(format!(
            "row {}: options must be strings or numbers, found {}",
            i, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_bank(dir: &tempfile::TempDir, subject: &str, body: Value) {
        std::fs::write(
            dir.path().join(format!("{}.json", subject)),
            serde_json::to_string(&body).unwrap(),
        )
        .unwrap();
    }

    fn row(q: &str, answer: Value, difficulty: &str) -> Value {
        json!({
            "question": q,
            "options": ["a", "b", "c", "d"],
            "answer": answer,
            "difficulty": difficulty,
        })
    }

    #[tokio::test]
    async fn test_load_normalizes_rows() {
        let dir = tempfile::tempdir().unwrap();
        write_bank(
            &dir,
            "LA",
            json!({
                "1.1 Vectors": [
                    row("Q1", json!("B"), "Easy"),
                    row("Q2", json!(3), "HARD"),
                    row("Q3", json!("c"), ""),
                    row("   ", json!(0), "easy"),
                    row("Q4", json!("zzz"), "medium"),
                ]
            }),
        );

        let bank = JsonQuestionBank::new(dir.path());
        let records = bank.load("LA", "1.1").await.unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].correct_index, 1);
        assert_eq!(records[0].difficulty, Difficulty::Easy);
        assert_eq!(records[1].correct_index, 3);
        assert_eq!(records[1].difficulty, Difficulty::Hard);
        assert_eq!(records[2].difficulty, Difficulty::Medium);
        assert_eq!(records[3].text, "Q4");
        assert_eq!(records[3].correct_index, 0);
    }

    #[tokio::test]
    async fn test_load_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        write_bank(&dir, "Stats", json!({"2": [row("Q", json!(1), "e")]}));

        let bank = JsonQuestionBank::new(dir.path());
        let first = bank.load("Stats", "2").await.unwrap();

        std::fs::remove_file(dir.path().join("Stats.json")).unwrap();
        let second = bank.load("Stats", "2").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_missing_subject_and_section() {
        let dir = tempfile::tempdir().unwrap();
        write_bank(&dir, "LA", json!({"1.1": [row("Q", json!(1), "e")]}));
        let bank = JsonQuestionBank::new(dir.path());

        assert!(matches!(
            bank.load("Physics", "1.1").await,
            Err(BankError::NotFound(_))
        ));
        assert!(matches!(
            bank.load("LA", "9.9").await,
            Err(BankError::NotFound(_))
        ));
        assert!(matches!(
            bank.load("../LA", "1.1").await,
            Err(BankError::InvalidSubject(_))
        ));
    }

    #[tokio::test]
    async fn test_schema_errors() {
        let dir = tempfile::tempdir().unwrap();
        write_bank(
            &dir,
            "LA",
            json!({
                "1": [{"question": "Q", "options": ["a", "b"], "answer": 0, "difficulty": "e"}],
                "2": [{"question": "Q", "options": ["a", "b", "c", "d"], "difficulty": "e"}],
                "3": [{"question": "Q", "options": ["a", "b", "c", "d"], "answer": 0}],
                "4": [{"question": "", "options": ["a", "b", "c", "d"], "answer": 0, "difficulty": "e"}],
                "5": "not a list",
            }),
        );
        let bank = JsonQuestionBank::new(dir.path());

        for key in ["1", "2", "3", "4", "5"] {
            assert!(
                matches!(bank.load("LA", key).await, Err(BankError::Schema(_))),
                "section {} should be a schema error",
                key
            );
        }
    }

    #[tokio::test]
    async fn test_numeric_options_become_text() {
        let dir = tempfile::tempdir().unwrap();
        write_bank(
            &dir,
            "LA",
            json!({
                "1.2": [{"question": "det([[2,0],[0,2]])?", "options": [1, 2, 4, 8], "answer": "4", "difficulty": "easy"}],
                "1.3": [{"question": "Q", "options": [1, null, 3, 4], "answer": 0, "difficulty": "easy"}],
            }),
        );
        let bank = JsonQuestionBank::new(dir.path());

        let records = bank.load("LA", "1.2").await.unwrap();
        assert_eq!(records[0].options, ["1", "2", "4", "8"].map(String::from));
        assert_eq!(records[0].correct_index, 2);

        match bank.load("LA", "1.3").await {
            Err(BankError::Schema(msg)) => assert!(msg.contains("strings or numbers")),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("LA.json"), "{ not json").unwrap();
        let bank = JsonQuestionBank::new(dir.path());

        assert!(matches!(
            bank.load("LA", "1.1").await,
            Err(BankError::Schema(_))
        ));
    }
}
