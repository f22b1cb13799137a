use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/quiz-record-v1.json");

static RECORD_VALIDATOR: LazyLock<Result<jsonschema::Validator, String>> = LazyLock::new(|| {
    let schema: serde_json::Value = serde_json::from_str(SCHEMA_JSON)
        .map_err(|e| format!("Invalid embedded schema JSON: {}", e))?;
    jsonschema::validator_for(&schema).map_err(|e| format!("Failed to compile JSON schema: {}", e))
});

/// A parsed quiz source record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub quiz: Vec<QuizItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizItem {
    pub question_id: u64,
    pub question: String,
    pub options: Vec<String>,
    /// Exact text of the correct option.
    pub answer: String,
}

impl QuizRecord {
    pub fn item_count(&self) -> usize {
        self.quiz.len()
    }

    pub fn item_ids(&self) -> Vec<u64> {
        self.quiz.iter().map(|item| item.question_id).collect()
    }
}

pub fn read_record(path: &Path) -> Result<QuizRecord, RecordError> {
    let content = std::fs::read_to_string(path).map_err(|e| RecordError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_record(&content, path)
}

/// Parses and validates record JSON. `path` is only used for error context.
pub fn parse_record(content: &str, path: &Path) -> Result<QuizRecord, RecordError> {
    let json_value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| RecordError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

    validate_schema(&json_value, path)?;

    let record: QuizRecord =
        serde_json::from_value(json_value).map_err(|e| RecordError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

    validate_record(&record, path)?;

    Ok(record)
}

fn validate_schema(json_value: &serde_json::Value, path: &Path) -> Result<(), RecordError> {
    let validator = RECORD_VALIDATOR
        .as_ref()
        .map_err(|message| RecordError::Schema {
            path: path.to_path_buf(),
            errors: message.clone(),
        })?;

    let errors: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();

    if !errors.is_empty() {
        return Err(RecordError::Schema {
            path: path.to_path_buf(),
            errors: errors.join("; "),
        });
    }

    Ok(())
}

fn validate_record(record: &QuizRecord, path: &Path) -> Result<(), RecordError> {
    let invalid = |reason: String| RecordError::Invalid {
        path: path.to_path_buf(),
        reason,
    };

    if record.quiz.is_empty() {
        return Err(invalid("Record contains no questions".to_string()));
    }

    let mut seen_ids = HashSet::new();
    for item in &record.quiz {
        if !seen_ids.insert(item.question_id) {
            return Err(invalid(format!(
                "Duplicate question_id {}",
                item.question_id
            )));
        }

        if !item.options.iter().any(|option| option == &item.answer) {
            return Err(invalid(format!(
                "Answer for question {} is not one of its options",
                item.question_id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn path() -> PathBuf {
        PathBuf::from("Ancient Rome.1.json")
    }

    const VALID: &str = r#"
    {
        "quiz": [
            {
                "question_id": 1,
                "question": "Who was the first emperor of Rome?",
                "options": ["Augustus", "Nero", "Caligula"],
                "answer": "Augustus"
            },
            {
                "question_id": 2,
                "question": "Which river runs through Rome?",
                "options": ["Tiber", "Po", "Arno"],
                "answer": "Tiber",
                "difficulty": "low"
            }
        ]
    }
    "#;

    #[test]
    fn test_parse_valid_record() {
        let record = parse_record(VALID, &path()).unwrap();
        assert_eq!(record.item_count(), 2);
        assert_eq!(record.item_ids(), vec![1, 2]);
        assert_eq!(record.quiz[0].answer, "Augustus");
    }

    #[test]
    fn test_missing_quiz_key_fails_schema() {
        let result = parse_record(r#"{ "questions": [] }"#, &path());
        assert!(matches!(result, Err(RecordError::Schema { .. })));
    }

    #[test]
    fn test_wrong_field_type_fails_schema() {
        let content = r#"
        { "quiz": [ { "question_id": "one", "question": "Q", "options": ["a", "b"], "answer": "a" } ] }
        "#;
        match parse_record(content, &path()) {
            Err(RecordError::Schema { errors, .. }) => assert!(!errors.is_empty()),
            other => panic!("Expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_answer_must_match_an_option() {
        let content = r#"
        { "quiz": [ { "question_id": 3, "question": "Q", "options": ["a", "b"], "answer": "c" } ] }
        "#;
        match parse_record(content, &path()) {
            Err(RecordError::Invalid { reason, .. }) => {
                assert!(reason.contains("question 3"));
            }
            other => panic!("Expected invalid record error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_question_ids_rejected() {
        let content = r#"
        { "quiz": [
            { "question_id": 1, "question": "Q1", "options": ["a", "b"], "answer": "a" },
            { "question_id": 1, "question": "Q2", "options": ["a", "b"], "answer": "b" }
        ] }
        "#;
        assert!(matches!(
            parse_record(content, &path()),
            Err(RecordError::Invalid { .. })
        ));
    }

    #[test]
    fn test_empty_record_rejected() {
        assert!(matches!(
            parse_record(r#"{ "quiz": [] }"#, &path()),
            Err(RecordError::Invalid { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_record("{ quiz", &path()),
            Err(RecordError::Parse { .. })
        ));
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_record(Path::new("/nonexistent/record.json"));
        assert!(matches!(result, Err(RecordError::Read { .. })));
    }
}
