//! Data models for the flashcard system

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored flashcard belonging to one student.
///
/// The subject is assigned once, when the card is created, and is never
/// recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardRecord {
    pub id: Uuid,
    pub student_id: String,
    pub question: String,
    pub answer: String,
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

impl FlashcardRecord {
    pub fn new(student_id: String, question: String, answer: String, subject: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            question,
            answer,
            subject,
            created_at: Utc::now(),
        }
    }

    /// Text handed to the subject classifier for a question/answer pair
    pub fn classifier_input(question: &str, answer: &str) -> String {
        format!("{} {}", question, answer)
    }
}

/// Request to create a flashcard. Fields are optional so that missing
/// values can be reported as a validation failure rather than a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewFlashcard {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

/// The public shape of a flashcard returned by retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardView {
    pub question: String,
    pub answer: String,
    pub subject: String,
}

impl From<&FlashcardRecord> for FlashcardView {
    fn from(record: &FlashcardRecord) -> Self {
        Self {
            question: record.question.clone(),
            answer: record.answer.clone(),
            subject: record.subject.clone(),
        }
    }
}

/// Result of creating a flashcard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedFlashcard {
    pub message: String,
    pub subject: String,
}

impl CreatedFlashcard {
    pub fn new(subject: String) -> Self {
        Self {
            message: "Flashcard added successfully".to_string(),
            subject,
        }
    }
}
