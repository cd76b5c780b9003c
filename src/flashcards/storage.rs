//! Storage operations for flashcards
//!
//! Directory structure under the data directory:
//! ```text
//! students/{hex(student-id)}/
//! └── cards/
//!     └── {card-id}.json   # Individual card files
//! ```
//!
//! Student ids are opaque, so the directory name is their hex encoding.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use thiserror::Error;

use super::models::FlashcardRecord;

#[derive(Error, Debug)]
pub enum FlashcardStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid student id")]
    InvalidStudentId,

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, FlashcardStorageError>;

/// Durable home for flashcard records, keyed by student
pub trait FlashcardStore: Send + Sync {
    /// Persist a new record
    fn insert(&self, record: &FlashcardRecord) -> Result<()>;

    /// All records of one student, oldest first
    fn list_for_student(&self, student_id: &str) -> Result<Vec<FlashcardRecord>>;
}

/// Storage manager backed by one JSON file per card
pub struct FlashcardStorage {
    /// Base path for student directories (e.g., ~/.local/share/smart-flashcards/students)
    students_path: PathBuf,
}

impl FlashcardStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            students_path: data_dir.join("students"),
        }
    }

    /// Initialize the storage root
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.students_path)?;
        Ok(())
    }

    /// Get the cards directory for a student
    fn cards_dir(&self, student_id: &str) -> Result<PathBuf> {
        if student_id.is_empty() {
            return Err(FlashcardStorageError::InvalidStudentId);
        }
        Ok(self
            .students_path
            .join(hex::encode(student_id.as_bytes()))
            .join("cards"))
    }

    /// Student ids that have at least one card directory
    pub fn list_students(&self) -> Result<Vec<String>> {
        if !self.students_path.exists() {
            return Ok(Vec::new());
        }

        let mut students = Vec::new();
        for entry in fs::read_dir(&self.students_path)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let decoded = name
                .to_str()
                .and_then(|n| hex::decode(n).ok())
                .and_then(|bytes| String::from_utf8(bytes).ok());
            match decoded {
                Some(student_id) => students.push(student_id),
                None => log::warn!("Skipping unexpected entry in student storage: {:?}", name),
            }
        }

        students.sort();
        Ok(students)
    }
}

impl FlashcardStore for FlashcardStorage {
    fn insert(&self, record: &FlashcardRecord) -> Result<()> {
        let cards_dir = self.cards_dir(&record.student_id)?;
        fs::create_dir_all(&cards_dir)?;

        // Write then rename so readers never see a half-written card
        let tmp_path = cards_dir.join(format!("{}.json.tmp", record.id));
        let card_path = cards_dir.join(format!("{}.json", record.id));
        fs::write(&tmp_path, serde_json::to_string_pretty(record)?)?;
        fs::rename(&tmp_path, &card_path)?;

        log::debug!("Stored card {} at {:?}", record.id, card_path);
        Ok(())
    }

    fn list_for_student(&self, student_id: &str) -> Result<Vec<FlashcardRecord>> {
        let cards_dir = self.cards_dir(student_id)?;
        if !cards_dir.exists() {
            return Ok(Vec::new());
        }

        let mut cards = Vec::new();
        for entry in fs::read_dir(&cards_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let content = fs::read_to_string(&path)?;
                let card: FlashcardRecord = serde_json::from_str(&content)?;
                cards.push(card);
            }
        }

        cards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(cards)
    }
}

/// In-process store that keeps records for the lifetime of the process
#[derive(Default)]
pub struct MemoryFlashcardStore {
    cards: RwLock<HashMap<String, Vec<FlashcardRecord>>>,
}

impl MemoryFlashcardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlashcardStore for MemoryFlashcardStore {
    fn insert(&self, record: &FlashcardRecord) -> Result<()> {
        if record.student_id.is_empty() {
            return Err(FlashcardStorageError::InvalidStudentId);
        }
        let mut cards = self
            .cards
            .write()
            .map_err(|_| FlashcardStorageError::LockPoisoned)?;
        cards
            .entry(record.student_id.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    fn list_for_student(&self, student_id: &str) -> Result<Vec<FlashcardRecord>> {
        let cards = self
            .cards
            .read()
            .map_err(|_| FlashcardStorageError::LockPoisoned)?;
        Ok(cards.get(student_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (FlashcardStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FlashcardStorage::new(temp_dir.path().to_path_buf());
        storage.init().unwrap();
        (storage, temp_dir)
    }

    fn record(student_id: &str, question: &str, subject: &str) -> FlashcardRecord {
        FlashcardRecord::new(
            student_id.to_string(),
            question.to_string(),
            "answer".to_string(),
            subject.to_string(),
        )
    }

    #[test]
    fn test_insert_and_list() {
        let (storage, _temp) = create_test_storage();

        let first = record("stu001", "What is inertia?", "Physics");
        let mut second = record("stu001", "What is a cell?", "Biology");
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        storage.insert(&second).unwrap();
        storage.insert(&first).unwrap();
        storage.insert(&record("stu002", "What is DNA?", "Biology")).unwrap();

        let cards = storage.list_for_student("stu001").unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0], first);
        assert_eq!(cards[1], second);

        assert_eq!(storage.list_for_student("stu002").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_student_is_empty() {
        let (storage, _temp) = create_test_storage();
        assert!(storage.list_for_student("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_empty_student_id_rejected() {
        let (storage, _temp) = create_test_storage();
        assert!(matches!(
            storage.list_for_student(""),
            Err(FlashcardStorageError::InvalidStudentId)
        ));
        assert!(matches!(
            storage.insert(&record("", "q", "General")),
            Err(FlashcardStorageError::InvalidStudentId)
        ));
    }

    #[test]
    fn test_student_ids_with_path_characters() {
        let (storage, temp) = create_test_storage();

        storage.insert(&record("../escape", "q1", "General")).unwrap();
        storage.insert(&record("a/b", "q2", "General")).unwrap();

        assert_eq!(storage.list_for_student("../escape").unwrap().len(), 1);
        assert_eq!(storage.list_for_student("a/b").unwrap().len(), 1);
        assert!(!temp.path().join("escape").exists());

        assert_eq!(storage.list_students().unwrap(), vec!["../escape", "a/b"]);
    }

    #[test]
    fn test_list_ignores_non_json_files() {
        let (storage, temp) = create_test_storage();
        storage.insert(&record("stu001", "q", "General")).unwrap();

        let cards_dir = temp
            .path()
            .join("students")
            .join(hex::encode("stu001"))
            .join("cards");
        fs::write(cards_dir.join("notes.txt"), "not a card").unwrap();
        fs::write(cards_dir.join("half.json.tmp"), "{").unwrap();

        assert_eq!(storage.list_for_student("stu001").unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_card_is_an_error() {
        let (storage, temp) = create_test_storage();
        storage.insert(&record("stu001", "q", "General")).unwrap();

        let cards_dir = temp
            .path()
            .join("students")
            .join(hex::encode("stu001"))
            .join("cards");
        fs::write(cards_dir.join("broken.json"), "{").unwrap();

        assert!(matches!(
            storage.list_for_student("stu001"),
            Err(FlashcardStorageError::Json(_))
        ));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryFlashcardStore::new();
        let card = record("stu001", "q", "Physics");
        store.insert(&card).unwrap();

        assert_eq!(store.list_for_student("stu001").unwrap(), vec![card]);
        assert!(store.list_for_student("stu002").unwrap().is_empty());
        assert!(matches!(
            store.insert(&record("", "q", "Physics")),
            Err(FlashcardStorageError::InvalidStudentId)
        ));
    }
}
