//! Creation and retrieval flows
//!
//! Validates requests, runs the classifier on creation and the sampler on
//! retrieval. Everything here is synchronous; the HTTP layer moves calls onto
//! the blocking pool.

use std::sync::Arc;

use rand::Rng;
use thiserror::Error;

use super::classifier::SubjectClassifier;
use super::models::{CreatedFlashcard, FlashcardRecord, FlashcardView, NewFlashcard};
use super::sampler;
use super::storage::{FlashcardStorageError, FlashcardStore};

/// Number of cards returned when the caller gives no limit
pub const DEFAULT_LIMIT: i64 = 5;

/// Largest limit honoured; bigger requests are clamped
pub const MAX_LIMIT: i64 = 50;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Missing student_id")]
    MissingStudentId,

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Storage error: {0}")]
    Storage(#[from] FlashcardStorageError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Bounds applied to the `limit` of a retrieval request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPolicy {
    pub default: i64,
    pub max: i64,
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            default: DEFAULT_LIMIT,
            max: MAX_LIMIT,
        }
    }
}

impl LimitPolicy {
    /// Turn the raw `limit` parameter into the number of cards to return.
    ///
    /// Absent or blank means the default; anything that is not an integer is
    /// rejected. The result, default included, is clamped into `1..=max`.
    pub fn resolve(&self, raw: Option<&str>) -> Result<i64> {
        let requested = match raw.map(str::trim) {
            None | Some("") => self.default,
            Some(raw) => raw
                .parse()
                .map_err(|_| ServiceError::InvalidLimit(raw.to_string()))?,
        };
        Ok(requested.clamp(1, self.max.max(1)))
    }
}

/// Entry point used by the HTTP handlers and the CLI
#[derive(Clone)]
pub struct FlashcardService {
    store: Arc<dyn FlashcardStore>,
    classifier: SubjectClassifier,
}

impl FlashcardService {
    pub fn new(store: Arc<dyn FlashcardStore>, classifier: SubjectClassifier) -> Self {
        Self { store, classifier }
    }

    pub fn classifier(&self) -> &SubjectClassifier {
        &self.classifier
    }

    /// Validate, classify and persist a new flashcard
    pub fn add_flashcard(&self, request: NewFlashcard) -> Result<FlashcardRecord> {
        let student_id = non_blank(request.student_id);
        let question = non_blank(request.question);
        let answer = non_blank(request.answer);

        let (student_id, question, answer) = match (student_id, question, answer) {
            (Some(s), Some(q), Some(a)) => (s, q, a),
            (s, q, a) => {
                log::error!(
                    "Missing required fields in flashcard creation (student_id: {}, question: {}, answer: {})",
                    s.as_deref().unwrap_or("missing"),
                    if q.is_some() { "provided" } else { "missing" },
                    if a.is_some() { "provided" } else { "missing" },
                );
                return Err(ServiceError::MissingFields);
            }
        };

        let subject = self
            .classifier
            .infer(&FlashcardRecord::classifier_input(&question, &answer));
        let question_len = question.chars().count();
        let record = FlashcardRecord::new(student_id, question, answer, subject);
        self.store.insert(&record)?;

        log::info!(
            "Flashcard created (student_id: {}, subject: {}, question_length: {})",
            record.student_id,
            record.subject,
            question_len
        );
        Ok(record)
    }

    /// Same as [`add_flashcard`](Self::add_flashcard) but shaped as the API response
    pub fn create(&self, request: NewFlashcard) -> Result<CreatedFlashcard> {
        let record = self.add_flashcard(request)?;
        Ok(CreatedFlashcard::new(record.subject))
    }

    /// Load a student's cards and return a subject-diverse sample of `limit` of them
    pub fn mixed_flashcards<R>(&self, student_id: Option<&str>, limit: i64, rng: &mut R) -> Result<Vec<FlashcardView>>
    where
        R: Rng + ?Sized,
    {
        let student_id = match student_id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => {
                log::error!("Missing student_id in flashcard retrieval");
                return Err(ServiceError::MissingStudentId);
            }
        };

        let cards = self.store.list_for_student(student_id)?;
        log::info!(
            "Flashcards retrieved (student_id: {}, total_cards: {}, requested_limit: {})",
            student_id,
            cards.len(),
            limit
        );

        let picked = sampler::sample(&cards, limit, rng);
        let subjects = sampler::subjects_of(picked.iter().copied());
        let output: Vec<FlashcardView> = picked.into_iter().map(FlashcardView::from).collect();

        log::info!(
            "Mixed subject flashcards returned (student_id: {}, returned_count: {}, subjects: {:?})",
            student_id,
            output.len(),
            subjects
        );
        Ok(output)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::classifier::SubjectCatalog;
    use crate::flashcards::storage::MemoryFlashcardStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn create_test_service() -> (FlashcardService, Arc<MemoryFlashcardStore>) {
        let store = Arc::new(MemoryFlashcardStore::new());
        let catalog = Arc::new(SubjectCatalog::builtin().unwrap());
        let service = FlashcardService::new(store.clone(), SubjectClassifier::new(catalog));
        (service, store)
    }

    fn new_card(student_id: &str, question: &str, answer: &str) -> NewFlashcard {
        NewFlashcard {
            student_id: Some(student_id.to_string()),
            question: Some(question.to_string()),
            answer: Some(answer.to_string()),
        }
    }

    #[test]
    fn test_add_flashcard_infers_subject() {
        let (service, store) = create_test_service();

        let created = service
            .create(new_card(
                "stu001",
                "What is Newton's Second Law?",
                "Force equals mass times acceleration",
            ))
            .unwrap();
        assert_eq!(created.subject, "Physics");
        assert_eq!(created.message, "Flashcard added successfully");

        let stored = store.list_for_student("stu001").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].subject, "Physics");
        assert_eq!(stored[0].question, "What is Newton's Second Law?");
    }

    #[test]
    fn test_add_flashcard_missing_fields() {
        let (service, store) = create_test_service();

        let mut request = new_card("stu001", "Q", "A");
        request.answer = None;
        assert!(matches!(service.add_flashcard(request), Err(ServiceError::MissingFields)));

        let blank_question = new_card("stu001", "   ", "A");
        assert!(matches!(
            service.add_flashcard(blank_question),
            Err(ServiceError::MissingFields)
        ));

        assert!(matches!(
            service.add_flashcard(NewFlashcard::default()),
            Err(ServiceError::MissingFields)
        ));

        assert!(store.list_for_student("stu001").unwrap().is_empty());
    }

    #[test]
    fn test_mixed_flashcards_end_to_end() {
        let (service, _store) = create_test_service();
        let physics = [
            ("What is Newton's Second Law?", "Force equals mass times acceleration"),
            ("What is inertia?", "Resistance of mass to a change in motion"),
            ("What is momentum?", "Mass times velocity"),
        ];
        for (q, a) in physics {
            assert_eq!(service.create(new_card("stu001", q, a)).unwrap().subject, "Physics");
        }

        let mut rng = StdRng::seed_from_u64(9);
        let cards = service.mixed_flashcards(Some("stu001"), 5, &mut rng).unwrap();
        assert_eq!(cards.len(), 3);
        assert!(cards.iter().all(|c| c.subject == "Physics"));
        let questions: HashSet<&str> = cards.iter().map(|c| c.question.as_str()).collect();
        assert_eq!(questions.len(), 3);
    }

    #[test]
    fn test_mixed_flashcards_spans_subjects() {
        let (service, _store) = create_test_service();
        let cards = [
            ("What is Newton's Second Law?", "Force equals mass times acceleration"),
            ("What is momentum?", "Mass times velocity"),
            ("What is photosynthesis?", "A process used by plants to convert light into energy"),
            ("What do mitochondria do?", "They produce energy for the cell"),
            ("What is the capital of France?", "Paris"),
        ];
        for (q, a) in cards {
            service.create(new_card("stu001", q, a)).unwrap();
        }

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = service.mixed_flashcards(Some("stu001"), 3, &mut rng).unwrap();
            let subjects: HashSet<&str> = picked.iter().map(|c| c.subject.as_str()).collect();
            assert_eq!(subjects, HashSet::from(["Physics", "Biology", "Geography"]));
        }
    }

    #[test]
    fn test_mixed_flashcards_requires_student() {
        let (service, _store) = create_test_service();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            service.mixed_flashcards(None, 5, &mut rng),
            Err(ServiceError::MissingStudentId)
        ));
        assert!(matches!(
            service.mixed_flashcards(Some("  "), 5, &mut rng),
            Err(ServiceError::MissingStudentId)
        ));
        assert!(service.mixed_flashcards(Some("new-student"), 5, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_limit_policy() {
        let policy = LimitPolicy::default();
        assert_eq!(policy.resolve(None).unwrap(), 5);
        assert_eq!(policy.resolve(Some("")).unwrap(), 5);
        assert_eq!(policy.resolve(Some("3")).unwrap(), 3);
        assert_eq!(policy.resolve(Some(" 7 ")).unwrap(), 7);
        assert_eq!(policy.resolve(Some("0")).unwrap(), 1);
        assert_eq!(policy.resolve(Some("-4")).unwrap(), 1);
        assert_eq!(policy.resolve(Some("500")).unwrap(), 50);
        assert!(matches!(policy.resolve(Some("ten")), Err(ServiceError::InvalidLimit(v)) if v == "ten"));
        assert!(matches!(policy.resolve(Some("2.5")), Err(ServiceError::InvalidLimit(_))));

        let custom = LimitPolicy { default: 10, max: 20 };
        assert_eq!(custom.resolve(None).unwrap(), 10);
        assert_eq!(custom.resolve(Some("99")).unwrap(), 20);
    }

    #[test]
    fn test_limit_policy_clamps_configured_default() {
        let zero = LimitPolicy { default: 0, max: 50 };
        assert_eq!(zero.resolve(None).unwrap(), 1);

        let too_big = LimitPolicy { default: 80, max: 50 };
        assert_eq!(too_big.resolve(None).unwrap(), 50);
        assert_eq!(too_big.resolve(Some(" ")).unwrap(), 50);
    }
}
