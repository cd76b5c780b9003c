//! Flashcard subject inference and mixed-subject retrieval
//!
//! This module provides:
//! - Keyword-based subject classification against a static catalog
//! - Subject-diverse sampling of a student's cards
//! - File-backed and in-memory card stores
//! - The create/retrieve flows used by the HTTP API and the CLI

pub mod classifier;
pub mod models;
pub mod sampler;
pub mod service;
pub mod storage;

pub use classifier::{CatalogError, SubjectCatalog, SubjectClassifier};
pub use models::*;
pub use service::{FlashcardService, LimitPolicy, ServiceError};
pub use storage::{FlashcardStorage, FlashcardStorageError, FlashcardStore, MemoryFlashcardStore};
