//! Keyword-based subject inference
//!
//! A [`SubjectCatalog`] is an ordered list of subjects, each with a set of
//! keywords, plus a fallback label. Classification scores every subject by
//! the number of its keywords found in the text and picks the best one:
//!
//! - text is lower-cased and split on anything that is not a letter or digit
//! - keywords are normalized the same way and matched as whole words, so
//!   multi-word keywords match as phrases and "law" never matches "lawn"
//! - each keyword counts at most once
//! - ties go to the subject declared first
//! - a text with no hits at all gets the fallback label

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

/// Catalog compiled into the binary, used when no catalog file is configured
pub const DEFAULT_CATALOG: &str = include_str!("../../config/subjects.toml");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Catalog defines no subjects")]
    Empty,

    #[error("Catalog defines no fallback label")]
    MissingFallback,

    #[error("Subject #{0} has a blank label")]
    BlankLabel(usize),

    #[error("Duplicate subject label: {0}")]
    DuplicateLabel(String),

    #[error("Subject {0} has no keywords")]
    NoKeywords(String),

    #[error("Subject {label} has a keyword without letters or digits: {keyword:?}")]
    BlankKeyword { label: String, keyword: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    fallback: Option<String>,
    #[serde(default)]
    subjects: Vec<SubjectFile>,
}

#[derive(Debug, Deserialize)]
struct SubjectFile {
    label: String,
    #[serde(default)]
    keywords: Vec<String>,
}

/// One subject and its normalized keywords
#[derive(Debug, Clone)]
pub struct SubjectEntry {
    label: String,
    /// Each keyword as a token sequence
    keywords: Vec<Vec<String>>,
}

impl SubjectEntry {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Keywords rendered back as space-separated phrases
    pub fn keywords(&self) -> Vec<String> {
        self.keywords.iter().map(|k| k.join(" ")).collect()
    }

    fn score(&self, tokens: &[String]) -> usize {
        self.keywords
            .iter()
            .filter(|keyword| contains_phrase(tokens, keyword))
            .count()
    }
}

/// Ordered subject table with a guaranteed fallback label.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SubjectCatalog {
    entries: Vec<SubjectEntry>,
    fallback: String,
}

impl SubjectCatalog {
    /// Build and validate a catalog from `(label, keywords)` pairs in priority order
    pub fn new<L, K>(subjects: Vec<(L, Vec<K>)>, fallback: &str) -> Result<Self>
    where
        L: Into<String>,
        K: AsRef<str>,
    {
        let fallback = fallback.trim();
        if fallback.is_empty() {
            return Err(CatalogError::MissingFallback);
        }
        if subjects.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(subjects.len());

        for (index, (label, raw_keywords)) in subjects.into_iter().enumerate() {
            let label: String = label.into();
            let label = label.trim().to_string();
            if label.is_empty() {
                return Err(CatalogError::BlankLabel(index));
            }
            if !seen.insert(label.clone()) {
                return Err(CatalogError::DuplicateLabel(label));
            }
            if raw_keywords.is_empty() {
                return Err(CatalogError::NoKeywords(label));
            }

            let mut keywords: Vec<Vec<String>> = Vec::with_capacity(raw_keywords.len());
            for raw in &raw_keywords {
                let tokens = tokenize(raw.as_ref());
                if tokens.is_empty() {
                    return Err(CatalogError::BlankKeyword {
                        label,
                        keyword: raw.as_ref().to_string(),
                    });
                }
                if !keywords.contains(&tokens) {
                    keywords.push(tokens);
                }
            }

            entries.push(SubjectEntry { label, keywords });
        }

        Ok(Self {
            entries,
            fallback: fallback.to_string(),
        })
    }

    /// Parse a catalog from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        let fallback = file.fallback.ok_or(CatalogError::MissingFallback)?;
        let subjects: Vec<(String, Vec<String>)> = file
            .subjects
            .into_iter()
            .map(|s| (s.label, s.keywords))
            .collect();
        Self::new(subjects, &fallback)
    }

    /// Load a catalog from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&content)?;
        log::info!(
            "Loaded subject catalog from {:?} ({} subjects)",
            path,
            catalog.entries.len()
        );
        Ok(catalog)
    }

    /// The catalog shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(DEFAULT_CATALOG)
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn entries(&self) -> &[SubjectEntry] {
        &self.entries
    }

    /// Every label the classifier can return, fallback included
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.entries.iter().map(|e| e.label.as_str()).collect();
        if !labels.contains(&self.fallback.as_str()) {
            labels.push(&self.fallback);
        }
        labels
    }

    /// Infer the subject of `text`. Never fails; unmatched text gets the fallback.
    pub fn infer(&self, text: &str) -> &str {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return &self.fallback;
        }

        let mut best: Option<(&SubjectEntry, usize)> = None;
        for entry in &self.entries {
            let score = entry.score(&tokens);
            // Strictly greater keeps the earlier entry on ties
            if score > 0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((entry, score));
            }
        }

        match best {
            Some((entry, _)) => &entry.label,
            None => &self.fallback,
        }
    }
}

/// Assigns subjects to new flashcards from a shared catalog
#[derive(Debug, Clone)]
pub struct SubjectClassifier {
    catalog: Arc<SubjectCatalog>,
}

impl SubjectClassifier {
    pub fn new(catalog: Arc<SubjectCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &SubjectCatalog {
        &self.catalog
    }

    pub fn infer(&self, text: &str) -> String {
        self.catalog.infer(text).to_string()
    }
}

/// Lower-case `text` and split it into alphanumeric tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn contains_phrase(tokens: &[String], phrase: &[String]) -> bool {
    if phrase.len() > tokens.len() {
        return false;
    }
    tokens.windows(phrase.len()).any(|window| window == phrase)
}
