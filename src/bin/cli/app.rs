use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use smart_flashcards_lib::config::AppConfig;
use smart_flashcards_lib::flashcards::{
    FlashcardService, FlashcardStorage, FlashcardStore, SubjectCatalog, SubjectClassifier,
};

/// Shared application state for CLI commands
pub struct App {
    pub config: AppConfig,
    pub catalog: Arc<SubjectCatalog>,
}

impl App {
    /// Load config and the subject catalog
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = AppConfig::load(config_path).context("Failed to load config")?;
        let catalog = config
            .load_catalog()
            .context("Failed to load subject catalog")?;

        Ok(Self {
            config,
            catalog: Arc::new(catalog),
        })
    }

    pub fn classifier(&self) -> SubjectClassifier {
        SubjectClassifier::new(Arc::clone(&self.catalog))
    }

    /// Open the flashcard store in the configured data directory
    pub fn service(&self) -> Result<FlashcardService> {
        let data_dir = self
            .config
            .resolve_data_dir()
            .context("Failed to get data directory")?;
        let storage = FlashcardStorage::new(data_dir.clone());
        storage
            .init()
            .with_context(|| format!("Failed to initialize storage at {}", data_dir.display()))?;

        let store: Arc<dyn FlashcardStore> = Arc::new(storage);
        Ok(FlashcardService::new(store, self.classifier()))
    }
}
