use anyhow::Context;

use smart_flashcards_lib::config::AppConfig;
use smart_flashcards_lib::{logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load(None).context("Failed to load config")?;
    logging::init(&config.log_level, config.log_file.as_deref())
        .context("Failed to initialize logging")?;

    server::run(config).await
}
