use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::app::App;
use crate::render::terminal::{paint, subject_tag, Color};
use crate::OutputFormat;

pub fn run(
    app: &App,
    student: &str,
    limit: Option<&str>,
    seed: Option<u64>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let limit = app
        .config
        .limit_policy()
        .resolve(limit)
        .context("Invalid --limit")?;
    let service = app.service()?;

    let mut rng: Box<dyn RngCore> = match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    };
    let cards = service
        .mixed_flashcards(Some(student), limit, &mut *rng)
        .context("Failed to load flashcards")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&cards)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No flashcards for '{}'.", student);
                return Ok(());
            }

            for (i, card) in cards.iter().enumerate() {
                println!(
                    "{:>2}. {} {}",
                    i + 1,
                    subject_tag(&card.subject, use_color),
                    paint(&card.question, Color::BOLD, use_color)
                );
                println!("    {}", paint(&card.answer, Color::DIM, use_color));
            }
        }
    }

    Ok(())
}
