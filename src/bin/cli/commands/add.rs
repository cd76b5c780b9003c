use anyhow::{Context, Result};

use smart_flashcards_lib::flashcards::NewFlashcard;

use crate::app::App;
use crate::render::terminal::{paint, subject_tag, Color};
use crate::OutputFormat;

pub fn run(
    app: &App,
    student: String,
    question: String,
    answer: String,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let service = app.service()?;
    let record = service
        .add_flashcard(NewFlashcard {
            student_id: Some(student),
            question: Some(question),
            answer: Some(answer),
        })
        .context("Failed to add flashcard")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        OutputFormat::Plain => {
            println!(
                "{} {} {}",
                paint("Added", Color::GREEN, use_color),
                subject_tag(&record.subject, use_color),
                record.question
            );
            println!("  {}", paint(&record.id.to_string(), Color::DIM, use_color));
        }
    }

    Ok(())
}
