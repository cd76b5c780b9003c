use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{paint, subject_tag, Color};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let catalog = &app.catalog;

    match format {
        OutputFormat::Json => {
            let subjects: Vec<serde_json::Value> = catalog
                .entries()
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "label": entry.label(),
                        "keywords": entry.keywords(),
                    })
                })
                .collect();
            let output = serde_json::json!({
                "fallback": catalog.fallback(),
                "subjects": subjects,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            for entry in catalog.entries() {
                let keywords = entry.keywords();
                println!(
                    "{} {}",
                    subject_tag(entry.label(), use_color),
                    paint(&format!("({} keywords)", keywords.len()), Color::DIM, use_color)
                );
                println!("    {}", keywords.join(", "));
            }
            println!(
                "\nFallback: {}",
                paint(catalog.fallback(), Color::BOLD, use_color)
            );
        }
    }

    Ok(())
}
