use anyhow::Result;

use crate::app::App;
use crate::render::terminal::subject_tag;
use crate::OutputFormat;

pub fn run(app: &App, text: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let subject = app.classifier().infer(text);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "text": text,
                "subject": subject,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", subject_tag(&subject, use_color));
        }
    }

    Ok(())
}
