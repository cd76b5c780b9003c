mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "smart-flashcards-cli", about = "Smart flashcards command line", version)]
struct Cli {
    /// Config file (default: $FLASHCARDS_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API until Ctrl-C
    Serve {
        /// Listen address, overriding host and port from the config
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Add a flashcard; its subject is inferred from the text
    Add {
        #[arg(long)]
        student: String,
        #[arg(long)]
        question: String,
        #[arg(long)]
        answer: String,
    },

    /// Print a mixed-subject selection of a student's flashcards
    Mix {
        #[arg(long)]
        student: String,
        /// Number of cards (clamped to the configured maximum)
        #[arg(long)]
        limit: Option<String>,
        /// Seed the shuffle for a reproducible selection
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the subject inferred for some text
    Classify {
        /// Text to classify
        text: String,
    },

    /// List the subject catalog
    Subjects,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let app = app::App::new(cli.config.as_deref())?;

    let default_filter = match cli.command {
        Command::Serve { .. } => app.config.log_level.as_str(),
        _ => "warn",
    };
    smart_flashcards_lib::logging::init(default_filter, app.config.log_file.as_deref())?;

    match cli.command {
        Command::Serve { bind } => {
            commands::serve::run(app, bind)?;
        }
        Command::Add { student, question, answer } => {
            commands::add::run(&app, student, question, answer, &cli.format, use_color)?;
        }
        Command::Mix { student, limit, seed } => {
            commands::mix::run(&app, &student, limit.as_deref(), seed, &cli.format, use_color)?;
        }
        Command::Classify { text } => {
            commands::classify::run(&app, &text, &cli.format, use_color)?;
        }
        Command::Subjects => {
            commands::subjects::run(&app, &cli.format, use_color)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mix_with_global_flags() {
        let cli = Cli::try_parse_from([
            "smart-flashcards-cli",
            "mix",
            "--student",
            "stu001",
            "--limit",
            "3",
            "--seed",
            "7",
            "--format",
            "json",
        ])
        .unwrap();

        assert!(matches!(cli.format, OutputFormat::Json));
        match cli.command {
            Command::Mix { student, limit, seed } => {
                assert_eq!(student, "stu001");
                assert_eq!(limit.as_deref(), Some("3"));
                assert_eq!(seed, Some(7));
            }
            _ => panic!("expected mix"),
        }
    }

    #[test]
    fn test_add_requires_all_fields() {
        assert!(Cli::try_parse_from(["smart-flashcards-cli", "add", "--student", "stu001"]).is_err());
    }

    #[test]
    fn test_serve_bind_must_be_address() {
        assert!(Cli::try_parse_from(["smart-flashcards-cli", "serve", "--bind", "nope"]).is_err());
        let cli = Cli::try_parse_from(["smart-flashcards-cli", "serve", "--bind", "127.0.0.1:4000"]).unwrap();
        assert!(matches!(cli.command, Command::Serve { bind: Some(_) }));
    }
}
