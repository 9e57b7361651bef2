//! `quillboard` -- command-line host for article draft sessions.
//!
//! Loads a draft from a JSON file and drives it through the same session the
//! editor UI uses, persisting to a directory of JSON files.
//!
//! # Environment variables
//!
//! | Variable            | Default                 | Description                           |
//! |---------------------|-------------------------|---------------------------------------|
//! | `AUTOSAVE_DELAY_MS` | `3000`                  | Debounce before an edit is auto-saved |
//! | `AUTOSAVE_ENABLED`  | `true`                  | `false` saves edits explicitly        |
//! | `RUST_LOG`          | `DEFAULT_LOG_FILTER`    | Tracing filter                        |

mod file_backend;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use quillboard_core::{Draft, DraftPatch, ValidationReport};
use quillboard_editor::{DraftSession, SaveOutcome, SavePhase, SessionConfig};
use quillboard_events::EventBus;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::file_backend::FileBackend;

/// Tracing filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "quillboard_cli=info,quillboard_editor=info,quillboard_events=info";

#[derive(Parser)]
#[command(name = "quillboard")]
#[command(version)]
#[command(about = "Validate, edit, and publish article drafts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "text", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a draft against the editorial rules; non-zero exit if not publishable
    Validate {
        /// Draft JSON file
        file: PathBuf,
    },

    /// Print word count, character count, and reading time
    Stats {
        /// Draft JSON file
        file: PathBuf,
    },

    /// Apply an edit and let the auto-save persist it
    Edit {
        /// Draft JSON file
        file: PathBuf,

        /// Directory the file backend writes to
        #[arg(long)]
        out: PathBuf,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// Replace the body with the contents of this file
        #[arg(long)]
        content_file: Option<PathBuf>,

        /// Add a tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Save (if needed) and publish a draft
    Publish {
        /// Draft JSON file
        file: PathBuf,

        /// Directory the file backend writes to
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Validate { file } => {
            let draft = load_draft(&file).await?;
            let report = ValidationReport::for_draft(&draft);
            print_report(&report, cli.format)?;
            Ok(if report.publishable {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Commands::Stats { file } => {
            let draft = load_draft(&file).await?;
            let stats = draft.analytics;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                OutputFormat::Text => {
                    println!("words:        {}", stats.word_count);
                    println!("characters:   {}", stats.character_count);
                    println!("reading time: {} min", stats.reading_time_minutes);
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Edit {
            file,
            out,
            title,
            content_file,
            tags,
        } => {
            let content = match content_file {
                Some(path) => Some(
                    tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("reading {}", path.display()))?,
                ),
                None => None,
            };
            let config = SessionConfig::from_env();
            let autosave_enabled = config.autosave_enabled;
            let session = open_session(&file, &out, config).await?;

            session.update(DraftPatch {
                title,
                content,
                ..Default::default()
            });
            for tag in &tags {
                session.add_tag(tag);
            }

            if autosave_enabled {
                let mut rx = session.subscribe();
                rx.wait_for(|s| matches!(s.phase, SavePhase::Idle | SavePhase::Error))
                    .await
                    .context("session dropped while waiting for auto-save")?;
            } else if let SaveOutcome::Failed(message) = session.save().await {
                tracing::warn!(error = %message, "Explicit save failed");
            }

            let state = session.save_state();
            session.close();
            print_json_or_text(&state, cli.format, || {
                format!(
                    "phase: {}\nunsaved changes: {}\nlast error: {}",
                    state.phase.as_str(),
                    state.has_unsaved_changes,
                    state.last_error.as_deref().unwrap_or("none")
                )
            })?;
            Ok(if state.last_error.is_some() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }

        Commands::Publish { file, out } => {
            let session = open_session(&file, &out, SessionConfig::from_env()).await?;
            let report = ValidationReport::for_draft(&session.draft());
            for warning in &report.warnings {
                tracing::warn!(field = %warning.field, "{}", warning.message);
            }

            let published = session.publish().await?;
            session.close();
            print_json_or_text(&published, cli.format, || {
                format!(
                    "published '{}' at {}",
                    published.effective_slug(),
                    published
                        .publishing
                        .publish_date
                        .map(|d| d.to_rfc3339())
                        .unwrap_or_default()
                )
            })?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn load_draft(path: &Path) -> anyhow::Result<Draft> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Draft::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

/// Build a session over a file backend, logging its events.
async fn open_session(
    file: &Path,
    out: &Path,
    config: SessionConfig,
) -> anyhow::Result<DraftSession> {
    let draft = load_draft(file).await?;
    let bus = Arc::new(EventBus::default());
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::info!(
                event_type = %event.event_type,
                article_id = %event.article_id,
                version = ?event.version,
                "Editor event"
            );
        }
    });

    Ok(DraftSession::with_event_bus(
        draft,
        Arc::new(FileBackend::new(out)),
        config,
        bus,
    ))
}

fn print_report(report: &ValidationReport, format: OutputFormat) -> anyhow::Result<()> {
    print_json_or_text(report, format, || {
        let mut lines = Vec::new();
        for issue in report.errors.iter().chain(report.warnings.iter()) {
            let level = if issue.is_error() { "error" } else { "warning" };
            lines.push(format!("{level}: {}: {}", issue.field, issue.message));
        }
        lines.push(if report.publishable {
            "publishable".to_string()
        } else {
            "not publishable".to_string()
        });
        lines.join("\n")
    })
}

fn print_json_or_text<T: serde::Serialize>(
    value: &T,
    format: OutputFormat,
    text: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => println!("{}", text()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quillboard_core::ArticleStatus;

    fn write_draft(dir: &Path, draft: &Draft) -> PathBuf {
        let path = dir.join("input.json");
        std::fs::write(&path, draft.to_json_pretty().expect("serializes")).expect("write draft");
        path
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("quillboard").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[tokio::test]
    async fn validate_exit_code_follows_publishability() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut ready = Draft::new("Hi");
        ready.content = "body".into();
        let path = write_draft(dir.path(), &ready);
        let path = path.to_str().expect("utf-8 path");

        let code = run(cli(&["validate", path])).await.expect("runs");
        assert_eq!(code, ExitCode::SUCCESS);

        let path = write_draft(dir.path(), &Draft::new("Hi"));
        let path = path.to_str().expect("utf-8 path");
        let code = run(cli(&["--format", "json", "validate", path]))
            .await
            .expect("runs");
        assert_eq!(code, ExitCode::FAILURE, "missing content is not publishable");
    }

    #[tokio::test]
    async fn publish_writes_published_file_and_succeeds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("out");
        let mut draft = Draft::new("Release Notes");
        draft.content = "Shipped.".into();
        let path = write_draft(dir.path(), &draft);

        let code = run(cli(&[
            "publish",
            path.to_str().expect("utf-8 path"),
            "--out",
            out.to_str().expect("utf-8 path"),
        ]))
        .await
        .expect("runs");

        assert_eq!(code, ExitCode::SUCCESS);
        let json = std::fs::read_to_string(out.join("release-notes.published.json"))
            .expect("published file");
        assert_eq!(
            Draft::from_json(&json).expect("parses").status(),
            ArticleStatus::Published
        );
    }

    #[tokio::test]
    async fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent.json");

        let err = run(cli(&["stats", missing.to_str().expect("utf-8 path")]))
            .await
            .expect_err("no such file");
        assert!(format!("{err:#}").contains("reading"));
    }
}
