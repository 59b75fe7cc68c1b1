//! idetect CLI - Command-line interface
//!
//! Usage:
//!   idetect clean <path>
//!   idetect extract <bundle.json> [--publication-date YYYY-MM-DD] [--records]
//!   idetect dates <bundle.json> --publication-date YYYY-MM-DD
//!
//! Bundles are JSON files of pre-parsed articles with a lemma table, as
//! written by an external dependency parser.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use idetect_core::{AppConfig, LoggingConfig};
use idetect_extractor::record::reports_to_records;
use idetect_extractor::{cleanup, Interpreter, PreparsedAdapter};

#[derive(Parser)]
#[command(name = "idetect")]
#[command(about = "Displacement fact extraction over dependency parses")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the normalised text of a file
    Clean {
        /// Path to a plain text article
        path: PathBuf,
    },
    /// Extract displacement reports from every article of a bundle
    Extract {
        /// Pre-parsed bundle
        bundle: PathBuf,
        /// Publication date anchoring relative event dates
        #[arg(long)]
        publication_date: Option<NaiveDate>,
        /// Print fact records instead of reports
        #[arg(long)]
        records: bool,
        /// Analysis run the records belong to (random when omitted)
        #[arg(long)]
        analysis_id: Option<Uuid>,
    },
    /// Resolve the event dates of every article of a bundle
    Dates {
        /// Pre-parsed bundle
        bundle: PathBuf,
        #[arg(long)]
        publication_date: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Clean { path } => {
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            println!("{}", cleanup(&text));
        }
        Commands::Extract {
            bundle,
            publication_date,
            records,
            analysis_id,
        } => {
            let analysis_id = analysis_id.unwrap_or_else(Uuid::new_v4);
            extract(&config, &bundle, publication_date, records.then_some(analysis_id)).await?;
        }
        Commands::Dates {
            bundle,
            publication_date,
        } => {
            dates(&config, &bundle, publication_date).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json_format {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn load_bundle(path: &Path) -> anyhow::Result<PreparsedAdapter> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading bundle {}", path.display()))?;
    let adapter = PreparsedAdapter::from_json(&json)
        .with_context(|| format!("decoding bundle {}", path.display()))?;
    tracing::info!(
        bundle = %path.display(),
        documents = adapter.documents().len(),
        "Loaded bundle"
    );
    Ok(adapter)
}

/// Process every article on the blocking pool, printing results in bundle order
async fn extract(
    config: &AppConfig,
    bundle: &Path,
    publication: Option<NaiveDate>,
    analysis_id: Option<Uuid>,
) -> anyhow::Result<()> {
    let adapter = load_bundle(bundle).await?;
    let documents = adapter.documents().to_vec();
    let interpreter = Arc::new(Interpreter::from_config(Arc::new(adapter), config)?);

    let tasks: Vec<_> = documents
        .into_iter()
        .map(|doc| {
            let interpreter = Arc::clone(&interpreter);
            tokio::task::spawn_blocking(move || {
                (
                    interpreter.process_document(&doc),
                    interpreter.dates_in_document(&doc, publication),
                )
            })
        })
        .collect();

    let mut output = Vec::with_capacity(tasks.len());
    for (document, task) in tasks.into_iter().enumerate() {
        let (reports, dates) = task.await?;
        let entry = match analysis_id {
            Some(analysis_id) => {
                let records =
                    reports_to_records(&reports, analysis_id, &config.extraction.analyzer)?;
                json!({
                    "document": document,
                    "records": records,
                    "dates": dates,
                })
            }
            None => json!({
                "document": document,
                "reports": reports,
                "dates": dates,
            }),
        };
        output.push(entry);
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn dates(config: &AppConfig, bundle: &Path, publication: NaiveDate) -> anyhow::Result<()> {
    let adapter = load_bundle(bundle).await?;
    let interpreter = Interpreter::from_config(Arc::new(adapter.clone()), config)?;

    let output: Vec<_> = adapter
        .documents()
        .iter()
        .enumerate()
        .map(|(document, doc)| {
            json!({
                "document": document,
                "dates": interpreter.dates_in_document(doc, Some(publication)),
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_arguments() {
        let cli = Cli::try_parse_from([
            "idetect",
            "--config",
            "idetect.toml",
            "extract",
            "bundle.json",
            "--publication-date",
            "2017-06-15",
            "--records",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("idetect.toml")));
        match cli.command {
            Commands::Extract {
                bundle,
                publication_date,
                records,
                analysis_id,
            } => {
                assert_eq!(bundle, PathBuf::from("bundle.json"));
                assert_eq!(publication_date, NaiveDate::from_ymd_opt(2017, 6, 15));
                assert!(records);
                assert!(analysis_id.is_none());
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_dates_requires_publication_date() {
        assert!(Cli::try_parse_from(["idetect", "dates", "bundle.json"]).is_err());
        assert!(Cli::try_parse_from(["idetect", "clean", "a.txt", "--config", "c.toml"]).is_ok());
    }
}
