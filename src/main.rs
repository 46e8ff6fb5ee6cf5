use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gcg_score::assessment::{self, AssessmentDocument, AssessmentStatus};
use gcg_score::config::{self, Config, OutputFormat};
use gcg_score::scoring::AggregatedResult;
use gcg_score::{output, scoring, ScoreError};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DOCUMENT: i32 = 1;
const EXIT_INVALID_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 3;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score one or more assessment documents
    Score {
        /// Assessment files (.json, .yaml, .yml) or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write the overall scores back into each document
        #[arg(long)]
        save: bool,
    },
    /// Show the fulfillment level for a raw score
    Fuk {
        /// Raw average score, usually between 0 and 1
        #[arg(allow_hyphen_values = true)]
        score: String,
    },
    /// Show an assessment's workflow status, or move it to a new one
    Status {
        /// Assessment file
        file: PathBuf,

        /// Target status (draft, in_progress, submitted, verified, completed)
        new_status: Option<String>,
    },
    /// Record the response for one factor
    Respond {
        /// Assessment file
        file: PathBuf,

        /// Factor identifier
        factor_id: String,

        /// Raw response value between 0 and the factor's max_score
        #[arg(allow_hyphen_values = true)]
        score: String,
    },
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "gcg-score")]
#[command(about = "GCG maturity assessment scoring CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/gcg-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "gcg_score=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.map(PathBuf::from);

    let outcome = match cli.command {
        Commands::Init { force } => run_init(config_path, force),
        Commands::Score {
            inputs,
            format,
            save,
        } => {
            let config = load_checked_config(config_path);
            run_score(&config, &inputs, format, save)
        }
        Commands::Fuk { score } => {
            let config = load_checked_config(config_path);
            run_fuk(&config, &score)
        }
        Commands::Status { file, new_status } => run_status(&file, new_status.as_deref()),
        Commands::Respond {
            file,
            factor_id,
            score,
        } => run_respond(&file, &factor_id, &score),
    };

    if let Err(e) = outcome {
        print_error(&e);
        if e.downcast_ref::<ScoreError>().is_some() {
            std::process::exit(EXIT_INVALID_INPUT);
        }
        std::process::exit(EXIT_DOCUMENT);
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Load and validate the config, exiting with the config error code on failure
fn load_checked_config(path: Option<PathBuf>) -> Config {
    let config = match config::load_config(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    config
}

fn run_init(path: Option<PathBuf>, force: bool) -> Result<()> {
    match config::write_default_config(path, force) {
        Ok(path) => {
            println!("Wrote default config to {}", path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    }
}

fn print_error(e: &anyhow::Error) {
    if let Some(ScoreError::InvalidInput(errors)) = e.downcast_ref::<ScoreError>() {
        eprintln!("{}", e);
        eprintln!("Invalid input:");
        for error in errors {
            eprintln!("  - {}", error);
        }
    } else {
        eprintln!("Error: {:#}", e);
    }
}

/// Expand each input as a glob pattern. Inputs matching nothing are kept
/// as literal paths so the loader reports them as missing.
fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        let matches: Vec<PathBuf> = glob::glob(input)
            .with_context(|| format!("Invalid file pattern '{}'", input))?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Skipping unreadable path: {}", e);
                    None
                }
            })
            .collect();

        if matches.is_empty() {
            paths.push(PathBuf::from(input));
        } else {
            paths.extend(matches);
        }
    }
    Ok(paths)
}

struct ScoredDocument {
    path: PathBuf,
    document: AssessmentDocument,
    result: AggregatedResult,
}

/// Load and score every input. Fails on the first bad input, before any
/// file has been written.
fn score_documents(paths: &[PathBuf]) -> Result<Vec<ScoredDocument>> {
    paths
        .iter()
        .map(|path| -> Result<ScoredDocument> {
            let document = assessment::load_document(path)?;
            let result = document.score()?;
            debug!(
                id = %document.id,
                overall_score = result.overall_score,
                overall_fuk = result.overall_fuk,
                "Scored {}",
                path.display()
            );
            Ok(ScoredDocument {
                path: path.clone(),
                document,
                result,
            })
        })
        .collect()
}

/// Render all scored documents. Several JSON results form one array.
fn render_scored(scored: &[ScoredDocument], format: OutputFormat, precision: usize, use_colors: bool) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(scored
            .iter()
            .map(|s| {
                format!(
                    "{}\n\n{}",
                    output::format_summary(&s.document, &s.result, precision, use_colors),
                    output::format_result_tree(&s.result, precision, use_colors)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")),
        OutputFormat::Json => match scored {
            [single] => output::format_json(&single.result),
            _ => {
                let results: Vec<&AggregatedResult> = scored.iter().map(|s| &s.result).collect();
                output::format_json_list(&results)
            }
        },
    }
}

fn run_score(config: &Config, inputs: &[String], format: Option<OutputFormat>, save: bool) -> Result<()> {
    let paths = expand_inputs(inputs)?;
    let format = format.unwrap_or(config.output.format);
    let use_colors = output::should_use_colors(config.output.colors);

    info!("Scoring {} assessment file(s)", paths.len());

    let mut scored = score_documents(&paths)?;
    println!("{}", render_scored(&scored, format, config.output.precision, use_colors)?);

    if save {
        let now = Utc::now();
        for entry in &mut scored {
            entry.document.apply_result(&entry.result, now);
            assessment::save_document(&entry.path, &entry.document)?;
            info!("Saved overall score to {}", entry.path.display());
        }
    }
    Ok(())
}

fn parse_score(raw: &str) -> Result<f64> {
    let score: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ScoreError::invalid(format!("score: '{}' is not a number", raw)))?;
    scoring::try_score_to_fuk(score)?;
    Ok(score)
}

fn run_fuk(config: &Config, raw: &str) -> Result<()> {
    let score = parse_score(raw)?;
    let use_colors = output::should_use_colors(config.output.colors);
    println!(
        "{}",
        output::format_fuk_detail(score, config.output.precision, use_colors)
    );
    Ok(())
}

fn run_status(path: &Path, new_status: Option<&str>) -> Result<()> {
    let mut document = assessment::load_document(path)?;

    let Some(raw) = new_status else {
        println!("{}: {}", document.id, document.status);
        if let Some(next) = document.status.next() {
            println!("Next: {}", next);
        }
        return Ok(());
    };

    let target: AssessmentStatus = raw.parse()?;
    let previous = document.status;
    document.transition(target, Utc::now())?;
    assessment::save_document(path, &document)?;

    info!(id = %document.id, from = %previous, to = %target, "Status changed");
    println!("{}: {} -> {}", document.id, previous, target);
    Ok(())
}

fn run_respond(path: &Path, factor_id: &str, raw: &str) -> Result<()> {
    let score = parse_score(raw)?;
    let mut document = assessment::load_document(path)?;
    document.record_response(factor_id, score, Utc::now())?;
    assessment::save_document(path, &document)?;

    println!("{}: factor {} = {}", document.id, factor_id, score);
    Ok(())
}
