use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use entity_name_validation::{
    load_names, AuthoritativeList, LevenshteinMatcher, NormalizationEngine, Resolution,
    RuleConfiguration,
};

#[derive(Parser)]
#[command(
    name = "entity-validate",
    version,
    about = "Normalize organization and government entity names"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,

    /// JSON configuration file (e.g. {"fuzzy_threshold": 90}).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Fuzzy-match threshold (0-100); overrides the configuration file.
    #[arg(long, global = true)]
    threshold: Option<i64>,

    /// Authoritative entity list (CSV) to match normalized names against.
    #[arg(long, value_name = "CSV", global = true)]
    reference: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Validate names given on the command line.
    Check {
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,
    },

    /// Validate every name in a CSV file and print a summary.
    Batch {
        #[arg(value_name = "CSV")]
        csv: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity.tracing_level_filter());

    let engine = build_engine(&cli)?;
    let reference = cli
        .reference
        .as_deref()
        .map(AuthoritativeList::from_csv)
        .transpose()?;

    match &cli.command {
        Command::Check { names } => run_check(&engine, reference.as_ref(), names, cli.json),
        Command::Batch { csv } => run_batch(&engine, reference.as_ref(), csv, cli.json),
    }
}

fn init_logging(level: LevelFilter) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_engine(cli: &Cli) -> Result<NormalizationEngine> {
    let mut config = match &cli.config {
        Some(path) => RuleConfiguration::from_file(path)?,
        None => RuleConfiguration::default(),
    };
    if let Some(threshold) = cli.threshold {
        config.set_fuzzy_threshold(threshold)?;
    }

    Ok(NormalizationEngine::with_config(config))
}

fn resolve_all(
    engine: &NormalizationEngine,
    reference: Option<&AuthoritativeList>,
    names: &[String],
) -> Vec<Resolution> {
    let empty = AuthoritativeList::default();
    let reference = reference.unwrap_or(&empty);
    names
        .iter()
        .map(|name| reference.resolve(engine, &LevenshteinMatcher, name))
        .collect()
}

fn run_check(
    engine: &NormalizationEngine,
    reference: Option<&AuthoritativeList>,
    names: &[String],
    json: bool,
) -> Result<()> {
    let resolutions = resolve_all(engine, reference, names);

    if json {
        println!("{}", serde_json::to_string_pretty(&resolutions)?);
        return Ok(());
    }

    for resolution in &resolutions {
        print_resolution(resolution, reference.is_some());
    }

    Ok(())
}

fn run_batch(
    engine: &NormalizationEngine,
    reference: Option<&AuthoritativeList>,
    csv_path: &Path,
    json: bool,
) -> Result<()> {
    let names = load_names(csv_path)?;
    let report = engine.validate_batch(&names);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if reference.is_some() {
        for resolution in &resolve_all(engine, reference, &names) {
            print_resolution(resolution, true);
        }
    } else {
        for entry in report.entries.iter().filter(|e| !e.is_unchanged()) {
            println!("{} → {}", entry.input, entry.result.normalized);
            for message in entry.result.messages() {
                println!("    • {}", message);
            }
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{}", report.summary.summary());
    for (message, count) in &report.summary.violation_counts {
        println!("  {:>5}  {}", count, message);
    }

    Ok(())
}

fn print_resolution(resolution: &Resolution, with_reference: bool) {
    let validation = &resolution.validation;
    if validation.is_clean() {
        println!("✓ {}", resolution.input);
    } else {
        println!("✗ {} → {}", resolution.input, validation.normalized);
        for message in validation.messages() {
            println!("    • {}", message);
        }
    }

    if with_reference {
        match &resolution.reference {
            Some(m) if m.exact => println!("    ↳ authoritative: {}", m.canonical_name),
            Some(m) => println!("    ↳ closest match: {} ({}%)", m.canonical_name, m.score),
            None => println!("    ↳ no authoritative match"),
        }
    }
}
