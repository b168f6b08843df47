//! ESCO → Tabiya Export CLI
//!
//! Transforms an ESCO CSV download into a complete Tabiya dataset and,
//! optionally, a sample dataset with a reduced skills table. Each dataset can
//! inherit UUIDs from its previous version.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::Parser;
use esco_tabiya::lineage::reconcile_dataset;
use esco_tabiya::{
    export_dataset, ConceptRegistry, DatasetStats, Diagnostics, EscoSourcePaths, ExportOptions,
    LineageStats, TabiyaConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "esco-transform")]
#[command(about = "Transform an ESCO CSV export into Tabiya datasets")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long)]
    config: Option<String>,

    /// Root of the ESCO download (contains classification/ and relations/)
    #[arg(short, long)]
    esco_path: Option<PathBuf>,

    /// ESCO language code
    #[arg(short, long)]
    language: Option<String>,

    /// Output folder of the complete dataset
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output folder of the sample dataset
    #[arg(short, long)]
    samples: Option<PathBuf>,

    /// Previous complete dataset to inherit UUIDs from
    #[arg(long)]
    previous: Option<PathBuf>,

    /// Previous sample dataset to inherit UUIDs from
    #[arg(long)]
    previous_samples: Option<PathBuf>,

    /// Skills kept in the sample dataset
    #[arg(long)]
    sample_skills: Option<usize>,

    /// Diagnostics log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Seed for the lineage UUIDs (reproducible output)
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the sample dataset
    #[arg(long)]
    skip_samples: bool,
}

#[derive(Serialize)]
struct TableLineage {
    table: &'static str,
    #[serde(flatten)]
    stats: LineageStats,
}

#[derive(Serialize)]
struct RunSummary {
    dataset: String,
    output: PathBuf,
    stats: DatasetStats,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    lineage: Vec<TableLineage>,
    warnings: usize,
    errors: usize,
    finished_at: DateTime<Utc>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = TabiyaConfig::load_from(cli.config.as_deref())?;
    let t = &mut cfg.transform;
    if let Some(path) = cli.esco_path {
        t.esco_path = path;
    }
    if let Some(language) = cli.language {
        t.language = language;
    }
    if let Some(output) = cli.output {
        t.output_dir = output;
    }
    if cli.samples.is_some() {
        t.samples_dir = cli.samples;
    }
    if cli.previous.is_some() {
        t.previous_dir = cli.previous;
    }
    if cli.previous_samples.is_some() {
        t.previous_samples_dir = cli.previous_samples;
    }
    if let Some(limit) = cli.sample_skills {
        t.sample_skills_limit = limit;
    }
    if let Some(log_file) = cli.log_file {
        cfg.logging.log_file = log_file;
    }
    cfg.validate()?;
    let _log_guard = esco_tabiya::logging::init(&cfg.logging.log_file)?;

    let transform = &cfg.transform;
    let source = EscoSourcePaths::new(&transform.esco_path, &transform.language);

    println!("🔄 ESCO → Tabiya");
    println!("  Source: {:?}", transform.esco_path);
    println!("  Language: {}", transform.language);
    println!();

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut registry = ConceptRegistry::new();
    let mut diagnostics = Diagnostics::new();

    let complete = export(
        "complete",
        &source,
        &transform.output_dir,
        &ExportOptions::complete(),
        transform.previous_dir.as_deref(),
        &mut registry,
        &mut diagnostics,
        &mut rng,
        &cfg.logging.log_file,
    )?;
    println!("{}", serde_json::to_string_pretty(&complete)?);

    let samples_dir = match (&transform.samples_dir, cli.skip_samples) {
        (Some(dir), false) => dir,
        _ => {
            println!("\n✅ Done");
            return Ok(());
        }
    };

    // The sample dataset is independent: ids restart at key_1.
    registry.reset();
    diagnostics.clear();

    println!();
    let sample = export(
        "sample",
        &source,
        samples_dir,
        &ExportOptions::sample(transform.sample_skills_limit),
        transform.previous_samples_dir.as_deref(),
        &mut registry,
        &mut diagnostics,
        &mut rng,
        &cfg.logging.log_file,
    )?;
    println!("{}", serde_json::to_string_pretty(&sample)?);

    println!("\n✅ Done");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn export(
    dataset: &str,
    source: &EscoSourcePaths,
    output: &Path,
    options: &ExportOptions,
    previous: Option<&Path>,
    registry: &mut ConceptRegistry,
    diagnostics: &mut Diagnostics,
    rng: &mut StdRng,
    log_file: &Path,
) -> Result<RunSummary, Box<dyn std::error::Error>> {
    println!("📦 Exporting {} dataset to {:?}", dataset, output);

    let stats = export_dataset(source, output, options, registry, diagnostics, rng)?;
    println!("   Concepts registered: {}", registry.len());

    let mut lineage = Vec::new();
    if let Some(previous) = previous {
        println!("🔗 Inheriting UUIDs from {:?}", previous);
        match reconcile_dataset(previous, output, diagnostics) {
            Ok(results) => {
                for (table, stats) in results {
                    println!(
                        "   {}: {} matched, {} without UUID",
                        table.file_name(),
                        stats.matched,
                        stats.unmatched
                    );
                    lineage.push(TableLineage {
                        table: table.file_name(),
                        stats,
                    });
                }
            }
            Err(e) => {
                diagnostics.error("UUID Lineage", e.to_string());
                return Err(e.into());
            }
        }
    }

    if !diagnostics.is_empty() {
        println!("⚠️  {} warning(s) written to {:?}", diagnostics.warning_count(), log_file);
    }

    let counts = diagnostics.counts();
    Ok(RunSummary {
        dataset: dataset.to_string(),
        output: output.to_path_buf(),
        stats,
        lineage,
        warnings: counts.warnings,
        errors: counts.errors,
        finished_at: Utc::now(),
    })
}
