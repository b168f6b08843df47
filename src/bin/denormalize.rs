//! Occupation Skills Denormalizer CLI
//!
//! Adds sampled skill columns for the occupations referenced by an input
//! table. Flags override the `[denormalize]` section of the configuration.

use std::path::PathBuf;

use clap::Parser;
use esco_tabiya::denormalize::default_output_path;
use esco_tabiya::{denormalize_file, AllocationMode, Diagnostics, TabiyaConfig, Taxonomy};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(name = "denormalize-skills")]
#[command(about = "Add sampled ESCO skills to a table of occupation codes")]
struct Cli {
    /// Input CSV with ESCO_occ_1..N columns
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV (default: <input>.output.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skills per occupation
    #[arg(short, long)]
    max_skills: Option<usize>,

    /// Tabiya dataset folder with occupations, skills and their relations
    #[arg(short, long = "path-to-esco-files")]
    taxonomy: Option<PathBuf>,

    /// Only follow essential relations
    #[arg(long)]
    essential_skills_only: bool,

    /// Split skills between competences and knowledge by frequency
    #[arg(long)]
    proportional: bool,

    /// Add a JSON stats column per occupation
    #[arg(long)]
    stats_columns: bool,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Config file to load (optional)
    #[arg(short, long)]
    config: Option<String>,
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
    let d = &mut cfg.denormalize;
    if let Some(max_skills) = cli.max_skills {
        d.max_skills = max_skills;
    }
    if cli.taxonomy.is_some() {
        d.taxonomy_path = cli.taxonomy;
    }
    d.essential_only |= cli.essential_skills_only;
    d.proportional |= cli.proportional;
    d.stats_columns |= cli.stats_columns;
    cfg.validate()?;
    let _log_guard = esco_tabiya::logging::init(&cfg.logging.log_file)?;

    let taxonomy_path = cfg
        .denormalize
        .taxonomy_path
        .clone()
        .ok_or("no taxonomy folder: pass --path-to-esco-files or set denormalize.taxonomy_path")?;
    let options = cfg.denormalize.options();
    let output = cli.output.unwrap_or_else(|| default_output_path(&cli.input));

    println!("🎯 Occupation skills");
    println!("  Input: {:?}", cli.input);
    println!("  Taxonomy: {:?}", taxonomy_path);
    println!("  Skills per occupation: {}", options.max_skills);
    println!("  Essential only: {}", options.essential_only);
    println!(
        "  Mode: {}",
        match options.mode {
            AllocationMode::Unweighted => "unweighted",
            AllocationMode::Proportional => "proportional",
        }
    );
    println!();

    let taxonomy = Taxonomy::load(&taxonomy_path)?;
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut diagnostics = Diagnostics::new();

    let report = denormalize_file(
        &cli.input,
        &output,
        &taxonomy,
        &options,
        &mut diagnostics,
        &mut rng,
    )?;

    println!("📊 Summary:");
    println!("   Rows: {}", report.rows);
    println!("   Occupations found: {}", report.occupations_found);
    println!("   Unknown occupation codes: {}", report.occupations_missing);
    if options.mode == AllocationMode::Proportional {
        println!("   Allocations with stats: {}", report.stats.len());
    }
    if !diagnostics.is_empty() {
        println!("   Warnings: {} (see {:?})", diagnostics.warning_count(), cfg.logging.log_file);
    }
    println!();
    println!("✅ Written to {:?}", output);

    Ok(())
}
