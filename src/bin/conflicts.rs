//! Occupation Label Conflicts CLI
//!
//! Lists pairs of occupations that share an alternative label.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use esco_tabiya::schema::OccupationRow;
use esco_tabiya::table::{read_records, write_records};
use esco_tabiya::find_conflicts;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "occupation-conflicts")]
#[command(about = "Report occupations sharing alternative labels")]
struct Cli {
    /// Tabiya occupations table
    #[arg(short, long, default_value = "occupations.csv")]
    input: PathBuf,

    /// Conflicts report
    #[arg(short, long, default_value = "occupations_conflicts.csv")]
    output: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    println!("🔍 Occupation label conflicts");
    println!("  Input: {:?}", cli.input);
    println!();

    let occupations: Vec<OccupationRow> = read_records(&cli.input, None)
        .with_context(|| format!("Failed to read occupations from {}", cli.input.display()))?;
    let conflicts = find_conflicts(&occupations);
    write_records(&cli.output, &conflicts)
        .with_context(|| format!("Failed to write conflicts to {}", cli.output.display()))?;

    println!("📊 Summary:");
    println!("   Occupations: {}", occupations.len());
    println!("   Conflicting pairs: {}", conflicts.len());
    println!();
    println!("✅ Written to {:?}", cli.output);

    Ok(())
}
