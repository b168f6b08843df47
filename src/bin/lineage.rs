//! UUID Lineage CLI
//!
//! Appends the UUIDHISTORY of a previous dataset version to a newly
//! transformed table, matching rows on a key column.

use std::path::PathBuf;

use clap::Parser;
use esco_tabiya::lineage::reconcile_file;
use esco_tabiya::Diagnostics;

#[derive(Parser)]
#[command(name = "uuid-lineage")]
#[command(about = "Inherit UUIDs from a previous version of a Tabiya table")]
struct Cli {
    /// Table of the previous version (source of the UUIDs)
    #[arg(short, long)]
    previous: PathBuf,

    /// Newly transformed table
    #[arg(short, long)]
    target: PathBuf,

    /// Column matching rows of both tables (CODE or ORIGINURI)
    #[arg(short, long, default_value = "CODE")]
    join_column: String,

    /// Output file (defaults to rewriting the target in place)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Diagnostics log file
    #[arg(long, default_value = "debug.log")]
    log_file: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = esco_tabiya::logging::init(&cli.log_file)?;
    let output = cli.output.unwrap_or_else(|| cli.target.clone());

    println!("🔗 UUID Lineage");
    println!("  Previous: {:?}", cli.previous);
    println!("  Target: {:?}", cli.target);
    println!("  Join column: {}", cli.join_column);
    println!();

    let mut diagnostics = Diagnostics::new();
    let stats = reconcile_file(
        &cli.previous,
        &cli.target,
        &cli.join_column,
        &output,
        &mut diagnostics,
    )?;

    println!("📊 Summary:");
    println!("   Keys in previous version: {}", stats.prior_keys);
    println!("   Matched: {}", stats.matched);
    println!("   Without UUID: {}", stats.unmatched);
    println!();
    println!("✅ Written to {:?}", output);

    Ok(())
}
