//! Tabiya Config CLI
//!
//! View and manage the configuration shared by the taxonomy tools.

use clap::{Parser, Subcommand};
use esco_tabiya::TabiyaConfig;

#[derive(Parser)]
#[command(name = "tabiya-config")]
#[command(about = "View and manage taxonomy tool configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration
    Show {
        /// Config file to load (optional)
        #[arg(short, long)]
        config: Option<String>,

        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path (default: tabiya.toml)
        #[arg(short, long, default_value = "tabiya.toml")]
        output: String,
    },

    /// Validate configuration
    Validate {
        /// Config file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Show { config, toml, json } => {
            let cfg = TabiyaConfig::load_from(config.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else if toml {
                println!("{}", ::toml::to_string_pretty(&cfg)?);
            } else {
                println!("📋 Taxonomy Tools Configuration\n");
                println!("Transform:");
                println!("  ESCO path: {:?}", cfg.transform.esco_path);
                println!("  Language: {}", cfg.transform.language);
                println!("  Output: {:?}", cfg.transform.output_dir);
                println!("  Samples: {:?}", cfg.transform.samples_dir);
                println!("  Sample skills: {}", cfg.transform.sample_skills_limit);
                println!("  Previous: {:?}", cfg.transform.previous_dir);
                println!("  Previous samples: {:?}", cfg.transform.previous_samples_dir);

                println!("\nDenormalize:");
                println!("  Taxonomy: {:?}", cfg.denormalize.taxonomy_path);
                println!("  Max skills: {}", cfg.denormalize.max_skills);
                println!("  Essential only: {}", cfg.denormalize.essential_only);
                println!("  Proportional: {}", cfg.denormalize.proportional);
                println!(
                    "  Occupation columns: {}1..{}",
                    cfg.denormalize.occupation_prefix, cfg.denormalize.occupation_slots
                );
                println!("  Stats columns: {}", cfg.denormalize.stats_columns);

                println!("\nLogging:");
                println!("  Log file: {:?}", cfg.logging.log_file);
            }
        }

        Commands::Init { output } => {
            let cfg = TabiyaConfig::default();
            cfg.save(&output)?;
            println!("✅ Created config file: {}", output);
        }

        Commands::Validate { config } => {
            let checked = TabiyaConfig::load_from(config.as_deref())
                .map_err(|e| e.to_string())
                .and_then(|cfg| cfg.validate().map(|_| cfg).map_err(|e| e.to_string()));
            match checked {
                Ok(cfg) => {
                    println!("✅ Configuration is valid");
                    println!("   ESCO path: {:?}", cfg.transform.esco_path);
                    if !cfg.transform.esco_path.exists() {
                        println!("   ⚠️  ESCO path does not exist yet");
                    }
                    println!("   Output: {:?}", cfg.transform.output_dir);
                    println!("   Max skills: {}", cfg.denormalize.max_skills);
                }
                Err(e) => {
                    eprintln!("❌ Configuration error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
