//! Configuration management for the taxonomy tools
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (tabiya.toml)
//! - Environment variables (TABIYA__*)
//!
//! Command-line flags of the binaries override whatever is loaded here.
//!
//! ## Example config file (tabiya.toml):
//! ```toml
//! [transform]
//! esco_path = "../../datasets/esco/v1.1.2"
//! language = "fr"
//! output_dir = "../../datasets/tabiya/esco-v1.1.2(fr)/csv"
//! samples_dir = "../../datasets/tabiya/samples/esco-v1.1.2(fr)"
//! sample_skills_limit = 1000
//! previous_dir = "../../datasets/tabiya/esco-v1.1.2/csv"
//!
//! [denormalize]
//! taxonomy_path = "../../datasets/tabiya/esco-v1.1.1/csv"
//! max_skills = 5
//! essential_only = true
//! proportional = true
//!
//! [logging]
//! log_file = "debug.log"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::allocation::AllocationMode;
use crate::denormalize::DenormalizeOptions;
use crate::error::TabiyaError;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabiyaConfig {
    /// ESCO → Tabiya export settings
    #[serde(default)]
    pub transform: TransformConfig,

    /// Occupation → skills sampling settings
    #[serde(default)]
    pub denormalize: DenormalizeConfig,

    /// Diagnostics log settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Root of the ESCO CSV download (contains classification/ and relations/)
    #[serde(default = "default_esco_path")]
    pub esco_path: PathBuf,

    /// ESCO language code of the source files
    #[serde(default = "default_language")]
    pub language: String,

    /// Folder receiving the complete Tabiya dataset
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Folder receiving the sample dataset (skipped when unset)
    #[serde(default)]
    pub samples_dir: Option<PathBuf>,

    /// Skills kept in the sample dataset
    #[serde(default = "default_sample_skills_limit")]
    pub sample_skills_limit: usize,

    /// Previous complete dataset to inherit UUIDs from
    #[serde(default)]
    pub previous_dir: Option<PathBuf>,

    /// Previous sample dataset to inherit UUIDs from
    #[serde(default)]
    pub previous_samples_dir: Option<PathBuf>,
}

/// Denormalization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenormalizeConfig {
    /// Tabiya dataset folder with occupations.csv, skills.csv and
    /// occupation_skill_relations.csv
    #[serde(default)]
    pub taxonomy_path: Option<PathBuf>,

    /// Skill slots per occupation
    #[serde(default = "default_max_skills")]
    pub max_skills: usize,

    /// Only follow essential relations
    #[serde(default)]
    pub essential_only: bool,

    /// Split skills by competence/knowledge frequency
    #[serde(default)]
    pub proportional: bool,

    /// Column prefix of the occupation code columns
    #[serde(default = "default_occupation_prefix")]
    pub occupation_prefix: String,

    /// Occupation code columns per input row
    #[serde(default = "default_occupation_slots")]
    pub occupation_slots: usize,

    /// Write a JSON stats column per occupation slot
    #[serde(default)]
    pub stats_columns: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// File receiving one line per warning/error
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

// Default value functions
fn default_esco_path() -> PathBuf {
    PathBuf::from("datasets/esco/v1.1.2")
}

fn default_language() -> String {
    "fr".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("datasets/tabiya/csv")
}

fn default_sample_skills_limit() -> usize {
    1000
}

fn default_max_skills() -> usize {
    5
}

fn default_occupation_prefix() -> String {
    "ESCO_occ_".to_string()
}

fn default_occupation_slots() -> usize {
    3
}

fn default_log_file() -> PathBuf {
    PathBuf::from("debug.log")
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            esco_path: default_esco_path(),
            language: default_language(),
            output_dir: default_output_dir(),
            samples_dir: None,
            sample_skills_limit: default_sample_skills_limit(),
            previous_dir: None,
            previous_samples_dir: None,
        }
    }
}

impl Default for DenormalizeConfig {
    fn default() -> Self {
        Self {
            taxonomy_path: None,
            max_skills: default_max_skills(),
            essential_only: false,
            proportional: false,
            occupation_prefix: default_occupation_prefix(),
            occupation_slots: default_occupation_slots(),
            stats_columns: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
        }
    }
}

impl DenormalizeConfig {
    pub fn options(&self) -> DenormalizeOptions {
        DenormalizeOptions {
            max_skills: self.max_skills,
            essential_only: self.essential_only,
            mode: if self.proportional {
                AllocationMode::Proportional
            } else {
                AllocationMode::Unweighted
            },
            occupation_prefix: self.occupation_prefix.clone(),
            occupation_slots: self.occupation_slots,
            stats_columns: self.stats_columns,
        }
    }
}

impl TabiyaConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["tabiya.toml", ".tabiya.toml", "config/tabiya.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("org", "tabiya", "esco-tabiya") {
            let xdg_config = config_dir.config_dir().join("tabiya.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // TABIYA__DENORMALIZE__MAX_SKILLS=10
        builder = builder.add_source(
            Environment::with_prefix("TABIYA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Check values that deserialize fine but cannot drive a run
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.transform.language.trim().is_empty() {
            return Err(TabiyaError::InvalidConfig("transform.language is empty".to_string()));
        }
        if self.denormalize.max_skills == 0 {
            return Err(TabiyaError::InvalidConfig(
                "denormalize.max_skills must be at least 1".to_string(),
            ));
        }
        if self.denormalize.occupation_slots == 0 {
            return Err(TabiyaError::InvalidConfig(
                "denormalize.occupation_slots must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
