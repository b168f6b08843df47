//! ESCO → Tabiya taxonomy tools
//!
//! Converts the ESCO classification CSV export into the Tabiya taxonomy
//! dataset format and provides the follow-up tooling around it.
//!
//! ## Features
//!
//! - **Export**: Eight ESCO files become eight Tabiya tables with locally
//!   scoped concept ids (`key_<n>`) and fresh lineage UUIDs
//! - **Lineage**: `UUIDHISTORY` values are inherited from a previous dataset
//!   version by natural key
//! - **Denormalization**: Input tables referencing occupations by ESCO code
//!   gain sampled skill columns, optionally split by skill category
//! - **Conflicts**: Occupations sharing alternative labels are reported
//!
//! ## Layout
//!
//! ```text
//! <esco>/classification/<lc>/csv/   ISCOGroups, skillGroups, skills, occupations
//! <esco>/relations/<lc>/csv/        broaderRelations*, occupationSkill*, skillSkill*
//!          │
//!          ▼  export_dataset
//! <tabiya>/isco_groups.csv, skill_groups.csv, skills.csv, occupations.csv,
//!          occupations_hierarchy.csv, skills_hierarchy.csv,
//!          occupation_skill_relations.csv, skill_skill_relations.csv
//! ```

pub mod allocation;
pub mod config;
pub mod conflicts;
pub mod denormalize;
pub mod diagnostics;
pub mod error;
pub mod identity;
pub mod lineage;
pub mod logging;
pub mod schema;
pub mod table;
pub mod transform;

pub use allocation::{
    allocate, allocate_unweighted, Allocation, AllocationMode, AllocationStats, SkillCategory,
};
pub use config::TabiyaConfig;
pub use conflicts::{find_conflicts, ConflictRow};
pub use denormalize::{
    denormalize, denormalize_file, DenormalizeOptions, DenormalizeReport, Taxonomy,
};
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use error::{Result, TabiyaError};
pub use identity::{ConceptId, ConceptRegistry};
pub use lineage::{match_and_append, reconcile_dataset, reconcile_file, LineageStats};
pub use table::Table;
pub use transform::{
    export_dataset, DatasetStats, EscoSourcePaths, ExportOptions, RecordTransformer, TabiyaTable,
};
