//! Occupation → skills denormalization
//!
//! Enriches an input table whose rows reference up to N occupations by ESCO
//! code (`ESCO_occ_1`, `ESCO_occ_2`, ...) with sampled skill labels for each
//! occupation (`ESCO_occ_1_skill_1`, ...). The reference data is a Tabiya
//! dataset folder: `occupations.csv`, `skills.csv` and
//! `occupation_skill_relations.csv`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::allocation::{
    allocate, allocate_unweighted, Allocation, AllocationMode, AllocationStats, SkillCandidate,
    SkillCategory,
};
use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::error::{Result, TabiyaError};
use crate::schema::{OccupationRow, OccupationSkillRow, SkillRow};
use crate::table::{read_records, write_records, CsvRecord, Table};
use crate::transform::TabiyaTable;

/// `RELATIONTYPE` of the strongest occupation → skill relation
pub const ESSENTIAL: &str = "essential";

const SOURCE: &str = "Denormalize";

/// Tabiya reference data indexed for lookups by code and id
#[derive(Debug, Default)]
pub struct Taxonomy {
    occupations_by_code: HashMap<String, String>,
    skills: HashMap<String, SkillRow>,
    relations: HashMap<String, Vec<OccupationSkillRow>>,
}

impl Taxonomy {
    /// Load the three reference tables from a Tabiya dataset folder
    pub fn load(dir: &Path) -> Result<Self> {
        let occupations: Vec<OccupationRow> =
            read_records(&dir.join(TabiyaTable::Occupations.file_name()), None)?;
        let skills: Vec<SkillRow> = read_records(&dir.join(TabiyaTable::Skills.file_name()), None)?;
        let relations: Vec<OccupationSkillRow> =
            read_records(&dir.join(TabiyaTable::OccupationSkillRelations.file_name()), None)?;
        info!(
            occupations = occupations.len(),
            skills = skills.len(),
            relations = relations.len(),
            "taxonomy loaded"
        );
        Ok(Self::from_rows(occupations, skills, relations))
    }

    /// Build the indexes. The first occupation per code and the first skill
    /// per id win; relations keep their file order.
    pub fn from_rows(
        occupations: Vec<OccupationRow>,
        skills: Vec<SkillRow>,
        relations: Vec<OccupationSkillRow>,
    ) -> Self {
        let mut occupations_by_code = HashMap::with_capacity(occupations.len());
        for occupation in occupations {
            occupations_by_code.entry(occupation.code).or_insert(occupation.id);
        }

        let mut skills_by_id = HashMap::with_capacity(skills.len());
        for skill in skills {
            skills_by_id.entry(skill.id.clone()).or_insert(skill);
        }

        let mut by_occupation: HashMap<String, Vec<OccupationSkillRow>> = HashMap::new();
        for relation in relations {
            by_occupation
                .entry(relation.occupation_id.clone())
                .or_default()
                .push(relation);
        }

        Self {
            occupations_by_code,
            skills: skills_by_id,
            relations: by_occupation,
        }
    }

    pub fn occupation_id(&self, code: &str) -> Option<&str> {
        self.occupations_by_code.get(code).map(String::as_str)
    }

    pub fn skill(&self, id: &str) -> Option<&SkillRow> {
        self.skills.get(id)
    }

    /// Relations of an occupation, optionally only the essential ones
    pub fn relations_of<'a>(
        &'a self,
        occupation_id: &str,
        essential_only: bool,
    ) -> impl Iterator<Item = &'a OccupationSkillRow> + 'a {
        self.relations
            .get(occupation_id)
            .into_iter()
            .flatten()
            .filter(move |r| !essential_only || r.relation_type == ESSENTIAL)
    }
}

/// Knobs for one denormalization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenormalizeOptions {
    /// Skill slots per occupation
    pub max_skills: usize,
    /// Only follow `essential` relations
    pub essential_only: bool,
    pub mode: AllocationMode,
    /// Column prefix of the occupation code columns
    pub occupation_prefix: String,
    /// Number of occupation code columns per row
    pub occupation_slots: usize,
    /// Add a `<prefix><n>_stats` JSON column per occupation slot
    pub stats_columns: bool,
}

impl Default for DenormalizeOptions {
    fn default() -> Self {
        Self {
            max_skills: 5,
            essential_only: false,
            mode: AllocationMode::Unweighted,
            occupation_prefix: "ESCO_occ_".to_string(),
            occupation_slots: 3,
            stats_columns: false,
        }
    }
}

impl DenormalizeOptions {
    pub fn occupation_column(&self, slot: usize) -> String {
        format!("{}{}", self.occupation_prefix, slot)
    }

    pub fn skill_column(&self, slot: usize, skill: usize) -> String {
        format!("{}{}_skill_{}", self.occupation_prefix, slot, skill)
    }

    pub fn stats_column(&self, slot: usize) -> String {
        format!("{}{}_stats", self.occupation_prefix, slot)
    }
}

/// Pick skills for one occupation
pub fn allocate_for_occupation<R: Rng + ?Sized>(
    taxonomy: &Taxonomy,
    occupation_id: Option<&str>,
    options: &DenormalizeOptions,
    diagnostics: &mut Diagnostics,
    rng: &mut R,
) -> Allocation {
    let Some(occupation_id) = occupation_id else {
        return Allocation::empty(options.max_skills);
    };

    let mut skills = Vec::new();
    for relation in taxonomy.relations_of(occupation_id, options.essential_only) {
        match taxonomy.skill(&relation.skill_id) {
            Some(skill) => skills.push(skill),
            None => diagnostics.warn_row(
                SOURCE,
                DiagnosticCode::UnknownSkill,
                format!("Skill {} is not in skills.csv", relation.skill_id),
                relation,
            ),
        }
    }

    match options.mode {
        AllocationMode::Unweighted => {
            let candidates = skills
                .into_iter()
                .map(|s| SkillCandidate {
                    label: s.preferred_label.clone(),
                    category: SkillCategory::parse(&s.skill_type),
                })
                .collect();
            allocate_unweighted(candidates, options.max_skills, rng)
        }
        AllocationMode::Proportional => {
            let mut competence = Vec::new();
            let mut knowledge = Vec::new();
            for skill in skills {
                match SkillCategory::parse(&skill.skill_type) {
                    Some(SkillCategory::Competence) => {
                        competence.push(skill.preferred_label.clone())
                    }
                    Some(SkillCategory::Knowledge) => knowledge.push(skill.preferred_label.clone()),
                    None => diagnostics.warning(
                        SOURCE,
                        DiagnosticCode::UnknownSkillCategory,
                        format!("Unknown skill type '{}' for skill {}", skill.skill_type, skill.id),
                    ),
                }
            }
            allocate(competence, knowledge, options.max_skills, rng)
        }
    }
}

/// One line of the `.stats.csv` audit file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    /// 1-based data row of the input table
    #[serde(rename = "ROW")]
    pub row: usize,
    #[serde(rename = "OCCUPATION COLUMN")]
    pub occupation_column: String,
    #[serde(rename = "ESCO CODE")]
    pub code: String,
    #[serde(rename = "COMPETENCE COUNT")]
    pub competence_count: usize,
    #[serde(rename = "KNOWLEDGE COUNT")]
    pub knowledge_count: usize,
    #[serde(rename = "COMPETENCE %")]
    pub competence_proportion: f64,
    #[serde(rename = "KNOWLEDGE %")]
    pub knowledge_proportion: f64,
    #[serde(rename = "PICKED COMPETENCE")]
    pub picked_competence: usize,
    #[serde(rename = "PICKED KNOWLEDGE")]
    pub picked_knowledge: usize,
    #[serde(rename = "PICKED COMPETENCE %")]
    pub picked_competence_proportion: f64,
    #[serde(rename = "PICKED KNOWLEDGE %")]
    pub picked_knowledge_proportion: f64,
    #[serde(rename = "COMPETENCE ERROR %")]
    pub competence_error: f64,
    #[serde(rename = "KNOWLEDGE ERROR %")]
    pub knowledge_error: f64,
}

impl CsvRecord for StatsRecord {
    const COLUMNS: &'static [&'static str] = &[
        "ROW",
        "OCCUPATION COLUMN",
        "ESCO CODE",
        "COMPETENCE COUNT",
        "KNOWLEDGE COUNT",
        "COMPETENCE %",
        "KNOWLEDGE %",
        "PICKED COMPETENCE",
        "PICKED KNOWLEDGE",
        "PICKED COMPETENCE %",
        "PICKED KNOWLEDGE %",
        "COMPETENCE ERROR %",
        "KNOWLEDGE ERROR %",
    ];
}

impl StatsRecord {
    fn new(row: usize, occupation_column: String, code: String, stats: &AllocationStats) -> Self {
        Self {
            row,
            occupation_column,
            code,
            competence_count: stats.competence_count,
            knowledge_count: stats.knowledge_count,
            competence_proportion: stats.competence_proportion,
            knowledge_proportion: stats.knowledge_proportion,
            picked_competence: stats.picked_competence,
            picked_knowledge: stats.picked_knowledge,
            picked_competence_proportion: stats.picked_competence_proportion,
            picked_knowledge_proportion: stats.picked_knowledge_proportion,
            competence_error: stats.competence_error,
            knowledge_error: stats.knowledge_error,
        }
    }
}

/// Summary of a denormalization run
#[derive(Debug, Clone, Default)]
pub struct DenormalizeReport {
    pub rows: usize,
    /// Occupation references that resolved to a known code
    pub occupations_found: usize,
    /// Non-empty codes that are not in occupations.csv
    pub occupations_missing: usize,
    pub stats: Vec<StatsRecord>,
}

/// Add skill columns (and stats columns when enabled) to every row of `input`
pub fn denormalize<R: Rng + ?Sized>(
    input: &mut Table,
    taxonomy: &Taxonomy,
    options: &DenormalizeOptions,
    diagnostics: &mut Diagnostics,
    rng: &mut R,
) -> Result<DenormalizeReport> {
    if options.max_skills == 0 {
        return Err(TabiyaError::InvalidConfig("max_skills must be at least 1".to_string()));
    }

    struct SlotColumns {
        name: String,
        code: Option<usize>,
        skills: Vec<usize>,
        stats: Option<usize>,
    }

    let mut slots = Vec::with_capacity(options.occupation_slots);
    for n in 1..=options.occupation_slots {
        let name = options.occupation_column(n);
        let code = input.column_index(&name);
        let skills = (1..=options.max_skills)
            .map(|k| input.ensure_column(&options.skill_column(n, k)))
            .collect();
        let stats = options
            .stats_columns
            .then(|| input.ensure_column(&options.stats_column(n)));
        slots.push(SlotColumns { name, code, skills, stats });
    }

    let mut report = DenormalizeReport {
        rows: input.len(),
        ..Default::default()
    };

    for (i, row) in input.rows_mut().iter_mut().enumerate() {
        for slot in &slots {
            let code = slot.code.map(|idx| row[idx].clone()).unwrap_or_default();
            // an empty cell never names an occupation, even one with an empty CODE
            let occupation_id = (!code.is_empty())
                .then(|| taxonomy.occupation_id(&code))
                .flatten();
            match occupation_id {
                Some(_) => report.occupations_found += 1,
                None if !code.is_empty() => {
                    debug!(row = i + 1, code = %code, "occupation code not found");
                    report.occupations_missing += 1;
                }
                None => {}
            }

            let allocation =
                allocate_for_occupation(taxonomy, occupation_id, options, diagnostics, rng);
            for (&idx, label) in slot.skills.iter().zip(allocation.slots) {
                row[idx] = label;
            }

            if let Some(stats) = &allocation.stats {
                report
                    .stats
                    .push(StatsRecord::new(i + 1, slot.name.clone(), code.clone(), stats));
            }
            if let Some(idx) = slot.stats {
                row[idx] = match &allocation.stats {
                    Some(stats) => serde_json::to_string(stats)?,
                    None => String::new(),
                };
            }
        }
    }

    Ok(report)
}

/// `<dir>/<stem>.output.<ext>` next to the input file
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("input");
    let ext = input.extension().and_then(|s| s.to_str()).unwrap_or("csv");
    input.with_file_name(format!("{stem}.output.{ext}"))
}

/// `<dir>/<stem>.stats.csv` next to the output file
pub fn stats_path(output: &Path) -> PathBuf {
    let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    output.with_file_name(format!("{stem}.stats.csv"))
}

/// Read `input`, denormalize it, write `output`. Proportional runs also
/// write the stats file next to `output`.
pub fn denormalize_file<R: Rng + ?Sized>(
    input: &Path,
    output: &Path,
    taxonomy: &Taxonomy,
    options: &DenormalizeOptions,
    diagnostics: &mut Diagnostics,
    rng: &mut R,
) -> Result<DenormalizeReport> {
    let mut table = Table::read(input)?;
    let report = denormalize(&mut table, taxonomy, options, diagnostics, rng)?;
    table.write(output)?;
    info!(output = %output.display(), rows = report.rows, "denormalized table written");

    if options.mode == AllocationMode::Proportional {
        let path = stats_path(output);
        write_records(&path, &report.stats)?;
        info!(stats = %path.display(), records = report.stats.len(), "allocation stats written");
    }
    Ok(report)
}
