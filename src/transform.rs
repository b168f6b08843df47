//! ESCO → Tabiya record transformation
//!
//! Entity transformers register each concept URI with the
//! [`ConceptRegistry`] and attach a fresh lineage UUID. Relation transformers
//! resolve both endpoints; unknown or self-referencing rows are reported and
//! dropped, unknown hierarchy type tags abort the run.
//!
//! [`export_dataset`] runs the eight tables in dependency order: entities
//! first so that every relation endpoint is registered before it is resolved.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::error::{Result, TabiyaError};
use crate::identity::{ConceptId, ConceptRegistry};
use crate::schema::{
    EscoBroaderRelation, EscoIscoGroup, EscoOccupation, EscoOccupationSkillRelation, EscoSkill,
    EscoSkillGroup, EscoSkillSkillRelation, HierarchyRow, IscoGroupRow, OccupationRow,
    OccupationSkillRow, SkillGroupRow, SkillRow, SkillSkillRow, TabiyaObjectType,
    DEFAULT_OCCUPATION_TYPE,
};
use crate::table::{read_records, write_records, CsvRecord};

const OCCUPATIONS_HIERARCHY: &str = "Occupations Hierarchy";
const SKILLS_HIERARCHY: &str = "Skills Hierarchy";
const OCCUPATION_SKILL_RELATIONS: &str = "Occupation-To-Skill Relations";
const SKILL_SKILL_RELATIONS: &str = "Skill-To-Skill Relations";

/// Generate a v4 UUID from the injected random source
pub fn new_lineage_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid().to_string()
}

/// Row-level transformers sharing one registry, one diagnostics sink and one
/// random source for the duration of a run.
pub struct RecordTransformer<'a, R: Rng> {
    registry: &'a mut ConceptRegistry,
    diagnostics: &'a mut Diagnostics,
    rng: &'a mut R,
}

impl<'a, R: Rng> RecordTransformer<'a, R> {
    pub fn new(
        registry: &'a mut ConceptRegistry,
        diagnostics: &'a mut Diagnostics,
        rng: &'a mut R,
    ) -> Self {
        Self {
            registry,
            diagnostics,
            rng,
        }
    }

    fn register(&mut self, uri: &str) -> Result<(String, String)> {
        let id = self.registry.register(uri)?;
        Ok((id.into_string(), new_lineage_id(&mut *self.rng)))
    }

    pub fn isco_group(&mut self, record: &EscoIscoGroup) -> Result<IscoGroupRow> {
        let (id, uuid_history) = self.register(&record.concept_uri)?;
        Ok(IscoGroupRow {
            origin_uri: record.concept_uri.clone(),
            id,
            uuid_history,
            code: record.code.clone(),
            preferred_label: record.preferred_label.clone(),
            alt_labels: record.alt_labels.clone(),
            description: record.description.clone(),
        })
    }

    pub fn skill_group(&mut self, record: &EscoSkillGroup) -> Result<SkillGroupRow> {
        let (id, uuid_history) = self.register(&record.concept_uri)?;
        Ok(SkillGroupRow {
            origin_uri: record.concept_uri.clone(),
            id,
            uuid_history,
            code: record.code.clone(),
            preferred_label: record.preferred_label.clone(),
            alt_labels: record.alt_labels.clone(),
            description: record.description.clone(),
            scope_note: record.scope_note.clone(),
        })
    }

    pub fn skill(&mut self, record: &EscoSkill) -> Result<SkillRow> {
        let (id, uuid_history) = self.register(&record.concept_uri)?;
        Ok(SkillRow {
            origin_uri: record.concept_uri.clone(),
            id,
            uuid_history,
            skill_type: record.skill_type.clone(),
            reuse_level: record.reuse_level.clone(),
            preferred_label: record.preferred_label.clone(),
            alt_labels: record.alt_labels.clone(),
            description: record.description.clone(),
            definition: record.definition.clone(),
            scope_note: record.scope_note.clone(),
        })
    }

    pub fn occupation(&mut self, record: &EscoOccupation) -> Result<OccupationRow> {
        let (id, uuid_history) = self.register(&record.concept_uri)?;
        Ok(OccupationRow {
            origin_uri: record.concept_uri.clone(),
            id,
            uuid_history,
            isco_group_code: record.isco_group.clone(),
            code: record.code.clone(),
            preferred_label: record.preferred_label.clone(),
            alt_labels: record.alt_labels.clone(),
            description: record.description.clone(),
            definition: record.definition.clone(),
            scope_note: record.scope_note.clone(),
            regulated_profession_note: record.regulated_profession_note.clone(),
            occupation_type: DEFAULT_OCCUPATION_TYPE.to_string(),
            is_localized: "false".to_string(),
        })
    }

    /// Resolve both endpoints of a relation. Reports and returns `None` when
    /// either is unknown or both are the same concept.
    fn resolve_endpoints<T: Serialize>(
        &mut self,
        source: &str,
        from: (&str, &str),
        to: (&str, &str),
        row: &T,
    ) -> Option<(ConceptId, ConceptId)> {
        let (from_name, from_uri) = from;
        let (to_name, to_uri) = to;

        let Some(from_id) = self.registry.resolve(from_uri).cloned() else {
            self.diagnostics.warn_row(
                source,
                DiagnosticCode::UnknownUri,
                format!("{} is not known", from_name),
                row,
            );
            return None;
        };
        let Some(to_id) = self.registry.resolve(to_uri).cloned() else {
            self.diagnostics.warn_row(
                source,
                DiagnosticCode::UnknownUri,
                format!("{} is not known", to_name),
                row,
            );
            return None;
        };
        if from_id == to_id {
            self.diagnostics.warn_row(
                source,
                DiagnosticCode::SelfReference,
                format!("{} and {} are the same", from_name, to_name),
                row,
            );
            return None;
        }
        Some((from_id, to_id))
    }

    fn hierarchy(
        &mut self,
        source: &'static str,
        record: &EscoBroaderRelation,
        parse: fn(&str) -> Option<TabiyaObjectType>,
    ) -> Result<Option<HierarchyRow>> {
        let unknown = |role, value: &str| TabiyaError::UnknownConceptType {
            pillar: source,
            role,
            value: value.to_string(),
        };
        let parent_object_type =
            parse(&record.broader_type).ok_or_else(|| unknown("broader", &record.broader_type))?;
        let child_object_type =
            parse(&record.concept_type).ok_or_else(|| unknown("child", &record.concept_type))?;

        let Some((parent_id, child_id)) = self.resolve_endpoints(
            source,
            ("BroaderUri", record.broader_uri.as_str()),
            ("ConceptUri", record.concept_uri.as_str()),
            record,
        ) else {
            return Ok(None);
        };

        Ok(Some(HierarchyRow {
            parent_object_type,
            parent_id: parent_id.into_string(),
            child_id: child_id.into_string(),
            child_object_type,
        }))
    }

    pub fn occupation_hierarchy(
        &mut self,
        record: &EscoBroaderRelation,
    ) -> Result<Option<HierarchyRow>> {
        self.hierarchy(OCCUPATIONS_HIERARCHY, record, TabiyaObjectType::from_occupation_pillar)
    }

    pub fn skill_hierarchy(
        &mut self,
        record: &EscoBroaderRelation,
    ) -> Result<Option<HierarchyRow>> {
        self.hierarchy(SKILLS_HIERARCHY, record, TabiyaObjectType::from_skill_pillar)
    }

    pub fn occupation_skill(
        &mut self,
        record: &EscoOccupationSkillRelation,
    ) -> Option<OccupationSkillRow> {
        let (occupation_id, skill_id) = self.resolve_endpoints(
            OCCUPATION_SKILL_RELATIONS,
            ("OccupationUri", record.occupation_uri.as_str()),
            ("SkillUri", record.skill_uri.as_str()),
            record,
        )?;
        let occupation_type = record
            .occupation_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_OCCUPATION_TYPE)
            .to_string();

        Some(OccupationSkillRow {
            occupation_type,
            occupation_id: occupation_id.into_string(),
            relation_type: record.relation_type.clone(),
            skill_id: skill_id.into_string(),
        })
    }

    pub fn skill_skill(&mut self, record: &EscoSkillSkillRelation) -> Option<SkillSkillRow> {
        let (requiring_id, required_id) = self.resolve_endpoints(
            SKILL_SKILL_RELATIONS,
            ("OriginalSkillUri", record.original_skill_uri.as_str()),
            ("RelatedSkillUri", record.related_skill_uri.as_str()),
            record,
        )?;
        Some(SkillSkillRow {
            requiring_id: requiring_id.into_string(),
            relation_type: record.relation_type.clone(),
            required_id: required_id.into_string(),
        })
    }
}

// =============================================================================
// Dataset export
// =============================================================================

/// The eight Tabiya tables, in export order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabiyaTable {
    IscoGroups,
    SkillGroups,
    Skills,
    Occupations,
    OccupationsHierarchy,
    SkillsHierarchy,
    OccupationSkillRelations,
    SkillSkillRelations,
}

impl TabiyaTable {
    pub const ALL: [TabiyaTable; 8] = [
        Self::IscoGroups,
        Self::SkillGroups,
        Self::Skills,
        Self::Occupations,
        Self::OccupationsHierarchy,
        Self::SkillsHierarchy,
        Self::OccupationSkillRelations,
        Self::SkillSkillRelations,
    ];

    /// Output file name inside the Tabiya dataset folder
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::IscoGroups => "isco_groups.csv",
            Self::SkillGroups => "skill_groups.csv",
            Self::Skills => "skills.csv",
            Self::Occupations => "occupations.csv",
            Self::OccupationsHierarchy => "occupations_hierarchy.csv",
            Self::SkillsHierarchy => "skills_hierarchy.csv",
            Self::OccupationSkillRelations => "occupation_skill_relations.csv",
            Self::SkillSkillRelations => "skill_skill_relations.csv",
        }
    }
}

/// Locations of the ESCO CSV export for one language
#[derive(Debug, Clone)]
pub struct EscoSourcePaths {
    pub classification_dir: PathBuf,
    pub relations_dir: PathBuf,
    pub language: String,
}

impl EscoSourcePaths {
    /// Standard ESCO download layout:
    /// `<base>/classification/<lc>/csv/` and `<base>/relations/<lc>/csv/`
    pub fn new(base: &Path, language: &str) -> Self {
        Self {
            classification_dir: base.join("classification").join(language).join("csv"),
            relations_dir: base.join("relations").join(language).join("csv"),
            language: language.to_string(),
        }
    }

    /// Source file feeding the given Tabiya table
    pub fn source_for(&self, table: TabiyaTable) -> PathBuf {
        let lc = &self.language;
        let classification = &self.classification_dir;
        let relations = &self.relations_dir;
        match table {
            TabiyaTable::IscoGroups => classification.join(format!("ISCOGroups_{lc}.csv")),
            TabiyaTable::SkillGroups => classification.join(format!("skillGroups_{lc}.csv")),
            TabiyaTable::Skills => classification.join(format!("skills_{lc}.csv")),
            TabiyaTable::Occupations => classification.join(format!("occupations_{lc}.csv")),
            TabiyaTable::OccupationsHierarchy => {
                relations.join(format!("broaderRelationsOccPillar_{lc}.csv"))
            }
            TabiyaTable::SkillsHierarchy => {
                relations.join(format!("broaderRelationsSkillPillar_{lc}.csv"))
            }
            TabiyaTable::OccupationSkillRelations => {
                relations.join(format!("occupationSkillRelations_{lc}.csv"))
            }
            TabiyaTable::SkillSkillRelations => {
                relations.join(format!("skillSkillRelations_{lc}.csv"))
            }
        }
    }
}

/// Per-table row limits for an export
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    limits: HashMap<TabiyaTable, usize>,
}

impl ExportOptions {
    /// Export every row of every table
    pub fn complete() -> Self {
        Self::default()
    }

    /// Sample export: all tables complete except skills, cut to `skills_limit`
    pub fn sample(skills_limit: usize) -> Self {
        Self::default().with_limit(TabiyaTable::Skills, skills_limit)
    }

    pub fn with_limit(mut self, table: TabiyaTable, limit: usize) -> Self {
        self.limits.insert(table, limit);
        self
    }

    pub fn limit(&self, table: TabiyaTable) -> Option<usize> {
        self.limits.get(&table).copied()
    }
}

/// Rows written per table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStats {
    #[serde(rename = "ISCOGroups")]
    pub isco_groups: usize,
    #[serde(rename = "SkillGroups")]
    pub skill_groups: usize,
    #[serde(rename = "Skills")]
    pub skills: usize,
    #[serde(rename = "Occupations")]
    pub occupations: usize,
    #[serde(rename = "OccupationsHierarchy")]
    pub occupations_hierarchy: usize,
    #[serde(rename = "SkillsHierarchy")]
    pub skills_hierarchy: usize,
    #[serde(rename = "OccupationSkillRelations")]
    pub occupation_skill_relations: usize,
    #[serde(rename = "SkillSkillRelations")]
    pub skill_skill_relations: usize,
}

impl DatasetStats {
    fn set(&mut self, table: TabiyaTable, count: usize) {
        let slot = match table {
            TabiyaTable::IscoGroups => &mut self.isco_groups,
            TabiyaTable::SkillGroups => &mut self.skill_groups,
            TabiyaTable::Skills => &mut self.skills,
            TabiyaTable::Occupations => &mut self.occupations,
            TabiyaTable::OccupationsHierarchy => &mut self.occupations_hierarchy,
            TabiyaTable::SkillsHierarchy => &mut self.skills_hierarchy,
            TabiyaTable::OccupationSkillRelations => &mut self.occupation_skill_relations,
            TabiyaTable::SkillSkillRelations => &mut self.skill_skill_relations,
        };
        *slot = count;
    }
}

/// Read `source`, map every record, write the kept rows to `target`.
/// Returns the number of rows written.
fn process_table<S, T, F>(
    source: &Path,
    target: &Path,
    limit: Option<usize>,
    mut transform: F,
) -> Result<usize>
where
    S: DeserializeOwned,
    T: CsvRecord,
    F: FnMut(&S) -> Result<Option<T>>,
{
    let records: Vec<S> = read_records(source, limit)?;
    let mut rows = Vec::with_capacity(records.len());
    for record in &records {
        if let Some(row) = transform(record)? {
            rows.push(row);
        }
    }
    write_records(target, &rows)?;
    debug!(
        source = %source.display(),
        read = records.len(),
        written = rows.len(),
        "table processed"
    );
    Ok(rows.len())
}

/// Transform one ESCO export into a Tabiya dataset folder.
///
/// The registry must be empty (or freshly reset) for an independent dataset.
/// A fatal error is recorded in `diagnostics` and returned; tables written
/// before it stay on disk.
pub fn export_dataset<R: Rng>(
    source: &EscoSourcePaths,
    target_dir: &Path,
    options: &ExportOptions,
    registry: &mut ConceptRegistry,
    diagnostics: &mut Diagnostics,
    rng: &mut R,
) -> Result<DatasetStats> {
    fs::create_dir_all(target_dir)?;

    let mut stats = DatasetStats::default();
    for table in TabiyaTable::ALL {
        let src = source.source_for(table);
        let dst = target_dir.join(table.file_name());
        info!(table = table.file_name(), source = %src.display(), "transforming");

        let count = {
            let mut t = RecordTransformer::new(registry, diagnostics, rng);
            export_table(&mut t, table, &src, &dst, options.limit(table))
        };
        match count {
            Ok(count) => stats.set(table, count),
            Err(e) => {
                diagnostics.error(table.file_name(), e.to_string());
                return Err(e);
            }
        }
    }
    Ok(stats)
}

fn export_table<R: Rng>(
    t: &mut RecordTransformer<'_, R>,
    table: TabiyaTable,
    src: &Path,
    dst: &Path,
    limit: Option<usize>,
) -> Result<usize> {
    match table {
        TabiyaTable::IscoGroups => {
            process_table(src, dst, limit, |r: &EscoIscoGroup| t.isco_group(r).map(Some))
        }
        TabiyaTable::SkillGroups => {
            process_table(src, dst, limit, |r: &EscoSkillGroup| t.skill_group(r).map(Some))
        }
        TabiyaTable::Skills => process_table(src, dst, limit, |r: &EscoSkill| t.skill(r).map(Some)),
        TabiyaTable::Occupations => {
            process_table(src, dst, limit, |r: &EscoOccupation| t.occupation(r).map(Some))
        }
        TabiyaTable::OccupationsHierarchy => {
            process_table(src, dst, limit, |r: &EscoBroaderRelation| t.occupation_hierarchy(r))
        }
        TabiyaTable::SkillsHierarchy => {
            process_table(src, dst, limit, |r: &EscoBroaderRelation| t.skill_hierarchy(r))
        }
        TabiyaTable::OccupationSkillRelations => {
            process_table(src, dst, limit, |r: &EscoOccupationSkillRelation| {
                Ok(t.occupation_skill(r))
            })
        }
        TabiyaTable::SkillSkillRelations => {
            process_table(src, dst, limit, |r: &EscoSkillSkillRelation| Ok(t.skill_skill(r)))
        }
    }
}
