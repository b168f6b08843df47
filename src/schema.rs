//! Record types
//!
//! ESCO source rows (camelCase headers) and Tabiya target rows (upper-case
//! headers). Missing columns deserialize to empty strings so a trimmed-down
//! export still loads.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::table::CsvRecord;

/// Default `OCCUPATIONTYPE` for ESCO occupations and relations that omit it
pub const DEFAULT_OCCUPATION_TYPE: &str = "escooccupation";

/// Kind of node a Tabiya hierarchy edge endpoint refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TabiyaObjectType {
    #[serde(rename = "ISCOGroup")]
    IscoGroup,
    #[serde(rename = "ESCOOccupation")]
    EscoOccupation,
    SkillGroup,
    Skill,
}

impl TabiyaObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IscoGroup => "ISCOGroup",
            Self::EscoOccupation => "ESCOOccupation",
            Self::SkillGroup => "SkillGroup",
            Self::Skill => "Skill",
        }
    }

    /// Map an ESCO occupation-pillar `conceptType`/`broaderType` tag
    pub fn from_occupation_pillar(tag: &str) -> Option<Self> {
        match tag {
            "ISCOGroup" => Some(Self::IscoGroup),
            "Occupation" => Some(Self::EscoOccupation),
            _ => None,
        }
    }

    /// Map an ESCO skill-pillar `conceptType`/`broaderType` tag
    pub fn from_skill_pillar(tag: &str) -> Option<Self> {
        match tag {
            "SkillGroup" => Some(Self::SkillGroup),
            "KnowledgeSkillCompetence" => Some(Self::Skill),
            _ => None,
        }
    }
}

impl fmt::Display for TabiyaObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// ESCO source records
// =============================================================================

/// Row of `ISCOGroups_<lc>.csv`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EscoIscoGroup {
    pub concept_uri: String,
    pub code: String,
    pub preferred_label: String,
    pub alt_labels: String,
    pub description: String,
}

/// Row of `skillGroups_<lc>.csv`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EscoSkillGroup {
    pub concept_uri: String,
    pub code: String,
    pub preferred_label: String,
    pub alt_labels: String,
    pub description: String,
    pub scope_note: String,
}

/// Row of `skills_<lc>.csv`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EscoSkill {
    pub concept_uri: String,
    pub skill_type: String,
    pub reuse_level: String,
    pub preferred_label: String,
    pub alt_labels: String,
    pub description: String,
    pub definition: String,
    pub scope_note: String,
}

/// Row of `occupations_<lc>.csv`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EscoOccupation {
    pub concept_uri: String,
    pub isco_group: String,
    pub code: String,
    pub preferred_label: String,
    pub alt_labels: String,
    pub description: String,
    pub definition: String,
    pub scope_note: String,
    pub regulated_profession_note: String,
}

/// Row of `broaderRelations{Occ,Skill}Pillar_<lc>.csv`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EscoBroaderRelation {
    pub concept_type: String,
    pub concept_uri: String,
    pub broader_type: String,
    pub broader_uri: String,
}

/// Row of `occupationSkillRelations_<lc>.csv`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EscoOccupationSkillRelation {
    pub occupation_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation_type: Option<String>,
    pub relation_type: String,
    pub skill_type: String,
    pub skill_uri: String,
}

/// Row of `skillSkillRelations_<lc>.csv`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EscoSkillSkillRelation {
    pub original_skill_uri: String,
    pub original_skill_type: String,
    pub relation_type: String,
    pub related_skill_type: String,
    pub related_skill_uri: String,
}

// =============================================================================
// Tabiya target records
// =============================================================================

/// Row of `isco_groups.csv`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IscoGroupRow {
    #[serde(rename = "ORIGINURI")]
    pub origin_uri: String,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "UUIDHISTORY")]
    pub uuid_history: String,
    #[serde(rename = "CODE")]
    pub code: String,
    #[serde(rename = "PREFERREDLABEL")]
    pub preferred_label: String,
    #[serde(rename = "ALTLABELS")]
    pub alt_labels: String,
    #[serde(rename = "DESCRIPTION")]
    pub description: String,
}

impl CsvRecord for IscoGroupRow {
    const COLUMNS: &'static [&'static str] = &[
        "ORIGINURI",
        "ID",
        "UUIDHISTORY",
        "CODE",
        "PREFERREDLABEL",
        "ALTLABELS",
        "DESCRIPTION",
    ];
}

/// Row of `skill_groups.csv`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillGroupRow {
    #[serde(rename = "ORIGINURI")]
    pub origin_uri: String,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "UUIDHISTORY")]
    pub uuid_history: String,
    #[serde(rename = "CODE")]
    pub code: String,
    #[serde(rename = "PREFERREDLABEL")]
    pub preferred_label: String,
    #[serde(rename = "ALTLABELS")]
    pub alt_labels: String,
    #[serde(rename = "DESCRIPTION")]
    pub description: String,
    #[serde(rename = "SCOPENOTE")]
    pub scope_note: String,
}

impl CsvRecord for SkillGroupRow {
    const COLUMNS: &'static [&'static str] = &[
        "ORIGINURI",
        "ID",
        "UUIDHISTORY",
        "CODE",
        "PREFERREDLABEL",
        "ALTLABELS",
        "DESCRIPTION",
        "SCOPENOTE",
    ];
}

/// Row of `skills.csv`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillRow {
    #[serde(rename = "ORIGINURI")]
    pub origin_uri: String,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "UUIDHISTORY")]
    pub uuid_history: String,
    #[serde(rename = "SKILLTYPE")]
    pub skill_type: String,
    #[serde(rename = "REUSELEVEL")]
    pub reuse_level: String,
    #[serde(rename = "PREFERREDLABEL")]
    pub preferred_label: String,
    #[serde(rename = "ALTLABELS")]
    pub alt_labels: String,
    #[serde(rename = "DESCRIPTION")]
    pub description: String,
    #[serde(rename = "DEFINITION")]
    pub definition: String,
    #[serde(rename = "SCOPENOTE")]
    pub scope_note: String,
}

impl CsvRecord for SkillRow {
    const COLUMNS: &'static [&'static str] = &[
        "ORIGINURI",
        "ID",
        "UUIDHISTORY",
        "SKILLTYPE",
        "REUSELEVEL",
        "PREFERREDLABEL",
        "ALTLABELS",
        "DESCRIPTION",
        "DEFINITION",
        "SCOPENOTE",
    ];
}

/// Row of `occupations.csv`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OccupationRow {
    #[serde(rename = "ORIGINURI")]
    pub origin_uri: String,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "UUIDHISTORY")]
    pub uuid_history: String,
    #[serde(rename = "ISCOGROUPCODE")]
    pub isco_group_code: String,
    #[serde(rename = "CODE")]
    pub code: String,
    #[serde(rename = "PREFERREDLABEL")]
    pub preferred_label: String,
    #[serde(rename = "ALTLABELS")]
    pub alt_labels: String,
    #[serde(rename = "DESCRIPTION")]
    pub description: String,
    #[serde(rename = "DEFINITION")]
    pub definition: String,
    #[serde(rename = "SCOPENOTE")]
    pub scope_note: String,
    #[serde(rename = "REGULATEDPROFESSIONNOTE")]
    pub regulated_profession_note: String,
    #[serde(rename = "OCCUPATIONTYPE")]
    pub occupation_type: String,
    #[serde(rename = "ISLOCALIZED")]
    pub is_localized: String,
}

impl CsvRecord for OccupationRow {
    const COLUMNS: &'static [&'static str] = &[
        "ORIGINURI",
        "ID",
        "UUIDHISTORY",
        "ISCOGROUPCODE",
        "CODE",
        "PREFERREDLABEL",
        "ALTLABELS",
        "DESCRIPTION",
        "DEFINITION",
        "SCOPENOTE",
        "REGULATEDPROFESSIONNOTE",
        "OCCUPATIONTYPE",
        "ISLOCALIZED",
    ];
}

/// Row of `occupations_hierarchy.csv` / `skills_hierarchy.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyRow {
    #[serde(rename = "PARENTOBJECTTYPE")]
    pub parent_object_type: TabiyaObjectType,
    #[serde(rename = "PARENTID")]
    pub parent_id: String,
    #[serde(rename = "CHILDID")]
    pub child_id: String,
    #[serde(rename = "CHILDOBJECTTYPE")]
    pub child_object_type: TabiyaObjectType,
}

impl CsvRecord for HierarchyRow {
    const COLUMNS: &'static [&'static str] = &[
        "PARENTOBJECTTYPE",
        "PARENTID",
        "CHILDID",
        "CHILDOBJECTTYPE",
    ];
}

/// Row of `occupation_skill_relations.csv`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OccupationSkillRow {
    #[serde(rename = "OCCUPATIONTYPE")]
    pub occupation_type: String,
    #[serde(rename = "OCCUPATIONID")]
    pub occupation_id: String,
    #[serde(rename = "RELATIONTYPE")]
    pub relation_type: String,
    #[serde(rename = "SKILLID")]
    pub skill_id: String,
}

impl CsvRecord for OccupationSkillRow {
    const COLUMNS: &'static [&'static str] = &[
        "OCCUPATIONTYPE",
        "OCCUPATIONID",
        "RELATIONTYPE",
        "SKILLID",
    ];
}

/// Row of `skill_skill_relations.csv`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillSkillRow {
    #[serde(rename = "REQUIRINGID")]
    pub requiring_id: String,
    #[serde(rename = "RELATIONTYPE")]
    pub relation_type: String,
    #[serde(rename = "REQUIREDID")]
    pub required_id: String,
}

impl CsvRecord for SkillSkillRow {
    const COLUMNS: &'static [&'static str] = &["REQUIRINGID", "RELATIONTYPE", "REQUIREDID"];
}
