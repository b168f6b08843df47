//! End-to-end tests over a small ESCO export
//!
//! Builds an ESCO download layout in a temporary folder, exports it and runs
//! the follow-up tools on the result.

use std::fs;
use std::path::Path;

use esco_tabiya::denormalize::stats_path;
use esco_tabiya::logging::file_layer;
use esco_tabiya::schema::{HierarchyRow, OccupationRow, OccupationSkillRow, SkillRow};
use esco_tabiya::table::read_records;
use esco_tabiya::{
    denormalize_file, export_dataset, find_conflicts, reconcile_dataset, AllocationMode,
    ConceptRegistry, DatasetStats, DenormalizeOptions, DiagnosticCode, Diagnostics,
    EscoSourcePaths, ExportOptions, TabiyaError, Table, Taxonomy,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;
use tracing_subscriber::layer::SubscriberExt;

const LANG: &str = "en";

const ISCO_GROUPS: &str = "\
conceptType,conceptUri,code,preferredLabel,altLabels,description
ISCOGroup,http://data.europa.eu/esco/isco/C2654,2654,Film directors,,Direct films
ISCOGroup,http://data.europa.eu/esco/isco/C7512,7512,Bakers,,
";

const SKILL_GROUPS: &str = "\
conceptType,conceptUri,code,preferredLabel,altLabels,description,scopeNote
SkillGroup,http://data.europa.eu/esco/skill/S1,S1,communication,,,
";

const SKILLS: &str = "\
conceptType,conceptUri,skillType,reuseLevel,preferredLabel,altLabels,description,definition,scopeNote
KnowledgeSkillCompetence,http://data.europa.eu/esco/skill/a,skill/competence,sector-specific,knead dough,,,,
KnowledgeSkillCompetence,http://data.europa.eu/esco/skill/b,knowledge,cross-sector,food safety,,,,
KnowledgeSkillCompetence,http://data.europa.eu/esco/skill/c,skill/competence,transversal,bake bread,,,,
";

const OCCUPATIONS: &str = "\
conceptType,conceptUri,iscoGroup,code,preferredLabel,altLabels,description,definition,scopeNote,regulatedProfessionNote
Occupation,http://data.europa.eu/esco/occupation/baker,7512,7512.1,baker,\"baker
cook\",Bakes bread,,,
Occupation,http://data.europa.eu/esco/occupation/chef,5120,5120.1,chef,\"cook
farmer\",,,,
";

const OCC_HIERARCHY: &str = "\
conceptType,conceptUri,broaderType,broaderUri
Occupation,http://data.europa.eu/esco/occupation/baker,ISCOGroup,http://data.europa.eu/esco/isco/C7512
Occupation,http://data.europa.eu/esco/occupation/chef,ISCOGroup,http://data.europa.eu/esco/isco/C5120
";

const SKILL_HIERARCHY: &str = "\
conceptType,conceptUri,broaderType,broaderUri
KnowledgeSkillCompetence,http://data.europa.eu/esco/skill/a,SkillGroup,http://data.europa.eu/esco/skill/S1
";

const OCC_SKILL: &str = "\
occupationUri,relationType,skillType,skillUri
http://data.europa.eu/esco/occupation/baker,essential,skill/competence,http://data.europa.eu/esco/skill/a
http://data.europa.eu/esco/occupation/baker,essential,knowledge,http://data.europa.eu/esco/skill/b
http://data.europa.eu/esco/occupation/baker,optional,skill/competence,http://data.europa.eu/esco/skill/c
http://data.europa.eu/esco/occupation/chef,essential,skill/competence,http://data.europa.eu/esco/skill/missing
";

const SKILL_SKILL: &str = "\
originalSkillUri,originalSkillType,relationType,relatedSkillType,relatedSkillUri
http://data.europa.eu/esco/skill/a,skill/competence,optional,knowledge,http://data.europa.eu/esco/skill/b
http://data.europa.eu/esco/skill/a,skill/competence,optional,skill/competence,http://data.europa.eu/esco/skill/a
";

fn write_esco_fixture(base: &Path, occupation_hierarchy: &str) {
    let classification = base.join("classification").join(LANG).join("csv");
    let relations = base.join("relations").join(LANG).join("csv");
    fs::create_dir_all(&classification).unwrap();
    fs::create_dir_all(&relations).unwrap();

    fs::write(classification.join("ISCOGroups_en.csv"), ISCO_GROUPS).unwrap();
    fs::write(classification.join("skillGroups_en.csv"), SKILL_GROUPS).unwrap();
    fs::write(classification.join("skills_en.csv"), SKILLS).unwrap();
    fs::write(classification.join("occupations_en.csv"), OCCUPATIONS).unwrap();
    fs::write(relations.join("broaderRelationsOccPillar_en.csv"), occupation_hierarchy).unwrap();
    fs::write(relations.join("broaderRelationsSkillPillar_en.csv"), SKILL_HIERARCHY).unwrap();
    fs::write(relations.join("occupationSkillRelations_en.csv"), OCC_SKILL).unwrap();
    fs::write(relations.join("skillSkillRelations_en.csv"), SKILL_SKILL).unwrap();
}

struct Fixture {
    dir: TempDir,
    source: EscoSourcePaths,
}

impl Fixture {
    fn new() -> Self {
        Self::with_occupation_hierarchy(OCC_HIERARCHY)
    }

    fn with_occupation_hierarchy(occupation_hierarchy: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let esco = dir.path().join("esco");
        write_esco_fixture(&esco, occupation_hierarchy);
        let source = EscoSourcePaths::new(&esco, LANG);
        Self { dir, source }
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    fn export(
        &self,
        target: &str,
        options: &ExportOptions,
        seed: u64,
    ) -> (DatasetStats, Diagnostics) {
        let mut registry = ConceptRegistry::new();
        let mut diags = Diagnostics::new();
        let stats = export_dataset(
            &self.source,
            &self.path(target),
            options,
            &mut registry,
            &mut diags,
            &mut StdRng::seed_from_u64(seed),
        )
        .unwrap();
        (stats, diags)
    }
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_complete_export_counts_and_warnings() {
    let fixture = Fixture::new();
    let (stats, diags) = fixture.export("tabiya", &ExportOptions::complete(), 1);

    assert_eq!(
        stats,
        DatasetStats {
            isco_groups: 2,
            skill_groups: 1,
            skills: 3,
            occupations: 2,
            occupations_hierarchy: 1,
            skills_hierarchy: 1,
            occupation_skill_relations: 3,
            skill_skill_relations: 1,
        }
    );

    assert_eq!(diags.with_code(DiagnosticCode::UnknownUri).count(), 2);
    assert_eq!(diags.with_code(DiagnosticCode::SelfReference).count(), 1);
    assert!(!diags.has_errors());
}

#[test]
fn test_export_writes_resolved_ids() {
    let fixture = Fixture::new();
    fixture.export("tabiya", &ExportOptions::complete(), 1);
    let out = fixture.path("tabiya");

    let occupations: Vec<OccupationRow> = read_records(&out.join("occupations.csv"), None).unwrap();
    assert_eq!(occupations[0].id, "key_7");
    assert_eq!(occupations[0].alt_labels, "baker\ncook");
    assert_eq!(occupations[0].occupation_type, "escooccupation");

    let hierarchy: Vec<HierarchyRow> =
        read_records(&out.join("occupations_hierarchy.csv"), None).unwrap();
    assert_eq!(hierarchy.len(), 1);
    assert_eq!(hierarchy[0].parent_id, "key_2");
    assert_eq!(hierarchy[0].child_id, "key_7");

    let relations: Vec<OccupationSkillRow> =
        read_records(&out.join("occupation_skill_relations.csv"), None).unwrap();
    let skill_ids: Vec<_> = relations.iter().map(|r| r.skill_id.as_str()).collect();
    assert_eq!(skill_ids, vec!["key_4", "key_5", "key_6"]);
    assert!(relations.iter().all(|r| r.occupation_type == "escooccupation"));
}

#[test]
fn test_export_handles_empty_relation_file() {
    let header_only = "conceptType,conceptUri,broaderType,broaderUri\n";
    let fixture = Fixture::with_occupation_hierarchy(header_only);
    let (stats, _) = fixture.export("tabiya", &ExportOptions::complete(), 1);
    assert_eq!(stats.occupations_hierarchy, 0);

    let path = fixture.path("tabiya").join("occupations_hierarchy.csv");
    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "PARENTOBJECTTYPE,PARENTID,CHILDID,CHILDOBJECTTYPE\n");

    let table = Table::read(&path).unwrap();
    assert!(table.is_empty());
    assert_eq!(table.headers().len(), 4);
}

#[test]
fn test_unknown_concept_type_aborts() {
    let fixture = Fixture::with_occupation_hierarchy(
        "conceptType,conceptUri,broaderType,broaderUri\n\
         Occupation,http://data.europa.eu/esco/occupation/baker,Mystery,\
         http://data.europa.eu/esco/isco/C7512\n",
    );
    let mut registry = ConceptRegistry::new();
    let mut diags = Diagnostics::new();
    let result = export_dataset(
        &fixture.source,
        &fixture.path("tabiya"),
        &ExportOptions::complete(),
        &mut registry,
        &mut diags,
        &mut StdRng::seed_from_u64(1),
    );

    assert!(matches!(result, Err(TabiyaError::UnknownConceptType { .. })));
    assert!(diags.has_errors());
    // tables written before the failure stay on disk
    assert!(fixture.path("tabiya").join("occupations.csv").exists());
    assert!(!fixture.path("tabiya").join("skills_hierarchy.csv").exists());
}

#[test]
fn test_sample_export_after_reset() {
    let fixture = Fixture::new();
    let mut registry = ConceptRegistry::new();
    let mut diags = Diagnostics::new();
    let mut rng = StdRng::seed_from_u64(1);

    export_dataset(
        &fixture.source,
        &fixture.path("tabiya"),
        &ExportOptions::complete(),
        &mut registry,
        &mut diags,
        &mut rng,
    )
    .unwrap();

    // Same registry, no reset: every concept is already known.
    let again = export_dataset(
        &fixture.source,
        &fixture.path("again"),
        &ExportOptions::complete(),
        &mut registry,
        &mut diags,
        &mut rng,
    );
    assert!(matches!(again, Err(TabiyaError::DuplicateConcept(_))));

    registry.reset();
    diags.clear();
    let stats = export_dataset(
        &fixture.source,
        &fixture.path("samples"),
        &ExportOptions::sample(2),
        &mut registry,
        &mut diags,
        &mut rng,
    )
    .unwrap();

    assert_eq!(stats.skills, 2);
    assert_eq!(stats.occupation_skill_relations, 2);

    let skills: Vec<SkillRow> =
        read_records(&fixture.path("samples").join("skills.csv"), None).unwrap();
    assert_eq!(skills[0].id, "key_4");
    // skill c and the missing skill are both unknown in the sample
    assert_eq!(diags.with_code(DiagnosticCode::UnknownUri).count(), 3);
}

#[test]
fn test_diagnostics_log_lists_every_warning() {
    let fixture = Fixture::new();
    let log = fixture.path("debug.log");

    let (layer, guard) = file_layer(&log).unwrap();
    let subscriber = tracing_subscriber::registry().with(layer);
    let (_, diags) = tracing::subscriber::with_default(subscriber, || {
        fixture.export("tabiya", &ExportOptions::complete(), 1)
    });
    drop(guard);
    let content = fs::read_to_string(&log).unwrap();

    assert_eq!(content.lines().count(), diags.len());
    assert_eq!(diags.len(), 3);
    assert!(content.contains("Occupations Hierarchy: BroaderUri is not known"));
    assert!(content.contains("isco/C5120"));
}

#[test]
fn test_stats_summary_keys() {
    let json = serde_json::to_value(DatasetStats::default()).unwrap();
    for key in [
        "ISCOGroups",
        "SkillGroups",
        "Skills",
        "Occupations",
        "OccupationsHierarchy",
        "SkillsHierarchy",
        "OccupationSkillRelations",
        "SkillSkillRelations",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
}

// =============================================================================
// Lineage
// =============================================================================

#[test]
fn test_dataset_lineage_appends_previous_uuids() {
    let fixture = Fixture::new();
    fixture.export("v1", &ExportOptions::complete(), 1);
    fixture.export("v2", &ExportOptions::complete(), 2);

    let occupations = |dataset: &str| -> Vec<OccupationRow> {
        read_records(&fixture.path(dataset).join("occupations.csv"), None).unwrap()
    };
    let previous = occupations("v1");
    let before = occupations("v2");

    let mut diags = Diagnostics::new();
    let results = reconcile_dataset(&fixture.path("v1"), &fixture.path("v2"), &mut diags).unwrap();
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|(_, stats)| stats.unmatched == 0));
    assert!(diags.is_empty());

    let after = occupations("v2");
    for ((prev, old), new) in previous.iter().zip(&before).zip(&after) {
        assert_eq!(new.uuid_history, format!("{}\n{}", old.uuid_history, prev.uuid_history));
    }
}

#[test]
fn test_dataset_lineage_with_empty_skills_table() {
    let fixture = Fixture::new();
    fixture.export("v1", &ExportOptions::sample(0), 1);
    fixture.export("v2", &ExportOptions::sample(0), 2);

    let mut diags = Diagnostics::new();
    let results = reconcile_dataset(&fixture.path("v1"), &fixture.path("v2"), &mut diags).unwrap();
    let (_, skills) = results.iter().find(|(t, _)| t.file_name() == "skills.csv").unwrap();
    assert_eq!((skills.prior_keys, skills.matched, skills.unmatched), (0, 0, 0));
    assert!(diags.is_empty());

    // a 0-byte previous table reads as a table without rows
    fs::write(fixture.path("v1").join("skills.csv"), "").unwrap();
    let (stats, _) = fixture.export("v3", &ExportOptions::complete(), 3);
    let mut diags = Diagnostics::new();
    let results = reconcile_dataset(&fixture.path("v1"), &fixture.path("v3"), &mut diags).unwrap();
    let (_, skills) = results.iter().find(|(t, _)| t.file_name() == "skills.csv").unwrap();
    assert_eq!(skills.unmatched, stats.skills);
    assert_eq!(diags.with_code(DiagnosticCode::LineageMiss).count(), stats.skills);
}

// =============================================================================
// Denormalize + conflicts on exported data
// =============================================================================

#[test]
fn test_denormalize_exported_taxonomy() {
    let fixture = Fixture::new();
    fixture.export("tabiya", &ExportOptions::complete(), 1);
    let taxonomy = Taxonomy::load(&fixture.path("tabiya")).unwrap();

    let input = fixture.path("input.csv");
    let output = fixture.path("input.output.csv");
    fs::write(&input, "id,ESCO_occ_1\n1,7512.1\n2,9999.9\n").unwrap();

    let options = DenormalizeOptions {
        max_skills: 2,
        essential_only: true,
        mode: AllocationMode::Proportional,
        ..Default::default()
    };
    let mut diags = Diagnostics::new();
    let mut rng = StdRng::seed_from_u64(4);
    let report =
        denormalize_file(&input, &output, &taxonomy, &options, &mut diags, &mut rng).unwrap();

    assert_eq!(report.rows, 2);
    assert_eq!(report.occupations_found, 1);
    assert_eq!(report.occupations_missing, 1);

    let table = Table::read(&output).unwrap();
    assert_eq!(table.get(0, "ESCO_occ_1_skill_1"), Some("knead dough"));
    assert_eq!(table.get(0, "ESCO_occ_1_skill_2"), Some("food safety"));
    assert_eq!(table.get(1, "ESCO_occ_1_skill_1"), Some(""));
    assert_eq!(table.get(0, "ESCO_occ_3_skill_2"), Some(""));

    let stats = Table::read(&stats_path(&output)).unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats.get(0, "ESCO CODE"), Some("7512.1"));
}

#[test]
fn test_conflicts_on_exported_occupations() {
    let fixture = Fixture::new();
    fixture.export("tabiya", &ExportOptions::complete(), 1);

    let occupations: Vec<OccupationRow> =
        read_records(&fixture.path("tabiya").join("occupations.csv"), None).unwrap();
    let conflicts = find_conflicts(&occupations);

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].first_code, "7512.1");
    assert_eq!(conflicts[0].second_code, "5120.1");
    assert_eq!(conflicts[0].common_labels, "cook");
}
