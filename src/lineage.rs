//! UUID lineage reconciliation
//!
//! Carries `UUIDHISTORY` values from a previous dataset version into a newly
//! transformed one. Rows are matched on a natural key column (`CODE` or
//! `ORIGINURI`); matches append the previous value to the new row's history,
//! misses are reported and left untouched.
//!
//! Appending is not idempotent: reconciling the same file twice against the
//! same previous version records the inherited UUID twice.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::error::Result;
use crate::table::Table;
use crate::transform::TabiyaTable;

/// Column holding the newline-separated lineage identifiers
pub const UUID_HISTORY: &str = "UUIDHISTORY";

const SOURCE: &str = "UUID Lineage";

/// Outcome of one reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageStats {
    /// Distinct join keys found in the previous version
    pub prior_keys: usize,
    pub matched: usize,
    pub unmatched: usize,
}

/// Append `uuid` to an existing history value
pub fn append_history(existing: &str, uuid: &str) -> String {
    if existing.is_empty() {
        uuid.to_string()
    } else {
        format!("{}\n{}", existing, uuid)
    }
}

/// Append the previous version's `UUIDHISTORY` to every row of `target`
/// sharing `join_column` with a row of `prior`.
///
/// Duplicate keys in `prior` resolve to the last occurrence. Row order and
/// count of `target` never change. A blank table (0-byte file, no header)
/// counts as a table without rows.
pub fn match_and_append(
    prior: &Table,
    target: &mut Table,
    join_column: &str,
    diagnostics: &mut Diagnostics,
) -> Result<LineageStats> {
    let mut by_key: HashMap<&str, &str> = HashMap::with_capacity(prior.len());
    if !prior.is_blank() {
        let prior_key = prior.require_column(join_column, "previous version table")?;
        let prior_history = prior.require_column(UUID_HISTORY, "previous version table")?;
        for row in prior.rows() {
            by_key.insert(row[prior_key].as_str(), row[prior_history].as_str());
        }
    }
    if target.is_blank() {
        return Ok(LineageStats {
            prior_keys: by_key.len(),
            ..Default::default()
        });
    }
    let target_key = target.require_column(join_column, "target table")?;
    let target_history = target.require_column(UUID_HISTORY, "target table")?;

    let mut stats = LineageStats {
        prior_keys: by_key.len(),
        ..Default::default()
    };

    for row in target.rows_mut() {
        match by_key.get(row[target_key].as_str()).filter(|uuid| !uuid.is_empty()) {
            Some(uuid) => {
                row[target_history] = append_history(&row[target_history], uuid);
                stats.matched += 1;
            }
            None => {
                diagnostics.warning(
                    SOURCE,
                    DiagnosticCode::LineageMiss,
                    format!("No UUID found for {}", row[target_key]),
                );
                stats.unmatched += 1;
            }
        }
    }

    Ok(stats)
}

/// File-level [`match_and_append`]. `output` may be the same path as
/// `target`, in which case the target is rewritten in place.
pub fn reconcile_file(
    prior: &Path,
    target: &Path,
    join_column: &str,
    output: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<LineageStats> {
    let prior_table = Table::read(prior)?;
    let mut target_table = Table::read(target)?;

    let stats = match_and_append(&prior_table, &mut target_table, join_column, diagnostics)?;
    target_table.write(output)?;

    info!(
        output = %output.display(),
        prior_keys = stats.prior_keys,
        matched = stats.matched,
        unmatched = stats.unmatched,
        "UUIDs appended"
    );
    Ok(stats)
}

/// Join columns used when reconciling a whole Tabiya dataset folder
pub const DATASET_PLAN: [(TabiyaTable, &str); 4] = [
    (TabiyaTable::IscoGroups, "CODE"),
    (TabiyaTable::Occupations, "CODE"),
    (TabiyaTable::Skills, "ORIGINURI"),
    (TabiyaTable::SkillGroups, "ORIGINURI"),
];

/// Reconcile every entity table of `target_dir` in place against the same
/// tables in `previous_dir`
pub fn reconcile_dataset(
    previous_dir: &Path,
    target_dir: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<(TabiyaTable, LineageStats)>> {
    let mut results = Vec::with_capacity(DATASET_PLAN.len());
    for (table, join_column) in DATASET_PLAN {
        let target = target_dir.join(table.file_name());
        let stats = reconcile_file(
            &previous_dir.join(table.file_name()),
            &target,
            join_column,
            &target,
            diagnostics,
        )?;
        results.push((table, stats));
    }
    Ok(results)
}
