//! Alternate-label conflicts
//!
//! Data-quality check over a finished occupations table: reports every pair
//! of distinct occupations whose `ALTLABELS` lists share at least one label.

use serde::{Deserialize, Serialize};

use crate::schema::OccupationRow;
use crate::table::CsvRecord;

/// One conflicting occupation pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRow {
    #[serde(rename = "OCCUPATION 1 ESCO CODE")]
    pub first_code: String,
    #[serde(rename = "OCCUPATION 1 PREFERRED LABEL")]
    pub first_preferred_label: String,
    #[serde(rename = "OCCUPATION 1 LABELS")]
    pub first_labels: String,
    #[serde(rename = "OCCUPATION 2 ESCO CODE")]
    pub second_code: String,
    #[serde(rename = "OCCUPATION 2 PREFERRED LABEL")]
    pub second_preferred_label: String,
    #[serde(rename = "OCCUPATION 2 LABELS")]
    pub second_labels: String,
    /// Shared labels, newline separated
    #[serde(rename = "COMMON LABELS")]
    pub common_labels: String,
}

impl CsvRecord for ConflictRow {
    const COLUMNS: &'static [&'static str] = &[
        "OCCUPATION 1 ESCO CODE",
        "OCCUPATION 1 PREFERRED LABEL",
        "OCCUPATION 1 LABELS",
        "OCCUPATION 2 ESCO CODE",
        "OCCUPATION 2 PREFERRED LABEL",
        "OCCUPATION 2 LABELS",
        "COMMON LABELS",
    ];
}

fn split_labels(alt_labels: &str) -> Vec<&str> {
    alt_labels.split('\n').filter(|l| !l.is_empty()).collect()
}

/// Labels present in both lists, in the order of the longer list (the first
/// list on equal length), without repeats
pub fn common_labels<'a>(first: &[&'a str], second: &[&'a str]) -> Vec<&'a str> {
    let (outer, inner) = if first.len() >= second.len() {
        (first, second)
    } else {
        (second, first)
    };

    let mut common: Vec<&'a str> = Vec::new();
    for &label in outer {
        if inner.contains(&label) && !common.contains(&label) {
            common.push(label);
        }
    }
    common
}

/// Compare every unordered pair of occupations with different codes.
///
/// Each conflicting pair is reported once, the occupation that comes first
/// in the input in the first position.
pub fn find_conflicts(occupations: &[OccupationRow]) -> Vec<ConflictRow> {
    let labels: Vec<Vec<&str>> = occupations.iter().map(|o| split_labels(&o.alt_labels)).collect();

    let mut conflicts = Vec::new();
    for (i, first) in occupations.iter().enumerate() {
        for (j, second) in occupations.iter().enumerate().skip(i + 1) {
            if first.code == second.code {
                continue;
            }
            let common = common_labels(&labels[i], &labels[j]);
            if common.is_empty() {
                continue;
            }
            conflicts.push(ConflictRow {
                first_code: first.code.clone(),
                first_preferred_label: first.preferred_label.clone(),
                first_labels: first.alt_labels.clone(),
                second_code: second.code.clone(),
                second_preferred_label: second.preferred_label.clone(),
                second_labels: second.alt_labels.clone(),
                common_labels: common.join("\n"),
            });
        }
    }
    conflicts
}
