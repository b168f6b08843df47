//! Skill allocation
//!
//! Picks at most `budget` skill labels for one occupation. In proportional
//! mode the budget is split between competence-type and knowledge-type skills
//! in proportion to how often each category occurs among the occupation's
//! relations; each category is then sampled uniformly at random.
//!
//! The split is computed before any sampling and is independent of the
//! random source; [`AllocationStats`] only records what happened.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Prefix applied to knowledge-type labels in unweighted mode
pub const KNOWLEDGE_PREFIX: &str = "knowledge of ";

/// The two skill categories that take part in the budget split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Competence,
    Knowledge,
}

impl SkillCategory {
    /// Parse a Tabiya `SKILLTYPE` value
    pub fn parse(skill_type: &str) -> Option<Self> {
        match skill_type {
            "skill/competence" => Some(Self::Competence),
            "knowledge" => Some(Self::Knowledge),
            _ => None,
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Competence => write!(f, "competence"),
            Self::Knowledge => write!(f, "knowledge"),
        }
    }
}

/// How skills are picked for an occupation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationMode {
    /// Shuffle all related skills together and take the first `budget`
    #[default]
    Unweighted,
    /// Split the budget between competence and knowledge by frequency
    Proportional,
}

/// Per-category budget split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSplit {
    pub competence: usize,
    pub knowledge: usize,
    /// Category whose count was rounded; the other took the remainder
    pub computed_first: SkillCategory,
}

/// `round(budget * count / total)`, halves rounded up, in exact integer
/// arithmetic
fn round_share(budget: usize, count: usize, total: usize) -> usize {
    (2 * budget * count + total) / (2 * total)
}

/// Split `budget` between the two categories.
///
/// The category with the strictly greater share is rounded first; on a tie
/// knowledge is rounded first. Returns `None` when both counts are zero.
pub fn split_budget(competence: usize, knowledge: usize, budget: usize) -> Option<BudgetSplit> {
    let total = competence + knowledge;
    if total == 0 {
        return None;
    }

    // competence / total > knowledge / total  <=>  competence > knowledge
    if competence > knowledge {
        let picked = round_share(budget, competence, total);
        Some(BudgetSplit {
            competence: picked,
            knowledge: budget.saturating_sub(picked),
            computed_first: SkillCategory::Competence,
        })
    } else {
        let picked = round_share(budget, knowledge, total);
        Some(BudgetSplit {
            competence: budget.saturating_sub(picked),
            knowledge: picked,
            computed_first: SkillCategory::Knowledge,
        })
    }
}

fn percent(value: f64) -> f64 {
    (value * 100.0 * 100.0).round() / 100.0
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Audit record of one proportional allocation. Proportions and errors are
/// percentages rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationStats {
    pub competence_count: usize,
    pub knowledge_count: usize,
    pub competence_proportion: f64,
    pub knowledge_proportion: f64,
    pub computed_first: SkillCategory,
    pub picked_competence: usize,
    pub picked_knowledge: usize,
    pub picked_competence_proportion: f64,
    pub picked_knowledge_proportion: f64,
    /// Target minus achieved competence proportion
    pub competence_error: f64,
    /// Target minus achieved knowledge proportion
    pub knowledge_error: f64,
}

impl AllocationStats {
    fn new(
        competence_count: usize,
        knowledge_count: usize,
        split: &BudgetSplit,
        picked_competence: usize,
        picked_knowledge: usize,
    ) -> Self {
        let total = competence_count + knowledge_count;
        let picked_total = picked_competence + picked_knowledge;

        let target_c = ratio(competence_count, total);
        let target_k = ratio(knowledge_count, total);
        let achieved_c = ratio(picked_competence, picked_total);
        let achieved_k = ratio(picked_knowledge, picked_total);

        Self {
            competence_count,
            knowledge_count,
            competence_proportion: percent(target_c),
            knowledge_proportion: percent(target_k),
            computed_first: split.computed_first,
            picked_competence,
            picked_knowledge,
            picked_competence_proportion: percent(achieved_c),
            picked_knowledge_proportion: percent(achieved_k),
            competence_error: percent(target_c - achieved_c),
            knowledge_error: percent(target_k - achieved_k),
        }
    }
}

/// Result of allocating one occupation's budget
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Exactly `budget` entries; unfilled slots are empty strings
    pub slots: Vec<String>,
    /// Absent when the occupation had no categorized skills
    pub stats: Option<AllocationStats>,
}

impl Allocation {
    /// An all-empty allocation
    pub fn empty(budget: usize) -> Self {
        Self {
            slots: vec![String::new(); budget],
            stats: None,
        }
    }

    /// Number of non-empty slots
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }
}

/// Proportional allocation over already partitioned skill labels.
///
/// Competence picks fill slots `[0, split.competence)`, knowledge picks fill
/// `[split.competence, split.competence + split.knowledge)`. A category with
/// fewer members than its share leaves its remaining slots empty.
pub fn allocate<R: Rng + ?Sized>(
    mut competence: Vec<String>,
    mut knowledge: Vec<String>,
    budget: usize,
    rng: &mut R,
) -> Allocation {
    let Some(split) = split_budget(competence.len(), knowledge.len(), budget) else {
        return Allocation::empty(budget);
    };
    let (competence_count, knowledge_count) = (competence.len(), knowledge.len());

    competence.shuffle(rng);
    knowledge.shuffle(rng);
    competence.truncate(split.competence);
    knowledge.truncate(split.knowledge);

    let stats = AllocationStats::new(
        competence_count,
        knowledge_count,
        &split,
        competence.len(),
        knowledge.len(),
    );

    let mut slots = vec![String::new(); budget];
    let knowledge_offset = split.competence;
    for (i, label) in competence.into_iter().enumerate() {
        slots[i] = label;
    }
    for (i, label) in knowledge.into_iter().enumerate() {
        slots[knowledge_offset + i] = label;
    }

    Allocation {
        slots,
        stats: Some(stats),
    }
}

/// A related skill as seen by the unweighted mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillCandidate {
    pub label: String,
    pub category: Option<SkillCategory>,
}

impl SkillCandidate {
    /// Output label; knowledge-type skills read "knowledge of <label>"
    pub fn display_label(&self) -> String {
        match self.category {
            Some(SkillCategory::Knowledge) => format!("{}{}", KNOWLEDGE_PREFIX, self.label),
            _ => self.label.clone(),
        }
    }
}

/// Shuffle all candidates together and fill up to `budget` slots
pub fn allocate_unweighted<R: Rng + ?Sized>(
    mut candidates: Vec<SkillCandidate>,
    budget: usize,
    rng: &mut R,
) -> Allocation {
    candidates.shuffle(rng);
    let mut slots = vec![String::new(); budget];
    for (slot, candidate) in slots.iter_mut().zip(&candidates) {
        *slot = candidate.display_label();
    }
    Allocation { slots, stats: None }
}
