//! Property-Based Tests
//!
//! 1. Budget splits always spend the whole budget, within one slot of the target
//! 2. Allocations fill exactly the available share
//! 3. Registry ids are unique and dense
//! 4. Conflict detection does not depend on input order
//! 5. Lineage never changes the row count

use std::collections::HashSet;

use esco_tabiya::allocation::split_budget;
use esco_tabiya::schema::OccupationRow;
use esco_tabiya::{
    allocate, find_conflicts, match_and_append, ConceptRegistry, Diagnostics, TabiyaError, Table,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ============================================================================
// Strategies
// ============================================================================

fn labels(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}{i}")).collect()
}

/// Concept URIs, unique after normalization
fn uri_set_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z]{1,8}/[0-9]{1,4}", 1..40).prop_map(|set| {
        set.into_iter()
            .map(|s| format!("http://data.europa.eu/esco/{s}"))
            .collect()
    })
}

/// Small alt-label vocabulary so that conflicts actually occur
fn alt_labels_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("cook"),
            Just("baker"),
            Just("farmer"),
            Just("driver"),
            Just("nurse"),
        ],
        0..4,
    )
    .prop_map(|labels| labels.join("\n"))
}

fn occupations_strategy() -> impl Strategy<Value = Vec<OccupationRow>> {
    prop::collection::vec(alt_labels_strategy(), 0..12).prop_map(|all| {
        all.into_iter()
            .enumerate()
            .map(|(i, alt_labels)| OccupationRow {
                code: format!("{}.{}", 1000 + i, i),
                preferred_label: format!("occupation {i}"),
                alt_labels,
                ..Default::default()
            })
            .collect()
    })
}

// ============================================================================
// Allocation
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn split_spends_whole_budget(c in 0usize..200, k in 0usize..200, budget in 1usize..30) {
        prop_assume!(c + k > 0);
        let split = split_budget(c, k, budget).unwrap();
        prop_assert_eq!(split.competence + split.knowledge, budget);
    }

    #[test]
    fn split_within_one_slot_of_target(c in 0usize..200, k in 0usize..200, budget in 1usize..30) {
        prop_assume!(c + k > 0);
        let total = c + k;
        let split = split_budget(c, k, budget).unwrap();
        // |picked / budget - c / total| <= 1 / (2 * budget)
        let diff = (split.competence * total).abs_diff(budget * c);
        prop_assert!(2 * diff <= total);
    }

    #[test]
    fn allocation_fills_available_share(
        c in 0usize..15,
        k in 0usize..15,
        budget in 1usize..12,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let allocation = allocate(labels("c", c), labels("k", k), budget, &mut rng);
        prop_assert_eq!(allocation.slots.len(), budget);

        match split_budget(c, k, budget) {
            None => {
                prop_assert!(allocation.stats.is_none());
                prop_assert_eq!(allocation.filled(), 0);
            }
            Some(split) => {
                let stats = allocation.stats.clone().unwrap();
                prop_assert_eq!(stats.picked_competence, c.min(split.competence));
                prop_assert_eq!(stats.picked_knowledge, k.min(split.knowledge));
                prop_assert_eq!(
                    allocation.filled(),
                    stats.picked_competence + stats.picked_knowledge
                );

                let filled: Vec<_> = allocation.slots.iter().filter(|s| !s.is_empty()).collect();
                let distinct: HashSet<_> = filled.iter().collect();
                prop_assert_eq!(distinct.len(), filled.len());
            }
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn registry_ids_are_unique_and_dense(uris in uri_set_strategy()) {
        let mut registry = ConceptRegistry::new();
        let ids: Vec<_> = uris.iter().map(|u| registry.register(u).unwrap()).collect();

        let distinct: HashSet<_> = ids.iter().map(|id| id.as_str().to_string()).collect();
        prop_assert_eq!(distinct.len(), uris.len());
        for (n, id) in ids.iter().enumerate() {
            prop_assert_eq!(id.as_str(), format!("key_{}", n + 1));
        }
    }

    #[test]
    fn registry_normalizes_case_and_whitespace(uris in uri_set_strategy()) {
        let mut registry = ConceptRegistry::new();
        for uri in &uris {
            registry.register(uri).unwrap();
        }
        for uri in &uris {
            let variant = format!("  {}  ", uri.to_uppercase());
            prop_assert_eq!(registry.resolve(&variant), registry.resolve(uri));
            let duplicate = registry.register(&variant);
            prop_assert!(matches!(duplicate, Err(TabiyaError::DuplicateConcept(_))));
        }
    }
}

// ============================================================================
// Conflicts
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn conflicts_ignore_input_order(occupations in occupations_strategy()) {
        let pairs = |rows: &[OccupationRow]| -> HashSet<(String, String, String)> {
            find_conflicts(rows)
                .into_iter()
                .map(|c| {
                    let (a, b) = if c.first_code < c.second_code {
                        (c.first_code, c.second_code)
                    } else {
                        (c.second_code, c.first_code)
                    };
                    let mut common: Vec<_> =
                        c.common_labels.split('\n').map(str::to_string).collect();
                    common.sort();
                    (a, b, common.join("\n"))
                })
                .collect()
        };

        let mut reversed = occupations.clone();
        reversed.reverse();
        prop_assert_eq!(pairs(&occupations), pairs(&reversed));
    }

    #[test]
    fn conflicts_report_each_pair_once(occupations in occupations_strategy()) {
        let conflicts = find_conflicts(&occupations);
        let mut seen = HashSet::new();
        for c in &conflicts {
            prop_assert_ne!(&c.first_code, &c.second_code);
            prop_assert!(seen.insert((c.first_code.clone(), c.second_code.clone())));
            prop_assert!(!seen.contains(&(c.second_code.clone(), c.first_code.clone())));
        }
    }
}

// ============================================================================
// Lineage
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn lineage_preserves_rows(
        prior_keys in prop::collection::vec(0u8..20, 0..20),
        target_keys in prop::collection::vec(0u8..20, 0..20),
    ) {
        let mut prior = Table::new(vec!["CODE".into(), "UUIDHISTORY".into()]);
        for key in &prior_keys {
            prior.push_row(vec![key.to_string(), format!("old-{key}")]).unwrap();
        }
        let mut target = Table::new(vec!["CODE".into(), "UUIDHISTORY".into()]);
        for key in &target_keys {
            target.push_row(vec![key.to_string(), format!("new-{key}")]).unwrap();
        }

        let mut diags = Diagnostics::new();
        let stats = match_and_append(&prior, &mut target, "CODE", &mut diags).unwrap();

        prop_assert_eq!(target.len(), target_keys.len());
        prop_assert_eq!(stats.matched + stats.unmatched, target_keys.len());
        prop_assert_eq!(diags.len(), stats.unmatched);
        for (i, key) in target_keys.iter().enumerate() {
            let key_str = key.to_string();
            prop_assert_eq!(target.get(i, "CODE"), Some(key_str.as_str()));
            let history = target.get(i, "UUIDHISTORY").unwrap();
            if prior_keys.contains(key) {
                prop_assert_eq!(history.to_string(), format!("new-{key}\nold-{key}"));
            } else {
                prop_assert_eq!(history.to_string(), format!("new-{key}"));
            }
        }
    }
}
