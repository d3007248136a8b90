// Copyright 2026 The A-VO-S Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Property-based tests for aggregation and relaxation using proptest.
//!
//! These tests verify that:
//! 1. Aggregated entities are unique
//! 2. Counters within a (topic, category, value) slot run 1..=k in order
//! 3. Journal classification is idempotent
//! 4. Relaxation is deterministic

use std::collections::{BTreeMap, HashMap, HashSet};

use proptest::prelude::*;
use serde_json::{Value, json};

use crate::aggregate::{aggregate, classify_journals};
use crate::config::{AggregationConfig, SimulationConfig};
use crate::datamodel::{CodedRow, PaperRecord};
use crate::flatten::{FLAG_KEYS, flatten_rows};
use crate::geometry::Position;
use crate::relax::{AnchoredPoint, relax};

fn code_strategy() -> impl Strategy<Value = String> {
    (0u8..12).prop_map(|n| format!("P{n}"))
}

fn scope_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        (1i32..=5).prop_map(Value::from),
        (1i32..=5).prop_map(|n| Value::from(n.to_string())),
        Just(Value::from("n/a")),
        Just(Value::Null),
    ]
}

fn row_strategy() -> impl Strategy<Value = CodedRow> {
    (
        code_strategy(),
        scope_strategy(),
        prop::collection::vec(any::<bool>(), FLAG_KEYS.len()),
    )
        .prop_map(|(code, scope, flags)| {
            let mut columns = BTreeMap::new();
            for (key, set) in FLAG_KEYS.iter().zip(flags) {
                columns.insert((*key).to_owned(), json!(if set { 1 } else { 0 }));
            }
            CodedRow {
                code,
                scope,
                columns,
            }
        })
}

fn journal_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Journal of Marketing".to_owned()),
        Just("Journal of Business Ethics".to_owned()),
        Just("Sustainability".to_owned()),
        "[A-Z][a-z]{2,8}".prop_map(|s| s.to_string()),
    ]
}

fn papers_strategy() -> impl Strategy<Value = Vec<PaperRecord>> {
    // Some codes get no paper so the missing-paper path is exercised.
    prop::collection::vec((code_strategy(), journal_strategy(), 0u32..50), 0..12).prop_map(
        |entries| {
            entries
                .into_iter()
                .map(|(code, journal, citations)| PaperRecord {
                    code,
                    authors: "Doe J.|Roe R.".to_owned(),
                    source_title: journal,
                    year: Some(2010),
                    citation_count: Some(citations as f64),
                    ..PaperRecord::default()
                })
                .collect()
        },
    )
}

fn anchored_strategy() -> impl Strategy<Value = Vec<AnchoredPoint>> {
    prop::collection::vec(((-40i32..40), (-40i32..40), (4u8..16)), 0..20).prop_map(|points| {
        points
            .into_iter()
            .map(|(x, y, size)| {
                let anchor = Position::new(300.0 + x as f64, y as f64);
                AnchoredPoint {
                    anchor,
                    target_radius: 340.0,
                    size: size as f64,
                }
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn entities_are_unique(
        rows in prop::collection::vec(row_strategy(), 0..24),
        papers in papers_strategy(),
    ) {
        let agg = aggregate(&flatten_rows(&rows), &papers, &AggregationConfig::default());
        let mut seen = HashSet::new();
        for point in &agg.data {
            prop_assert!(seen.insert(point.entity.clone()), "duplicate {}", point.entity);
        }
    }

    #[test]
    fn counters_are_contiguous(
        rows in prop::collection::vec(row_strategy(), 0..24),
        papers in papers_strategy(),
    ) {
        let agg = aggregate(&flatten_rows(&rows), &papers, &AggregationConfig::default());
        let mut slots: HashMap<(String, String, u64), Vec<u32>> = HashMap::new();
        for point in &agg.data {
            slots
                .entry((
                    point.topic.to_string(),
                    point.category.to_string(),
                    point.value.to_bits(),
                ))
                .or_default()
                .push(point.counter);
        }
        for counters in slots.values() {
            let expected: Vec<u32> = (1..=counters.len() as u32).collect();
            prop_assert_eq!(&expected, counters);
        }
    }

    #[test]
    fn journal_classification_is_idempotent(
        rows in prop::collection::vec(row_strategy(), 0..24),
        papers in papers_strategy(),
    ) {
        let config = AggregationConfig::default();
        let agg = aggregate(&flatten_rows(&rows), &papers, &config);

        let mut once = agg.data.clone();
        let legend = classify_journals(&mut once, &config);
        let mut twice = once.clone();
        let legend_again = classify_journals(&mut twice, &config);
        prop_assert_eq!(&legend, &legend_again);
        prop_assert_eq!(&once, &twice);

        prop_assert!(legend.len() <= config.top_journals + 1);
        for point in &once {
            prop_assert!(legend.contains(&point.color));
        }
    }

    #[test]
    fn relaxation_is_deterministic(points in anchored_strategy()) {
        let config = SimulationConfig::default();
        let first = relax(&points, &config);
        let second = relax(&points, &config);
        prop_assert_eq!(points.len(), first.len());
        prop_assert_eq!(first, second);
    }
}
