// Copyright 2026 The A-VO-S Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Aggregation: flat points are grouped per (unit, topic, category), scored
//! with the group's mean scope value, joined to their paper, classified by
//! journal and numbered within each (topic, category, value) slot.

use std::collections::HashMap;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use tracing::{debug, warn};

use crate::config::AggregationConfig;
use crate::datamodel::{Aggregation, Category, DataPoint, FlatPoint, PaperRecord, Topic};

type Groups<'a> = IndexMap<&'a str, IndexMap<&'a Topic, IndexMap<&'a Category, Vec<&'a FlatPoint>>>>;

/// Nest points by unit, then topic, then category, each level keeping the
/// order in which its keys were first seen.
fn group_points(points: &[FlatPoint]) -> Groups<'_> {
    let mut groups: Groups = IndexMap::new();
    for point in points {
        groups
            .entry(point.unit_id.as_str())
            .or_default()
            .entry(&point.topic)
            .or_default()
            .entry(&point.category)
            .or_default()
            .push(point);
    }
    groups
}

/// Mean of the numeric values; non-numeric values are skipped.
fn mean_value(points: &[&FlatPoint]) -> Option<f64> {
    let (sum, n) = points
        .iter()
        .filter_map(|p| p.value)
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}

fn citation_weight(paper: &PaperRecord, default_count: f64) -> f64 {
    // zero citations get the default weight too, so new papers stay visible
    match paper.citation_count {
        Some(c) if c != 0.0 => c,
        _ => default_count,
    }
}

fn build_point(
    unit_id: &str,
    topic: &Topic,
    category: &Category,
    value: f64,
    paper: &PaperRecord,
    config: &AggregationConfig,
) -> DataPoint {
    let authors = paper.authors.replace('|', ",");
    DataPoint {
        entity: DataPoint::entity_key(unit_id, topic, category),
        unit_id: unit_id.to_owned(),
        topic: topic.clone(),
        category: category.clone(),
        value,
        count: citation_weight(paper, config.default_count),
        label: authors.clone(),
        authors,
        abstract_text: paper.abstract_text.replace('|', ","),
        title: paper.title.replace('|', ","),
        url: paper.link.clone(),
        sourcetitle: paper.source_title.clone(),
        year: paper.year,
        opacity: if paper.source_group == config.primary_source_group {
            config.primary_opacity
        } else {
            config.secondary_opacity
        },
        color: String::new(),
        counter: 0,
        interactive: true,
        x: None,
        y: None,
        size: None,
        radius: None,
    }
}

/// The `limit` most frequent source titles, most frequent first. Equal
/// counts keep the order in which the titles were first seen.
pub fn top_journals(points: &[DataPoint], limit: usize) -> Vec<String> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for point in points {
        *counts.entry(point.sourcetitle.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(limit)
        .map(|(title, _)| title.to_owned())
        .collect()
}

/// Tag every point's `color` with its journal if that journal is among the
/// top ones, else with the catch-all label. Returns the legend: the top
/// journals followed by the catch-all label.
pub fn classify_journals(points: &mut [DataPoint], config: &AggregationConfig) -> Vec<String> {
    let top = top_journals(points, config.top_journals);
    for point in points.iter_mut() {
        point.color = if top.contains(&point.sourcetitle) {
            point.sourcetitle.clone()
        } else {
            config.other_journals_label.clone()
        };
    }
    let mut legend = top;
    legend.push(config.other_journals_label.clone());
    legend
}

/// Number points sharing (topic, category, value) 1, 2, 3, ... in slice
/// order.
pub fn assign_counters(points: &mut [DataPoint]) {
    let mut next: HashMap<(Topic, Category, OrderedFloat<f64>), u32> = HashMap::new();
    for point in points.iter_mut() {
        let key = (
            point.topic.clone(),
            point.category.clone(),
            OrderedFloat(point.value),
        );
        let counter = next.entry(key).or_insert(1);
        point.counter = *counter;
        *counter += 1;
    }
}

/// Aggregate flat points into chart nodes.
///
/// Groups whose paper is missing or whose scope values are all non-numeric
/// are dropped and logged. The result is sorted by source title (stable),
/// and counters follow that order.
pub fn aggregate(
    points: &[FlatPoint],
    papers: &[PaperRecord],
    config: &AggregationConfig,
) -> Aggregation {
    let mut paper_index: HashMap<&str, &PaperRecord> = HashMap::new();
    for paper in papers {
        paper_index.entry(paper.code.as_str()).or_insert(paper);
    }

    let mut data = Vec::new();
    for (unit_id, topics) in group_points(points) {
        let Some(paper) = paper_index.get(unit_id) else {
            warn!(unit_id, "no paper record for coded unit; dropping its points");
            continue;
        };

        for (topic, categories) in topics {
            for (category, group) in categories {
                let Some(value) = mean_value(&group) else {
                    warn!(
                        unit_id,
                        topic = %topic,
                        category = %category,
                        "no numeric scope value in group; dropping it"
                    );
                    continue;
                };
                data.push(build_point(unit_id, topic, category, value, paper, config));
            }
        }
    }

    let journals = classify_journals(&mut data, config);
    data.sort_by(|a, b| a.sourcetitle.cmp(&b.sourcetitle));
    assign_counters(&mut data);

    debug!(
        points = data.len(),
        journals = journals.len(),
        "aggregated coded rows"
    );

    Aggregation { data, journals }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(unit: &str, topic: Topic, category: Category, value: Option<f64>) -> FlatPoint {
        FlatPoint {
            unit_id: unit.to_owned(),
            topic,
            category,
            value,
        }
    }

    fn paper(code: &str, journal: &str) -> PaperRecord {
        PaperRecord {
            code: code.to_owned(),
            authors: "Doe J.|Roe R.".to_owned(),
            title: "Green|ish".to_owned(),
            source_title: journal.to_owned(),
            year: Some(2018),
            source_group: "SustainabMarketing".to_owned(),
            ..PaperRecord::default()
        }
    }

    #[test]
    fn test_mean_per_group() {
        let points = vec![
            flat("P1", Topic::Consumers, Category::Society, Some(2.0)),
            flat("P1", Topic::Consumers, Category::Society, Some(4.0)),
            flat("P1", Topic::Consumers, Category::Society, None),
            flat("P1", Topic::Businesses, Category::Society, Some(5.0)),
        ];
        let agg = aggregate(&points, &[paper("P1", "J")], &AggregationConfig::default());
        assert_eq!(2, agg.data.len());
        assert_eq!("P1-Consumers-Society", agg.data[0].entity);
        assert!((agg.data[0].value - 3.0).abs() < 1e-12);
        assert!((agg.data[1].value - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_denormalized_fields() {
        let points = vec![flat("P1", Topic::Consumers, Category::Society, Some(2.0))];
        let mut secondary = paper("P1", "J");
        secondary.source_group = "Sustainab".to_owned();
        secondary.citation_count = Some(0.0);
        let agg = aggregate(&points, &[secondary], &AggregationConfig::default());
        let p = &agg.data[0];
        assert_eq!("Doe J.,Roe R.", p.label);
        assert_eq!("Doe J.,Roe R.", p.authors);
        assert_eq!("Green,ish", p.title);
        assert!((p.opacity - 0.5).abs() < f64::EPSILON);
        assert!((p.count - 10.0).abs() < f64::EPSILON);
        assert!(p.interactive);
    }

    #[test]
    fn test_missing_paper_drops_group() {
        let points = vec![
            flat("P1", Topic::Consumers, Category::Society, Some(2.0)),
            flat("P2", Topic::Consumers, Category::Society, Some(2.0)),
        ];
        let agg = aggregate(&points, &[paper("P2", "J")], &AggregationConfig::default());
        assert_eq!(1, agg.data.len());
        assert_eq!("P2", agg.data[0].unit_id);
    }

    #[test]
    fn test_non_numeric_group_dropped() {
        let points = vec![flat("P1", Topic::Consumers, Category::Society, None)];
        let agg = aggregate(&points, &[paper("P1", "J")], &AggregationConfig::default());
        assert!(agg.data.is_empty());
        assert_eq!(vec!["Other journals".to_owned()], agg.journals);
    }

    #[test]
    fn test_empty_input() {
        let agg = aggregate(&[], &[paper("P1", "J")], &AggregationConfig::default());
        assert!(agg.data.is_empty());
        // same legend as when every group is dropped
        assert_eq!(vec!["Other journals".to_owned()], agg.journals);
    }

    #[test]
    fn test_top_journals_ties_keep_discovery_order() {
        let mut points = Vec::new();
        let mut papers = Vec::new();
        // B has 2 points, then A, C with 1 each; A is discovered first.
        for (i, journal) in ["A", "B", "B", "C"].iter().enumerate() {
            let code = format!("P{i}");
            points.push(flat(&code, Topic::Consumers, Category::Society, Some(3.0)));
            papers.push(paper(&code, journal));
        }
        let config = AggregationConfig {
            top_journals: 2,
            ..AggregationConfig::default()
        };
        let agg = aggregate(&points, &papers, &config);
        assert_eq!(vec!["B", "A", "Other journals"], agg.journals);
        let c = agg.data.iter().find(|p| p.sourcetitle == "C").unwrap();
        assert_eq!("Other journals", c.color);
        let a = agg.data.iter().find(|p| p.sourcetitle == "A").unwrap();
        assert_eq!("A", a.color);
    }

    #[test]
    fn test_counters_follow_source_title_order() {
        // Discovery order Z then A; sorted order puts A first.
        let points = vec![
            flat("P1", Topic::Consumers, Category::Environment, Some(3.0)),
            flat("P2", Topic::Consumers, Category::Environment, Some(3.0)),
            flat("P3", Topic::Consumers, Category::Environment, Some(4.0)),
        ];
        let papers = vec![paper("P1", "Zeta"), paper("P2", "Alpha"), paper("P3", "Beta")];
        let agg = aggregate(&points, &papers, &AggregationConfig::default());
        let titles: Vec<&str> = agg.data.iter().map(|p| p.sourcetitle.as_str()).collect();
        assert_eq!(vec!["Alpha", "Beta", "Zeta"], titles);
        assert_eq!(1, agg.data[0].counter); // P2, value 3
        assert_eq!(1, agg.data[1].counter); // P3, value 4
        assert_eq!(2, agg.data[2].counter); // P1, value 3
    }

    #[test]
    fn test_nested_grouping_order() {
        // P1 reappears after P2; its second topic still groups under P1.
        let points = vec![
            flat("P1", Topic::Consumers, Category::Society, Some(1.0)),
            flat("P2", Topic::Consumers, Category::Society, Some(1.0)),
            flat("P1", Topic::Institutions, Category::Society, Some(1.0)),
        ];
        let papers = vec![paper("P1", "J"), paper("P2", "J")];
        let agg = aggregate(&points, &papers, &AggregationConfig::default());
        let entities: Vec<&str> = agg.data.iter().map(|p| p.entity.as_str()).collect();
        assert_eq!(
            vec![
                "P1-Consumers-Society",
                "P1-Institutions-Society",
                "P2-Consumers-Society"
            ],
            entities
        );
        let counters: Vec<u32> = agg.data.iter().map(|p| p.counter).collect();
        assert_eq!(vec![1, 1, 2], counters);
    }
}
