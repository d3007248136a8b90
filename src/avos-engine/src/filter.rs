// Copyright 2026 The A-VO-S Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Filter and search state applied on top of aggregated points. Filtering
//! never removes points; it only changes their `opacity` and `interactive`
//! flags, so layouts stay stable while the user narrows the view.

use std::collections::BTreeSet;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::FilterConfig;
use crate::datamodel::DataPoint;

/// Year range and journal selection. An empty journal list means every
/// journal passes; `None` years means every year passes.
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub years: Option<[i32; 2]>,
    #[serde(default)]
    pub journals: Vec<String>,
}

/// Free-text search; an empty value means no search is active.
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Search {
    #[serde(default)]
    pub value: String,
}

impl Search {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.value.is_empty()
    }
}

impl Filters {
    /// Year and journal test. A point without a year fails any year range.
    pub fn passes(&self, point: &DataPoint) -> bool {
        let year_ok = match (self.years, point.year) {
            (None, _) => true,
            (Some([min, max]), Some(year)) => (min..=max).contains(&year),
            (Some(_), None) => false,
        };
        year_ok && (self.journals.is_empty() || self.journals.contains(&point.sourcetitle))
    }

    /// Year, journal and search test together.
    pub fn matches(&self, point: &DataPoint, search: &Search) -> bool {
        self.passes(point) && (!search.is_active() || point.label == search.value)
    }
}

/// Copy of `points` with `interactive` set to whether each point matches,
/// and non-matching points faded to `filtered_opacity`. Matching points keep
/// their base opacity.
pub fn apply_filters(
    points: &[DataPoint],
    filters: &Filters,
    search: &Search,
    config: &FilterConfig,
) -> Vec<DataPoint> {
    points
        .iter()
        .map(|point| {
            let matched = filters.matches(point, search);
            DataPoint {
                opacity: if matched {
                    point.opacity
                } else {
                    config.filtered_opacity
                },
                interactive: matched,
                ..point.clone()
            }
        })
        .collect()
}

/// `[min, max]` year over points that have one, or `default` when none do.
pub fn year_range(points: &[DataPoint], default: [i32; 2]) -> [i32; 2] {
    let mut years = points.iter().filter_map(|p| p.year);
    let Some(first) = years.next() else {
        return default;
    };
    years.fold([first, first], |[lo, hi], y| [lo.min(y), hi.max(y)])
}

/// Distinct source titles, ascending.
pub fn journal_options(points: &[DataPoint]) -> Vec<String> {
    points
        .iter()
        .map(|p| p.sourcetitle.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct labels of the points passing the year and journal filters,
/// ascending.
pub fn search_options(points: &[DataPoint], filters: &Filters) -> Vec<String> {
    points
        .iter()
        .filter(|p| filters.passes(p))
        .map(|p| p.label.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
