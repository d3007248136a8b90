// Copyright 2026 The A-VO-S Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The radar chart pipeline: load → filter → map → relax → cache.
//!
//! [`RadarChart`] owns every piece of mutable state the chart has (the
//! aggregated data, the active filters, the interaction state, the layout
//! cache and the pending debounced triggers). Each recomputation reads that
//! state and replaces its outputs wholesale.

use std::time::Instant;

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::cache::{LayoutCache, LayoutSignature};
use crate::common::Result;
use crate::config::ChartConfig;
use crate::datamodel::{Aggregation, ChartInput, ChartOutput, DataPoint, NodePosition, Viewport};
use crate::filter::{self, Filters, Search};
use crate::geometry::ChartGeometry;
use crate::interaction::{Interaction, PointerEvent};
use crate::relax::{AnchoredPoint, relax};
use crate::scheduler::Debouncer;
use crate::{aggregate, flatten};

pub struct RadarChart {
    config: ChartConfig,
    aggregation: Aggregation,
    bibliography: Vec<String>,
    tooltip_content: IndexMap<String, Vec<String>>,
    filters: Filters,
    search: Search,
    interaction: Interaction,
    cache: LayoutCache,
    /// Points handed to the relaxer by the last layout, with positions.
    laid_out: Vec<DataPoint>,
    resize_debounce: Debouncer<Viewport>,
    pointer_debounce: Debouncer<PointerEvent>,
    search_debounce: Debouncer<Search>,
}

impl RadarChart {
    pub fn new(config: ChartConfig) -> Result<Self> {
        config.validate()?;
        let timing = config.timing.clone();
        Ok(Self {
            config,
            aggregation: Aggregation::default(),
            bibliography: Vec::new(),
            tooltip_content: IndexMap::new(),
            filters: Filters::default(),
            search: Search::default(),
            interaction: Interaction::new(),
            cache: LayoutCache::new(),
            laid_out: Vec::new(),
            resize_debounce: Debouncer::from_millis(timing.resize_debounce_ms),
            pointer_debounce: Debouncer::from_millis(timing.hover_debounce_ms),
            search_debounce: Debouncer::from_millis(timing.search_debounce_ms),
        })
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Replace the chart's data. Interaction state, cached layout and the
    /// previous layout are discarded.
    pub fn load(&mut self, input: ChartInput) {
        let points = flatten::flatten_rows(&input.scores);
        self.aggregation = aggregate::aggregate(&points, &input.papers, &self.config.aggregation);
        self.bibliography = input.bibliography;
        self.tooltip_content = input.tooltip_content;
        self.interaction.handle(PointerEvent::Reset);
        self.cache.clear();
        self.laid_out.clear();
        info!(
            rows = input.scores.len(),
            papers = input.papers.len(),
            points = self.aggregation.data.len(),
            "loaded chart data"
        );
    }

    pub fn aggregation(&self) -> &Aggregation {
        &self.aggregation
    }

    pub fn apply_filters(&mut self, filters: Filters, search: Search) {
        self.filters = filters;
        self.search = search;
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn search(&self) -> &Search {
        &self.search
    }

    /// Aggregated points with `opacity` and `interactive` reflecting the
    /// active filters.
    pub fn filtered(&self) -> Vec<DataPoint> {
        filter::apply_filters(
            &self.aggregation.data,
            &self.filters,
            &self.search,
            &self.config.filter,
        )
    }

    pub fn year_range(&self) -> [i32; 2] {
        filter::year_range(&self.aggregation.data, self.config.filter.default_year_range)
    }

    pub fn journal_options(&self) -> Vec<String> {
        filter::journal_options(&self.aggregation.data)
    }

    pub fn search_options(&self) -> Vec<String> {
        filter::search_options(&self.aggregation.data, &self.filters)
    }

    pub fn cache(&self) -> &LayoutCache {
        &self.cache
    }

    pub fn geometry(&self, viewport: Viewport) -> Result<ChartGeometry> {
        ChartGeometry::new(viewport, &self.config)
    }

    /// Place `points` for `geometry`. Points that cannot be mapped are left
    /// out; the returned points and positions are index-aligned.
    fn place(
        &mut self,
        points: Vec<DataPoint>,
        geometry: &ChartGeometry,
    ) -> (Vec<DataPoint>, Vec<NodePosition>) {
        let mut kept = Vec::with_capacity(points.len());
        let mut anchored = Vec::with_capacity(points.len());
        for mut point in points {
            match geometry.anchor(&point) {
                Ok(anchor) => {
                    let size = geometry.node_size(point.count);
                    point.radius = Some(anchor.radius);
                    anchored.push(AnchoredPoint {
                        anchor: anchor.position,
                        target_radius: anchor.radius,
                        size,
                    });
                    kept.push(point);
                }
                Err(err) => {
                    warn!(entity = %point.entity, %err, "leaving point out of the layout");
                }
            }
        }

        let signature = LayoutSignature::new(&kept, geometry.viewport());
        let simulation = &self.config.simulation;
        let positions = self
            .cache
            .get_or_compute(signature, || relax(&anchored, simulation))
            .to_vec();

        for (point, pos) in kept.iter_mut().zip(&positions) {
            point.x = Some(pos.x);
            point.y = Some(pos.y);
            point.size = Some(pos.size);
        }
        (kept, positions)
    }

    /// Lay out the filtered data for `viewport`.
    pub fn layout(&mut self, viewport: Viewport) -> Result<ChartOutput> {
        let geometry = self.geometry(viewport)?;
        let points = self.filtered();
        let (data, _) = self.place(points, &geometry);
        self.laid_out = data.clone();
        Ok(ChartOutput {
            data,
            journals: self.aggregation.journals.clone(),
            bibliography: self.bibliography.clone(),
            tooltip_content: self.tooltip_content.clone(),
        })
    }

    /// Re-place the last laid-out points for a new viewport. The result is
    /// index-aligned with the `data` of the last [`RadarChart::layout`].
    pub fn resize(&mut self, viewport: Viewport) -> Result<Vec<NodePosition>> {
        let geometry = self.geometry(viewport)?;
        let points = std::mem::take(&mut self.laid_out);
        let (data, positions) = self.place(points, &geometry);
        self.laid_out = data;
        Ok(positions)
    }

    /// Queue a viewport change; it takes effect in [`RadarChart::poll_resize`]
    /// once resizing has settled.
    pub fn schedule_resize(&mut self, now: Instant, viewport: Viewport) {
        self.resize_debounce.push(now, viewport);
    }

    pub fn poll_resize(&mut self, now: Instant) -> Result<Option<Vec<NodePosition>>> {
        match self.resize_debounce.poll(now) {
            Some(viewport) => self.resize(viewport).map(Some),
            None => Ok(None),
        }
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Feed a pointer event. Clicks and resets apply at once and drop any
    /// pending hover; hover and pointer-out are debounced. Returns whether
    /// the interaction state changed.
    pub fn pointer(&mut self, now: Instant, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Over(_) | PointerEvent::Out => {
                self.pointer_debounce.push(now, event);
                false
            }
            PointerEvent::Click(_) | PointerEvent::Reset => {
                self.pointer_debounce.cancel();
                self.interaction.handle(event)
            }
        }
    }

    pub fn poll_pointer(&mut self, now: Instant) -> bool {
        match self.pointer_debounce.poll(now) {
            Some(event) => self.interaction.handle(event),
            None => false,
        }
    }

    /// Queue a search term; it replaces the active search once typing has
    /// settled.
    pub fn schedule_search(&mut self, now: Instant, search: Search) {
        self.search_debounce.push(now, search);
    }

    pub fn poll_search(&mut self, now: Instant) -> bool {
        match self.search_debounce.poll(now) {
            Some(search) => {
                let changed = search != self.search;
                self.search = search;
                changed
            }
            None => false,
        }
    }

    /// Opacity of each last laid-out point under the current hover or
    /// selection.
    pub fn highlight(&self) -> Vec<f64> {
        self.interaction
            .highlight(&self.laid_out, &self.search, &self.config.filter)
    }

    /// Drop everything pending and return to the idle state.
    pub fn teardown(&mut self) {
        self.resize_debounce.cancel();
        self.pointer_debounce.cancel();
        self.search_debounce.cancel();
        self.interaction.handle(PointerEvent::Reset);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::interaction::{InteractionState, PointerTarget};

    fn input() -> ChartInput {
        serde_json::from_value(json!({
            "papers": [
                {"Code": "P1", "Authors": "Doe J.", "Source title": "J1", "Year": 2018,
                 "sourceFile": "SustainabMarketing", "citationCount": 40},
                {"Code": "P2", "Authors": "Roe R.", "Source title": "J2", "Year": 2012,
                 "sourceFile": "Sustainab"}
            ],
            "scores": [
                {"Code": "P1", "SP": 3, "Cons_Env": 1, "Busi_Soc": 1},
                {"Code": "P2", "SP": 2, "Inst_Gro": 1, "Gov_Eco": 1}
            ],
            "bibliography": ["Doe J. (2018)"],
            "tooltipContent": {"Consumers": ["people"]}
        }))
        .unwrap()
    }

    fn viewport() -> Viewport {
        Viewport::new(1600.0, 1200.0).unwrap()
    }

    #[test]
    fn test_layout_populates_points() {
        let mut chart = RadarChart::new(ChartConfig::default()).unwrap();
        chart.load(input());
        let out = chart.layout(viewport()).unwrap();
        assert_eq!(3, out.data.len());
        for p in &out.data {
            assert!(p.x.is_some() && p.y.is_some() && p.size.is_some() && p.radius.is_some());
        }
        assert_eq!(vec!["Doe J. (2018)".to_owned()], out.bibliography);
        assert_eq!(vec!["J1", "J2", "Other journals"], out.journals);
        assert!(out.tooltip_content.contains_key("Consumers"));
    }

    #[test]
    fn test_layout_uses_cache() {
        let mut chart = RadarChart::new(ChartConfig::default()).unwrap();
        chart.load(input());
        let first = chart.layout(viewport()).unwrap();
        chart.apply_filters(
            Filters {
                years: Some([2015, 2020]),
                journals: Vec::new(),
            },
            Search::default(),
        );
        let second = chart.layout(viewport()).unwrap();
        assert_eq!(1, chart.cache.hits());
        assert_eq!(first.data[0].x, second.data[0].x);
        let interactive: Vec<bool> = second.data.iter().map(|p| p.interactive).collect();
        assert_eq!(vec![true, true, false], interactive);
    }

    #[test]
    fn test_resize_is_aligned() {
        let mut chart = RadarChart::new(ChartConfig::default()).unwrap();
        chart.load(input());
        let out = chart.layout(viewport()).unwrap();
        let resized = chart.resize(Viewport::new(1000.0, 900.0).unwrap()).unwrap();
        assert_eq!(out.data.len(), resized.len());
        assert_eq!(2, chart.cache.misses());
    }

    #[test]
    fn test_debounced_resize() {
        let mut chart = RadarChart::new(ChartConfig::default()).unwrap();
        chart.load(input());
        chart.layout(viewport()).unwrap();

        let t0 = Instant::now();
        chart.schedule_resize(t0, Viewport::new(900.0, 900.0).unwrap());
        chart.schedule_resize(t0 + Duration::from_millis(100), Viewport::new(1000.0, 900.0).unwrap());
        assert_eq!(None, chart.poll_resize(t0 + Duration::from_millis(300)).unwrap());
        let positions = chart
            .poll_resize(t0 + Duration::from_millis(350))
            .unwrap()
            .unwrap();
        assert_eq!(3, positions.len());
        // one layout plus one settled resize
        assert_eq!(2, chart.cache.misses());
    }

    #[test]
    fn test_pointer_debounce_and_click() {
        let mut chart = RadarChart::new(ChartConfig::default()).unwrap();
        chart.load(input());
        let out = chart.layout(viewport()).unwrap();
        let target = PointerTarget::from(&out.data[0]);

        let t0 = Instant::now();
        assert!(!chart.pointer(t0, PointerEvent::Over(target.clone())));
        assert!(!chart.poll_pointer(t0 + Duration::from_millis(10)));
        assert!(chart.poll_pointer(t0 + Duration::from_millis(50)));
        assert_eq!(Some(target.entity.as_str()), chart.interaction().focused());

        chart.pointer(t0, PointerEvent::Out);
        assert!(chart.pointer(t0, PointerEvent::Click(target.clone())));
        // the pending pointer-out was dropped by the click
        assert!(!chart.poll_pointer(t0 + Duration::from_secs(1)));
        assert_eq!(
            &InteractionState::Selected(target.entity.clone()),
            chart.interaction().state()
        );

        let lit = chart.highlight();
        assert_eq!(1.0, lit[0]);

        chart.teardown();
        assert_eq!(&InteractionState::Idle, chart.interaction().state());
    }

    #[test]
    fn test_debounced_search() {
        let mut chart = RadarChart::new(ChartConfig::default()).unwrap();
        chart.load(input());
        let t0 = Instant::now();
        chart.schedule_search(t0, Search::new("Doe J."));
        assert!(!chart.poll_search(t0 + Duration::from_millis(299)));
        assert!(chart.poll_search(t0 + Duration::from_millis(300)));
        assert_eq!(vec!["Doe J.", "Roe R."], chart.search_options());
        let filtered = chart.filtered();
        assert!(filtered.iter().all(|p| p.interactive == (p.label == "Doe J.")));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ChartConfig::default();
        config.geometry.scope_domain = [5.0, 1.0];
        assert!(RadarChart::new(config).is_err());
    }
}
