// Copyright 2026 The A-VO-S Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::config_err;

/// Upper bound on simulation ticks a configuration may ask for.
pub const MAX_TICKS: usize = 10_000;

/// Chart configuration. Every field has a default matching the published
/// chart, so a JSON override only needs to name what it changes.
///
/// Distances are in pixels, angles in radians.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub aggregation: AggregationConfig,
    pub geometry: GeometryConfig,
    pub node_size: SizeScaleConfig,
    pub simulation: SimulationConfig,
    pub filter: FilterConfig,
    pub timing: TimingConfig,
    /// What to do with a point whose scope value falls outside
    /// `geometry.scope_domain`.
    pub out_of_domain: DomainPolicy,
}

/// Handling of scope values outside the angular domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainPolicy {
    /// Leave the point out of the layout.
    #[default]
    Reject,
    /// Pin the value to the nearest end of the domain.
    Clamp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Number of most frequent journals that get their own color.
    pub top_journals: usize,
    /// Color class for every other journal.
    pub other_journals_label: String,
    /// Weight used when a paper has no usable citation count.
    pub default_count: f64,
    /// Source group drawn at full opacity; all others are dimmed.
    pub primary_source_group: String,
    pub primary_opacity: f64,
    pub secondary_opacity: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            top_journals: 8,
            other_journals_label: "Other journals".to_owned(),
            default_count: 10.0,
            primary_source_group: "SustainabMarketing".to_owned(),
            primary_opacity: 1.0,
            secondary_opacity: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Space kept free between the outer band and the viewport edge.
    pub chart_margin: f64,
    /// Outer edge of each category band as a fraction of the chart radius,
    /// innermost band first.
    pub band_fractions: [f64; 3],
    /// Angular margin kept free at both edges of every topic sector.
    pub sector_buffer: f64,
    /// Buffer multiplier for the Consumers sector below `narrow_width`.
    pub consumers_buffer_narrow: f64,
    /// Buffer multiplier for the Consumers sector at or above `narrow_width`.
    pub consumers_buffer_wide: f64,
    pub narrow_width: f64,
    /// Scope scores mapped across a sector's usable angle.
    pub scope_domain: [f64; 2],
    /// Color class for uncoded papers: symmetric buffer, no counter nudge.
    pub new_paper_color: String,
    /// Radial offset added to the band midpoint, per band.
    pub band_nudge: [f64; 3],
    /// Extra offset for Consumers points in the innermost band.
    pub consumers_inner_nudge: f64,
    /// Pixels of radial offset per counter step.
    pub counter_step: f64,
    /// Gap between an anchor and its band edges, in node radii.
    pub anchor_inset: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            chart_margin: 60.0,
            band_fractions: [0.55, 0.8, 1.0],
            sector_buffer: 0.1,
            consumers_buffer_narrow: 1.8,
            consumers_buffer_wide: 1.15,
            narrow_width: 1800.0,
            scope_domain: [1.0, 5.0],
            new_paper_color: "New paper".to_owned(),
            band_nudge: [0.0, -45.0, -45.0],
            consumers_inner_nudge: -10.0,
            counter_step: 1.0,
            anchor_inset: 1.0,
        }
    }
}

/// Square-root scale from citation count to node radius.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeScaleConfig {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl Default for SizeScaleConfig {
    fn default() -> Self {
        Self {
            domain: [0.0, 2000.0],
            range: [4.0, 16.0],
        }
    }
}

/// Force simulation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Many-body strength; negative repels.
    pub charge_strength: f64,
    /// Pairs closer than this are treated as this far apart by the
    /// many-body force.
    pub distance_min: f64,
    /// Spring constant pulling each node towards its anchor on each axis.
    pub axis_strength: f64,
    /// Spring constant pulling each node towards its band radius.
    pub radial_strength: f64,
    /// Collision radius as a multiple of the node size.
    pub collide_padding: f64,
    pub collide_strength: f64,
    pub collide_iterations: usize,
    pub alpha: f64,
    pub alpha_min: f64,
    /// Per-tick decay of alpha towards `alpha_target`.
    pub alpha_decay: f64,
    pub alpha_target: f64,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f64,
    /// Seed for the jiggle that separates coincident nodes.
    pub jiggle_seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let alpha_min: f64 = 0.001;
        Self {
            charge_strength: -30.0,
            distance_min: 1.0,
            axis_strength: 0.9,
            radial_strength: 0.1,
            collide_padding: 1.1,
            collide_strength: 1.0,
            collide_iterations: 1,
            alpha: 1.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.4,
            jiggle_seed: 42,
        }
    }
}

impl SimulationConfig {
    /// Number of ticks for alpha to decay from 1 to `alpha_min`.
    pub fn iterations(&self) -> usize {
        let ticks = self.alpha_min.ln() / (1.0 - self.alpha_decay).ln();
        // powf/ln round-trips land a hair above whole numbers
        (ticks - 1e-9).ceil().max(0.0) as usize
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Opacity of points that fail the active filters.
    pub filtered_opacity: f64,
    /// Opacity of points outside the highlight set.
    pub dimmed_opacity: f64,
    /// Year range reported when there is no data.
    pub default_year_range: [i32; 2],
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            filtered_opacity: 0.1,
            dimmed_opacity: 0.1,
            default_year_range: [2002, 2024],
        }
    }
}

/// Quiet periods for the coalescing schedulers, in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub resize_debounce_ms: u64,
    pub hover_debounce_ms: u64,
    pub search_debounce_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            resize_debounce_ms: 250,
            hover_debounce_ms: 50,
            search_debounce_ms: 300,
        }
    }
}

impl ChartConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ChartConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let g = &self.geometry;
        let mut prev = 0.0;
        for f in g.band_fractions {
            if !(f > prev && f <= 1.0) {
                return config_err!(
                    BadConfig,
                    format!("band fractions must increase within (0, 1]: {:?}", g.band_fractions)
                );
            }
            prev = f;
        }

        let slice = std::f64::consts::TAU / 3.0;
        let widest = g
            .sector_buffer
            * 1f64
                .max(g.consumers_buffer_narrow)
                .max(g.consumers_buffer_wide);
        if g.sector_buffer < 0.0 || 2.0 * widest >= slice {
            return config_err!(
                BadConfig,
                format!("sector buffer {} leaves no usable angle", g.sector_buffer)
            );
        }

        if !(g.anchor_inset >= 0.0) {
            return config_err!(
                BadConfig,
                format!("anchor_inset must not be negative, got {}", g.anchor_inset)
            );
        }

        if g.scope_domain[0] >= g.scope_domain[1] {
            return config_err!(
                BadConfig,
                format!("empty scope domain {:?}", g.scope_domain)
            );
        }

        let s = &self.node_size;
        if s.domain[0] < 0.0 || s.domain[0] >= s.domain[1] || s.range[0] < 0.0 {
            return config_err!(
                BadConfig,
                format!("bad node size scale {:?} -> {:?}", s.domain, s.range)
            );
        }

        let sim = &self.simulation;
        if !(sim.alpha_min > 0.0 && sim.alpha_min < 1.0) {
            return config_err!(
                BadConfig,
                format!("alpha_min must be in (0, 1), got {}", sim.alpha_min)
            );
        }
        if !(sim.alpha_decay > 0.0 && sim.alpha_decay < 1.0) {
            return config_err!(
                BadConfig,
                format!("alpha_decay must be in (0, 1), got {}", sim.alpha_decay)
            );
        }
        if sim.iterations() > MAX_TICKS {
            return config_err!(
                BadConfig,
                format!(
                    "alpha_decay {} needs {} ticks, more than {MAX_TICKS}",
                    sim.alpha_decay,
                    sim.iterations()
                )
            );
        }
        if !(0.0..=1.0).contains(&sim.velocity_decay) {
            return config_err!(
                BadConfig,
                format!("velocity_decay must be in [0, 1], got {}", sim.velocity_decay)
            );
        }
        if sim.distance_min <= 0.0 || sim.collide_padding <= 0.0 {
            return config_err!(
                BadConfig,
                "distance_min and collide_padding must be positive".to_owned()
            );
        }

        Ok(())
    }
}
