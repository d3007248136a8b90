// Copyright 2026 The A-VO-S Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Chart geometry: topic sectors, category bands and the anchor each point
//! is drawn towards.
//!
//! Angles are measured clockwise from 12 o'clock, so a point at angle `a`
//! and radius `r` sits at `(r sin a, -r cos a)` relative to the chart
//! center. All scales are built per viewport by [`ChartGeometry::new`] and
//! never mutated afterwards.

use std::f64::consts::TAU;
use std::ops::{Add, Sub};

use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::config::{ChartConfig, DomainPolicy, GeometryConfig, SizeScaleConfig};
use crate::datamodel::{Category, DataPoint, Topic, Viewport};
use crate::layout_err;

// Bounds on the anchor inset as fractions of the band width.
const MIN_INSET_FRACTION: f64 = 0.05;
const MAX_INSET_FRACTION: f64 = 0.25;

/// 2D position/vector relative to the chart center.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl std::fmt::Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Position at `radius` along the clockwise-from-top angle `angle`.
    pub fn from_polar(angle: f64, radius: f64) -> Self {
        Self {
            x: radius * angle.sin(),
            y: -radius * angle.cos(),
        }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Clockwise angle from 12 o'clock in [0, 2*pi).
    pub fn angle(self) -> f64 {
        let a = self.x.atan2(-self.y);
        if a < 0.0 { a + TAU } else { a }
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }
}

impl Add for Position {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Position {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Linear map from `domain` onto `range`. Not clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl LinearScale {
    pub fn apply(&self, v: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// Square-root scale from citation count to node radius, clamped to its
/// range.
#[derive(Clone, Debug, PartialEq)]
pub struct SizeScale {
    domain: [f64; 2],
    range: [f64; 2],
}

impl SizeScale {
    pub fn new(config: &SizeScaleConfig) -> Self {
        Self {
            domain: config.domain,
            range: config.range,
        }
    }

    pub fn apply(&self, count: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let t = (count.max(0.0).sqrt() - d0.sqrt()) / (d1.sqrt() - d0.sqrt());
        r0 + t.clamp(0.0, 1.0) * (r1 - r0)
    }
}

/// One concentric ring of the chart.
#[derive(Clone, Debug, PartialEq)]
pub struct Band {
    pub category: Category,
    pub start: f64,
    pub end: f64,
}

impl Band {
    pub fn mid(&self) -> f64 {
        self.end - (self.end - self.start) / 2.0
    }

    pub fn contains(&self, radius: f64) -> bool {
        radius >= self.start && radius <= self.end
    }
}

/// Where a point wants to be: its anchor and the radius the radial force
/// pulls it towards (its band's outer edge).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    pub position: Position,
    pub radius: f64,
}

/// Axis label position for one scope level in one sector.
#[derive(Clone, Debug, PartialEq)]
pub struct ScopeLabel {
    pub topic: Topic,
    pub value: f64,
    pub position: Position,
}

/// Scales for one viewport.
#[derive(Clone, Debug)]
pub struct ChartGeometry {
    config: GeometryConfig,
    policy: DomainPolicy,
    viewport: Viewport,
    radius: f64,
    bands: Vec<Band>,
    size_scale: SizeScale,
}

impl ChartGeometry {
    pub fn new(viewport: Viewport, config: &ChartConfig) -> Result<Self> {
        let geometry = &config.geometry;
        let radius = (viewport.width() / 2.0).min(viewport.height() / 2.0) - geometry.chart_margin;
        if !(radius > 0.0) {
            return Err(Error::new(
                ErrorKind::Layout,
                ErrorCode::InvalidViewport,
                Some(format!(
                    "{}x{} leaves no room for the chart",
                    viewport.width(),
                    viewport.height()
                )),
            ));
        }

        let mut start = 0.0;
        let bands = Category::BAND_ORDER
            .iter()
            .zip(geometry.band_fractions)
            .map(|(category, fraction)| {
                let end = radius * fraction;
                let band = Band {
                    category: category.clone(),
                    start,
                    end,
                };
                start = end;
                band
            })
            .collect();

        Ok(Self {
            config: geometry.clone(),
            policy: config.out_of_domain,
            viewport,
            radius,
            bands,
            size_scale: SizeScale::new(&config.node_size),
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Bands from the center outwards.
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn band(&self, category: &Category) -> Result<&Band> {
        match category.index() {
            Some(i) => Ok(&self.bands[i]),
            None => layout_err!(UnknownCategory, category.to_string()),
        }
    }

    pub fn node_size(&self, count: f64) -> f64 {
        self.size_scale.apply(count)
    }

    fn topic_index(topic: &Topic) -> Result<usize> {
        match topic.index() {
            Some(i) => Ok(i),
            None => layout_err!(UnknownTopic, topic.to_string()),
        }
    }

    fn is_new_paper(&self, color: &str) -> bool {
        color == self.config.new_paper_color
    }

    /// Angular margin at each edge of the topic's sector.
    fn sector_buffer(&self, topic: &Topic, color: &str) -> f64 {
        let g = &self.config;
        if *topic == Topic::Consumers && !self.is_new_paper(color) {
            let multiplier = if self.viewport.width() < g.narrow_width {
                g.consumers_buffer_narrow
            } else {
                g.consumers_buffer_wide
            };
            g.sector_buffer * multiplier
        } else {
            g.sector_buffer
        }
    }

    /// Scale from scope value to angle inside the topic's sector. The last
    /// sector runs its domain backwards so neighbouring sectors mirror.
    pub fn angle_scale(&self, topic: &Topic, color: &str) -> Result<LinearScale> {
        let index = Self::topic_index(topic)?;
        let sectors = Topic::CHART_ORDER.len();
        let slice = TAU / sectors as f64;
        let start = slice * index as f64;
        let buffer = self.sector_buffer(topic, color);

        let [lo, hi] = self.config.scope_domain;
        let domain = if index == sectors - 1 { [hi, lo] } else { [lo, hi] };

        Ok(LinearScale {
            domain,
            range: [start + buffer, start + slice - buffer],
        })
    }

    /// The value the angle scale will see, after the out-of-domain policy.
    pub fn checked_value(&self, value: f64) -> Result<f64> {
        let [lo, hi] = self.config.scope_domain;
        if value.is_nan() {
            return layout_err!(ValueOutOfDomain, "NaN".to_owned());
        }
        if (lo..=hi).contains(&value) {
            return Ok(value);
        }
        match self.policy {
            DomainPolicy::Clamp => Ok(value.clamp(lo, hi)),
            DomainPolicy::Reject => {
                layout_err!(ValueOutOfDomain, format!("{value} outside [{lo}, {hi}]"))
            }
        }
    }

    /// Radial distance of the anchor: the nudged band midpoint, pushed
    /// outwards by the counter so equal values fan out instead of stacking.
    ///
    /// The nudges are fixed pixel offsets while bands scale with the
    /// viewport, so the result is kept inside the band, inset by the node's
    /// size. The counter is added after that so fanned-out points still get
    /// distinct radii when the nudged midpoint falls outside the band.
    pub fn anchor_radius(&self, point: &DataPoint) -> Result<f64> {
        let band = self.band(&point.category)?;
        let mid = band.mid();
        if self.is_new_paper(&point.color) {
            return Ok(mid);
        }

        let g = &self.config;
        let index = point.category.index().unwrap_or_default();
        let mut offset = g.band_nudge[index];
        if index == 0 && point.topic == Topic::Consumers {
            offset += g.consumers_inner_nudge;
        }

        let (lo, hi) = self.anchor_span(band, point.count);
        let base = (mid + offset).clamp(lo, hi);
        Ok((base + point.counter as f64 * g.counter_step).min(hi))
    }

    /// Radii an anchor may take inside `band`. Never empty and never
    /// touching the center, so an anchor cannot flip into the opposite
    /// sector.
    fn anchor_span(&self, band: &Band, count: f64) -> (f64, f64) {
        let width = band.end - band.start;
        let inset = (self.config.anchor_inset * self.node_size(count))
            .clamp(width * MIN_INSET_FRACTION, width * MAX_INSET_FRACTION);
        (band.start + inset, band.end - inset)
    }

    /// Anchor for a point. Fails for unknown topics or categories and, under
    /// [`DomainPolicy::Reject`], for values outside the scope domain.
    pub fn anchor(&self, point: &DataPoint) -> Result<Anchor> {
        let value = self.checked_value(point.value)?;
        let angle = self.angle_scale(&point.topic, &point.color)?.apply(value);
        let radius = self.anchor_radius(point)?;
        Ok(Anchor {
            position: Position::from_polar(angle, radius),
            radius: self.band(&point.category)?.end,
        })
    }

    /// One label per topic and whole scope level, on the innermost band.
    pub fn scope_labels(&self) -> Vec<ScopeLabel> {
        let [lo, hi] = self.config.scope_domain;
        let radius = self.bands[0].mid();
        let levels: Vec<f64> = (lo.ceil() as i64..=hi.floor() as i64)
            .map(|v| v as f64)
            .collect();

        let mut labels = Vec::with_capacity(Topic::CHART_ORDER.len() * levels.len());
        for topic in Topic::CHART_ORDER {
            let Ok(scale) = self.angle_scale(&topic, "") else {
                continue;
            };
            for &value in &levels {
                labels.push(ScopeLabel {
                    topic: topic.clone(),
                    value,
                    position: Position::from_polar(scale.apply(value), radius),
                });
            }
        }
        labels
    }
}
