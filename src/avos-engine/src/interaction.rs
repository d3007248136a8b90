// Copyright 2026 The A-VO-S Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Hover and selection handling for chart nodes.

use crate::config::FilterConfig;
use crate::datamodel::DataPoint;
use crate::filter::Search;

/// The node a pointer event refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointerTarget {
    pub entity: String,
    pub interactive: bool,
}

impl From<&DataPoint> for PointerTarget {
    fn from(point: &DataPoint) -> Self {
        Self {
            entity: point.entity.clone(),
            interactive: point.interactive,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PointerEvent {
    Over(PointerTarget),
    Out,
    Click(PointerTarget),
    /// Teardown or new data.
    Reset,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum InteractionState {
    #[default]
    Idle,
    Hovered(String),
    Selected(String),
}

#[derive(Clone, Debug, Default)]
pub struct Interaction {
    state: InteractionState,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Apply an event. Returns whether the state changed.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        use InteractionState::*;

        let next = match (&self.state, event) {
            (_, PointerEvent::Reset) => Idle,
            (_, PointerEvent::Over(t) | PointerEvent::Click(t)) if !t.interactive => {
                return false;
            }
            (Selected(current), PointerEvent::Click(t)) if *current == t.entity => Idle,
            (_, PointerEvent::Click(t)) => Selected(t.entity),
            (Selected(_), PointerEvent::Over(_)) => return false,
            (_, PointerEvent::Over(t)) => Hovered(t.entity),
            (Hovered(_), PointerEvent::Out) => Idle,
            (_, PointerEvent::Out) => return false,
        };

        let changed = next != self.state;
        self.state = next;
        changed
    }

    /// The hovered or selected entity.
    pub fn focused(&self) -> Option<&str> {
        match &self.state {
            InteractionState::Idle => None,
            InteractionState::Hovered(e) | InteractionState::Selected(e) => Some(e),
        }
    }

    /// Outside controls (filters, search) are locked while a node is
    /// selected.
    pub fn controls_disabled(&self) -> bool {
        matches!(self.state, InteractionState::Selected(_))
    }

    /// Opacity for each point given the current focus. With a focused node,
    /// the highlight set is that node alone when a search is active and
    /// every node of the same paper otherwise; highlighted nodes are fully
    /// opaque and the rest dimmed. Without focus, each point keeps its own
    /// opacity.
    pub fn highlight(&self, points: &[DataPoint], search: &Search, config: &FilterConfig) -> Vec<f64> {
        let focus = self
            .focused()
            .and_then(|entity| points.iter().find(|p| p.entity == entity));
        let Some(focus) = focus else {
            return points.iter().map(|p| p.opacity).collect();
        };

        points
            .iter()
            .map(|p| {
                let lit = if search.is_active() {
                    p.entity == focus.entity
                } else {
                    p.unit_id == focus.unit_id
                };
                if lit { 1.0 } else { config.dimmed_opacity }
            })
            .collect()
    }
}
