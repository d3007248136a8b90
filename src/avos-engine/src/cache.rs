// Copyright 2026 The A-VO-S Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use tracing::debug;

use crate::datamodel::{Category, DataPoint, NodePosition, Viewport};

/// What a relaxed layout depends on: each node's identity, band and weight,
/// in order, plus the viewport. Floats are compared bitwise.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayoutSignature {
    nodes: Vec<(String, Category, u64)>,
    width: u64,
    height: u64,
}

impl LayoutSignature {
    pub fn new(points: &[DataPoint], viewport: Viewport) -> Self {
        Self {
            nodes: points
                .iter()
                .map(|p| (p.entity.clone(), p.category.clone(), p.count.to_bits()))
                .collect(),
            width: viewport.width().to_bits(),
            height: viewport.height().to_bits(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Single-slot memo of the most recent relaxed layout.
#[derive(Debug, Default)]
pub struct LayoutCache {
    entry: Option<(LayoutSignature, Vec<NodePosition>)>,
    hits: u64,
    misses: u64,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, signature: &LayoutSignature) -> Option<&[NodePosition]> {
        match &self.entry {
            Some((cached, positions)) if cached == signature => Some(positions),
            _ => None,
        }
    }

    /// The cached layout if `signature` matches the stored one, otherwise the
    /// result of `compute`, which replaces the stored entry.
    pub fn get_or_compute<F>(&mut self, signature: LayoutSignature, compute: F) -> &[NodePosition]
    where
        F: FnOnce() -> Vec<NodePosition>,
    {
        let hit = matches!(&self.entry, Some((cached, _)) if *cached == signature);
        if hit {
            self.hits += 1;
            debug!(nodes = signature.len(), "layout cache hit");
        } else {
            self.misses += 1;
            let positions = compute();
            self.entry = Some((signature, positions));
        }

        match &self.entry {
            Some((_, positions)) => positions,
            None => &[],
        }
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
