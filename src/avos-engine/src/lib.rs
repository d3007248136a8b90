// Copyright 2026 The A-VO-S Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

#![forbid(unsafe_code)]

pub mod aggregate;
pub mod cache;
pub mod chart;
pub mod common;
pub mod config;
pub mod datamodel;
pub mod filter;
pub mod flatten;
pub mod geometry;
pub mod interaction;
pub mod relax;
pub mod scheduler;

#[cfg(test)]
mod aggregate_proptest;

pub use self::aggregate::aggregate;
pub use self::cache::{LayoutCache, LayoutSignature};
pub use self::chart::RadarChart;
pub use self::common::{Error, ErrorCode, ErrorKind, Result};
pub use self::config::{ChartConfig, DomainPolicy};
pub use self::datamodel::{
    Aggregation, Category, ChartInput, ChartOutput, CodedRow, DataPoint, FlatPoint, NodePosition,
    PaperRecord, Topic, Viewport,
};
pub use self::filter::{Filters, Search};
pub use self::flatten::{flatten_row, flatten_rows, normalize_survey_row};
pub use self::geometry::{ChartGeometry, Position};
pub use self::interaction::{Interaction, InteractionState, PointerEvent, PointerTarget};
pub use self::relax::{AnchoredPoint, relax};
pub use self::scheduler::Debouncer;
