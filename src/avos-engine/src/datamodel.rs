// Copyright 2026 The A-VO-S Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Boundary and in-memory types for the radar chart.
//!
//! Input types mirror the JSON the ingestion service produces (sheet column
//! names such as `Code`, `Source title`, `SP`); output types mirror what the
//! renderer consumes (`unitID`, `sourcetitle`, `entity`, ...).

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::common::{Error, ErrorCode, ErrorKind, Result};

/// Actor group. Determines the angular sector a point is drawn in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Topic {
    Consumers,
    Businesses,
    Institutions,
    /// A flag-name fragment the alias table doesn't know, kept verbatim.
    Unrecognized(String),
}

impl Topic {
    /// Sector order around the chart, clockwise from 12 o'clock.
    pub const CHART_ORDER: [Topic; 3] = [Topic::Consumers, Topic::Businesses, Topic::Institutions];

    pub fn as_str(&self) -> &str {
        match self {
            Topic::Consumers => "Consumers",
            Topic::Businesses => "Businesses",
            Topic::Institutions => "Institutions",
            Topic::Unrecognized(s) => s,
        }
    }

    /// Sector index, or `None` for unrecognized topics.
    pub fn index(&self) -> Option<usize> {
        Topic::CHART_ORDER.iter().position(|t| t == self)
    }
}

impl From<String> for Topic {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Consumers" => Topic::Consumers,
            "Businesses" => Topic::Businesses,
            "Institutions" => Topic::Institutions,
            _ => Topic::Unrecognized(s),
        }
    }
}

impl From<Topic> for String {
    fn from(t: Topic) -> Self {
        match t {
            Topic::Unrecognized(s) => s,
            other => other.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value orientation. Determines the radial band a point is drawn in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    SelfProfitGrowth,
    Society,
    Environment,
    Unrecognized(String),
}

impl Category {
    /// Band order from the center outwards.
    pub const BAND_ORDER: [Category; 3] = [
        Category::SelfProfitGrowth,
        Category::Society,
        Category::Environment,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::SelfProfitGrowth => "Self-Profit-Growth",
            Category::Society => "Society",
            Category::Environment => "Environment",
            Category::Unrecognized(s) => s,
        }
    }

    /// Band index, or `None` for unrecognized categories.
    pub fn index(&self) -> Option<usize> {
        Category::BAND_ORDER.iter().position(|c| c == self)
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Self-Profit-Growth" => Category::SelfProfitGrowth,
            "Society" => Category::Society,
            "Environment" => Category::Environment,
            _ => Category::Unrecognized(s),
        }
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        match c {
            Category::Unrecognized(s) => s,
            other => other.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Interpret a JSON cell as a number the way the sheet export intends:
/// numbers pass through, numeric strings are parsed, anything else is `None`.
pub(crate) fn value_as_f64(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|f| f.is_finite())
}

fn value_as_string(v: Value) -> String {
    match v {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_string(Value::deserialize(deserializer)?))
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_f64(&Value::deserialize(deserializer)?))
}

fn lenient_year<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_f64(&Value::deserialize(deserializer)?).map(|y| y.trunc() as i32))
}

/// One paper's raw coding: the flag columns (`Cons_Self`, `Busi_Env`, ...),
/// the scope score and whatever other columns the sheet carried.
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CodedRow {
    #[serde(rename = "Code", default, deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(rename = "SP", default, skip_serializing_if = "Value::is_null")]
    pub scope: Value,
    #[serde(flatten)]
    pub columns: BTreeMap<String, Value>,
}

impl CodedRow {
    pub fn scope_value(&self) -> Option<f64> {
        value_as_f64(&self.scope)
    }

    /// Whether the named flag column is set. Missing columns are unset.
    pub fn flag(&self, name: &str) -> bool {
        match self.columns.get(name) {
            Some(Value::Number(n)) => n.as_f64() == Some(1.0),
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "1" || s == "Yes",
            _ => false,
        }
    }
}

/// Bibliographic metadata for one paper, joined to coded rows by `code`.
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    #[serde(rename = "Code", default, deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(rename = "Authors", default, deserialize_with = "lenient_string")]
    pub authors: String,
    #[serde(rename = "Abstract", default, deserialize_with = "lenient_string")]
    pub abstract_text: String,
    #[serde(rename = "Title", default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(rename = "Link", default, deserialize_with = "lenient_string")]
    pub link: String,
    #[serde(rename = "Source title", default, deserialize_with = "lenient_string")]
    pub source_title: String,
    #[serde(rename = "Year", default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    /// Sheet the record was imported from; selects the base opacity.
    #[serde(rename = "sourceFile", default, deserialize_with = "lenient_string")]
    pub source_group: String,
    #[serde(rename = "citationCount", default, deserialize_with = "lenient_f64")]
    pub citation_count: Option<f64>,
    #[serde(rename = "DOI", default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
}

/// A coded flag before aggregation: one per set flag per row.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatPoint {
    pub unit_id: String,
    pub topic: Topic,
    pub category: Category,
    pub value: Option<f64>,
}

/// One node on the chart: a (paper, topic, category) triple.
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// `unitID-topic-category`; unique across a data set.
    pub entity: String,
    #[serde(rename = "unitID")]
    pub unit_id: String,
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub topic: Topic,
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub category: Category,
    /// Mean scope score of the group.
    pub value: f64,
    pub count: f64,
    pub label: String,
    pub authors: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub title: String,
    pub url: String,
    pub sourcetitle: String,
    pub year: Option<i32>,
    pub opacity: f64,
    /// Journal class: a top journal's title or the catch-all label.
    pub color: String,
    /// 1-based rank among points sharing (topic, category, value).
    pub counter: u32,
    #[serde(default = "default_true")]
    pub interactive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

fn default_true() -> bool {
    true
}

impl DataPoint {
    pub fn entity_key(unit_id: &str, topic: &Topic, category: &Category) -> String {
        format!("{unit_id}-{topic}-{category}")
    }
}

/// Final position of a node after relaxation.
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

/// Drawable area in pixels. Only built through [`Viewport::new`], which
/// deserialization goes through as well.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ViewportSize")]
pub struct Viewport {
    width: f64,
    height: f64,
}

#[derive(Deserialize)]
struct ViewportSize {
    width: f64,
    height: f64,
}

impl TryFrom<ViewportSize> for Viewport {
    type Error = Error;

    fn try_from(size: ViewportSize) -> Result<Self> {
        Viewport::new(size.width, size.height)
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(Error::new(
                ErrorKind::Layout,
                ErrorCode::InvalidViewport,
                Some(format!("{width}x{height}")),
            ));
        }
        Ok(Viewport { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Everything the ingestion service hands over in one fetch.
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartInput {
    #[serde(default)]
    pub papers: Vec<PaperRecord>,
    #[serde(default)]
    pub scores: Vec<CodedRow>,
    #[serde(default)]
    pub bibliography: Vec<String>,
    #[serde(rename = "tooltipContent", default)]
    pub tooltip_content: IndexMap<String, Vec<String>>,
}

/// Aggregated points plus the journal legend (top journals then the
/// catch-all label).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub data: Vec<DataPoint>,
    pub journals: Vec<String>,
}

/// Everything the renderer receives.
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartOutput {
    pub data: Vec<DataPoint>,
    pub journals: Vec<String>,
    pub bibliography: Vec<String>,
    #[serde(rename = "tooltipContent")]
    pub tooltip_content: IndexMap<String, Vec<String>>,
}
