// Copyright 2026 The A-VO-S Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Row flattening: one coded survey row becomes one [`FlatPoint`] per set
//! topic/category flag.

use std::collections::{BTreeMap, HashMap};

use lazy_static::lazy_static;
use serde_json::{Map, Value};

use crate::common::Result;
use crate::datamodel::{Category, CodedRow, FlatPoint, Topic};

/// The nine `Topic_Category` flag columns, in sheet order.
pub const FLAG_KEYS: [&str; 9] = [
    "Cons_Self",
    "Cons_Soc",
    "Cons_Env",
    "Busi_Prof",
    "Busi_Soc",
    "Busi_Env",
    "Inst_Gro",
    "Inst_Soc",
    "Inst_Env",
];

lazy_static! {
    // Abbreviations that have appeared in flag names across sheet revisions.
    static ref TOPIC_ALIASES: HashMap<&'static str, Topic> = {
        let mut m = HashMap::new();
        m.insert("Bus", Topic::Businesses);
        m.insert("Busi", Topic::Businesses);
        m.insert("Ins", Topic::Institutions);
        m.insert("Inst", Topic::Institutions);
        m.insert("Con", Topic::Consumers);
        m.insert("Cons", Topic::Consumers);
        m
    };
    static ref CATEGORY_ALIASES: HashMap<&'static str, Category> = {
        let mut m = HashMap::new();
        for spg in ["Self", "Prof", "Gro", "Grow", "Gro2", "Gro3", "Growth"] {
            m.insert(spg, Category::SelfProfitGrowth);
        }
        m.insert("Soc", Category::Society);
        m.insert("Env", Category::Environment);
        m.insert("SP", Category::Unrecognized("Sustainability".to_owned()));
        m.insert("Oth", Category::Unrecognized("Other".to_owned()));
        m
    };
    // Survey question headers to the short column names used everywhere else.
    static ref SURVEY_COLUMNS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("Are Consumers addressed as Actors in this research?", "Act_Cons");
        m.insert("Are Consumers Self-Oriented in this article?", "Cons_Self");
        m.insert("Are Consumers Societally-Oriented in this article?", "Cons_Soc");
        m.insert("Are Consumers Environmentally-Oriented in this article?", "Cons_Env");
        m.insert("Are Businesses addressed as Actors in this research?", "Act_Busi");
        m.insert("Are Businesses Profit-Oriented in this article?", "Busi_Prof");
        m.insert("Are Businesses Societally-Oriented in this article?", "Busi_Soc");
        m.insert("Are Businesses Environmentally-Oriented in this article?", "Busi_Env");
        m.insert("Are Institutions addressed as Actors in this research?", "Act_Inst");
        m.insert("Are Institutions Growth-Oriented in this article?", "Inst_Gro");
        m.insert("Are Institutions Societally-Oriented in this article?", "Inst_Soc");
        m.insert("Are Institutions Environmentally-Oriented in this article?", "Inst_Env");
        m.insert("What is the Scope of Sustainability in this article?", "SP");
        m
    };
}

/// Map a topic fragment to its canonical topic. Unknown fragments are kept
/// as they are.
pub fn normalize_topic(fragment: &str) -> Topic {
    TOPIC_ALIASES
        .get(fragment)
        .cloned()
        .unwrap_or_else(|| Topic::from(fragment.to_owned()))
}

/// Map a category fragment to its canonical category. Unknown fragments are
/// kept as they are.
pub fn normalize_category(fragment: &str) -> Category {
    CATEGORY_ALIASES
        .get(fragment)
        .cloned()
        .unwrap_or_else(|| Category::from(fragment.to_owned()))
}

/// Produce one point per set flag in `keys`. Unset and missing flags are
/// skipped; every point carries the row's code and scope value.
pub fn flatten_row(row: &CodedRow, keys: &[&str]) -> Vec<FlatPoint> {
    let value = row.scope_value();
    keys.iter()
        .filter(|key| row.flag(key))
        .map(|key| {
            let (topic, category) = key.split_once('_').unwrap_or((*key, ""));
            FlatPoint {
                unit_id: row.code.clone(),
                topic: normalize_topic(topic),
                category: normalize_category(category),
                value,
            }
        })
        .collect()
}

/// Flatten every row against the standard flag columns.
pub fn flatten_rows(rows: &[CodedRow]) -> Vec<FlatPoint> {
    rows.iter()
        .flat_map(|row| flatten_row(row, &FLAG_KEYS))
        .collect()
}

/// Turn a row keyed by survey question headers into a [`CodedRow`]: known
/// headers are renamed to their short column names and "Yes"/"No" answers
/// become 1/0. Other columns pass through untouched.
pub fn normalize_survey_row(raw: BTreeMap<String, Value>) -> Result<CodedRow> {
    let mut columns = Map::new();
    for (header, cell) in raw {
        let cell = match cell {
            Value::String(s) if s == "Yes" => Value::from(1),
            Value::String(s) if s == "No" => Value::from(0),
            other => other,
        };
        let name = SURVEY_COLUMNS
            .get(header.as_str())
            .map(|s| (*s).to_owned())
            .unwrap_or(header);
        columns.insert(name, cell);
    }
    Ok(serde_json::from_value(Value::Object(columns))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> CodedRow {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_topic_aliases() {
        assert_eq!(Topic::Businesses, normalize_topic("Bus"));
        assert_eq!(Topic::Businesses, normalize_topic("Busi"));
        assert_eq!(Topic::Institutions, normalize_topic("Ins"));
        assert_eq!(Topic::Consumers, normalize_topic("Cons"));
        assert_eq!(Topic::Consumers, normalize_topic("Consumers"));
        assert_eq!(Topic::Unrecognized("Gov".to_owned()), normalize_topic("Gov"));
    }

    #[test]
    fn test_category_aliases() {
        for spg in ["Self", "Prof", "Gro", "Grow", "Gro2", "Gro3", "Growth"] {
            assert_eq!(Category::SelfProfitGrowth, normalize_category(spg));
        }
        assert_eq!(Category::Society, normalize_category("Soc"));
        assert_eq!(Category::Environment, normalize_category("Env"));
        assert_eq!("Sustainability", normalize_category("SP").as_str());
        assert_eq!(
            Category::Unrecognized("Eco".to_owned()),
            normalize_category("Eco")
        );
    }

    #[test]
    fn test_flatten_row_skips_unset_flags() {
        let r = row(json!({
            "Code": "P1",
            "SP": 4,
            "Cons_Self": 1,
            "Cons_Soc": 0,
            "Busi_Env": 1,
            "Act_Cons": 1
        }));
        let points = flatten_row(&r, &FLAG_KEYS);
        assert_eq!(2, points.len());
        assert_eq!(Topic::Consumers, points[0].topic);
        assert_eq!(Category::SelfProfitGrowth, points[0].category);
        assert_eq!(Topic::Businesses, points[1].topic);
        assert_eq!(Category::Environment, points[1].category);
        assert!(points.iter().all(|p| p.unit_id == "P1"));
        assert!(points.iter().all(|p| p.value == Some(4.0)));
    }

    #[test]
    fn test_flatten_row_passes_unknown_fragments_through() {
        let r = row(json!({"Code": "P2", "SP": 2, "Gov_Eco": 1}));
        let points = flatten_row(&r, &["Gov_Eco"]);
        assert_eq!(1, points.len());
        assert_eq!(Topic::Unrecognized("Gov".to_owned()), points[0].topic);
        assert_eq!(Category::Unrecognized("Eco".to_owned()), points[0].category);
    }

    #[test]
    fn test_flatten_rows_empty() {
        assert!(flatten_rows(&[]).is_empty());
        let r = row(json!({"Code": "P3", "SP": 1}));
        assert!(flatten_rows(&[r]).is_empty());
    }

    #[test]
    fn test_normalize_survey_row() {
        let mut raw = BTreeMap::new();
        raw.insert("Code".to_owned(), json!("P9"));
        raw.insert(
            "Are Institutions Growth-Oriented in this article?".to_owned(),
            json!("Yes"),
        );
        raw.insert(
            "Are Consumers Self-Oriented in this article?".to_owned(),
            json!("No"),
        );
        raw.insert(
            "What is the Scope of Sustainability in this article?".to_owned(),
            json!("5"),
        );
        raw.insert("Coder".to_owned(), json!("AB"));

        let coded = normalize_survey_row(raw).unwrap();
        assert_eq!("P9", coded.code);
        assert_eq!(Some(5.0), coded.scope_value());
        assert!(coded.flag("Inst_Gro"));
        assert!(!coded.flag("Cons_Self"));
        assert_eq!(Some(&json!("AB")), coded.columns.get("Coder"));

        let points = flatten_rows(&[coded]);
        assert_eq!(1, points.len());
        assert_eq!(Topic::Institutions, points[0].topic);
    }
}
