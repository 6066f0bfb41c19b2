// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed key-value metadata attached to scene nodes.
//!
//! Host adapters copy whatever per-object properties the rendering layer
//! carries (glTF extras, userData, IFC property sets) into a [`Metadata`]
//! map. The viewer layers only ever read two well-known keys, declared in
//! `bimview-core`: the explicit element id and the element category.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
}

/// Per-node property map.
pub type Metadata = FxHashMap<String, MetaValue>;

impl MetaValue {
    /// Returns the text content, if this value is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a float, converting integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetaValue::Double(d) => Some(*d),
            MetaValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the value as an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetaValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the boolean content.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetaValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for MetaValue {
    fn from(v: bool) -> Self {
        MetaValue::Bool(v)
    }
}

impl From<i64> for MetaValue {
    fn from(v: i64) -> Self {
        MetaValue::Int(v)
    }
}

impl From<f64> for MetaValue {
    fn from(v: f64) -> Self {
        MetaValue::Double(v)
    }
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        MetaValue::Text(v.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        MetaValue::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors() {
        assert_eq!(MetaValue::Text("wall".into()).as_text(), Some("wall"));
        assert_eq!(MetaValue::Int(7).as_i64(), Some(7));
        assert_eq!(MetaValue::Int(7).as_f64(), Some(7.0));
        assert_eq!(MetaValue::Double(2.5).as_f64(), Some(2.5));
        assert_eq!(MetaValue::Bool(true).as_bool(), Some(true));
        assert_eq!(MetaValue::Bool(true).as_text(), None);
        assert_eq!(MetaValue::Text("x".into()).as_i64(), None);
    }

    #[test]
    fn from_conversions() {
        assert_eq!(MetaValue::from("id"), MetaValue::Text("id".to_string()));
        assert_eq!(MetaValue::from(3i64), MetaValue::Int(3));
        assert_eq!(MetaValue::from(1.5f64), MetaValue::Double(1.5));
        assert_eq!(MetaValue::from(false), MetaValue::Bool(false));
    }

    #[test]
    fn map_round_trips_through_json() {
        let mut meta = Metadata::default();
        meta.insert("globalId".to_string(), MetaValue::from("0cqv$p3rj1GvB0DTzXqej6"));
        meta.insert("storey".to_string(), MetaValue::Int(2));

        let json = serde_json::to_string(&meta).unwrap();
        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
