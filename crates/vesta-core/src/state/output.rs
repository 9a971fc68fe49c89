//! Relations and cell outputs.
//!
//! A relation is an ordered sequence of rows, each row a mapping from field
//! name to JSON value. Relations are shared between cells behind `Arc`, so
//! handing a producer's output to its consumers never copies rows.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry in a relation.
pub type Row = serde_json::Map<String, Value>;

/// A set of named relations, as passed into and out of program cells.
pub type RelationSet = FxHashMap<String, Arc<Relation>>;

/// An ordered sequence of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Relation(Vec<Row>);

impl Relation {
    pub fn new(rows: Vec<Row>) -> Self {
        Self(rows)
    }

    /// Build a relation from JSON objects, skipping anything that is not an
    /// object.
    pub fn from_json(values: impl IntoIterator<Item = Value>) -> Self {
        values
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect()
    }

    pub fn rows(&self) -> &[Row] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.0.iter()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.0
    }
}

impl FromIterator<Row> for Relation {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Relation {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The output of the last successful evaluation of a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellOutput {
    /// Named relations emitted by a program cell.
    Relations(RelationSet),
    /// Rendered markup emitted by a plot cell.
    Rendered(String),
}

impl CellOutput {
    /// The relation emitted under `name`, if any.
    ///
    /// Rendered output never emits relations.
    pub fn relation(&self, name: &str) -> Option<&Arc<Relation>> {
        match self {
            Self::Relations(set) => set.get(name),
            Self::Rendered(_) => None,
        }
    }

    /// Whether the output carries a relation called `name`.
    pub fn emits(&self, name: &str) -> bool {
        self.relation(name).is_some()
    }

    /// Names of every relation in this output.
    pub fn relation_names(&self) -> Vec<String> {
        match self {
            Self::Relations(set) => set.keys().cloned().collect(),
            Self::Rendered(_) => Vec::new(),
        }
    }

    pub fn as_rendered(&self) -> Option<&str> {
        match self {
            Self::Rendered(html) => Some(html),
            Self::Relations(_) => None,
        }
    }
}
