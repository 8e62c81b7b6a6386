use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Descriptor cell contains the entity, ignoring case.
    #[default]
    Substring,
    /// Descriptor cell equals the entity, ignoring case and surrounding spaces.
    Exact,
}

/// Which columns of the cross-reference table are searched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DescriptorSpec {
    /// Resolve by name tokens, then by content.
    #[default]
    Infer,
    Columns(Vec<String>),
}

/// A matched row: its position in the source table and its cells, verbatim,
/// in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRow {
    pub index: usize,
    pub cells: Vec<(String, String)>,
}

impl MatchedRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

/// Cells as a JSON object keyed by column name, in column order.
struct Cells<'a>(&'a [(String, String)]);

impl Serialize for Cells<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// `{"row": index, "cells": {...}}`; column names only ever appear under `cells`
impl Serialize for MatchedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_struct("MatchedRow", 2)?;
        row.serialize_field("row", &self.index)?;
        row.serialize_field("cells", &Cells(&self.cells))?;
        row.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchSet {
    /// Columns that were searched.
    pub descriptors: Vec<String>,
    pub rank_column: Option<String>,
    pub rows: Vec<MatchedRow>,
}

impl MatchSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.index).collect()
    }
}
