use serde::Serialize;

use super::utils::{clean_str, parse_number};

/// Value kind inferred for a column at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Float,
    Date,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Header as read, trimmed of surrounding whitespace.
    pub name: String,
    pub kind: ColumnKind,
}

/// A fully loaded table. Cells are kept exactly as the CSV reader produced
/// them; every row has one cell per column.
#[derive(Debug, Clone)]
pub struct RawTable {
    source: String,
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub(crate) fn new(source: String, columns: Vec<Column>, rows: Vec<Vec<String>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self {
            source,
            columns,
            rows,
        }
    }

    /// Identifier of the source this table was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Position of the first column named `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Cells of column `idx`, top to bottom.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |r| r.get(idx).map(String::as_str).unwrap_or(""))
    }

    /// A numeric column, or one where most non-empty cells still parse as
    /// numbers. Stray malformed cells make a column `Text` at load time but
    /// do not stop it from being a measure.
    pub fn is_mostly_numeric(&self, idx: usize) -> bool {
        match self.columns.get(idx) {
            None => return false,
            Some(c) if c.kind.is_numeric() => return true,
            Some(_) => {}
        }
        let (mut numbers, mut filled) = (0usize, 0usize);
        for cell in self.column_values(idx).map(clean_str) {
            if cell.is_empty() {
                continue;
            }
            filled += 1;
            if parse_number(cell).is_some() {
                numbers += 1;
            }
        }
        numbers * 2 > filled
    }
}
