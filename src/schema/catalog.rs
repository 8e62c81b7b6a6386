use chrono::NaiveDate;
use std::collections::BTreeSet;

use super::types::{Measure, SchemaBinding};
use crate::table::{parse_date, utils::clean_str, RawTable};

/// Entities a caller can pick from.
///
/// Long tables list the distinct entity values (sorted), wide tables list
/// their numeric columns in table order, single-series tables list the one
/// measure column.
pub fn entities(table: &RawTable, binding: &SchemaBinding) -> Vec<String> {
    if let Some(idx) = binding.entity_column().and_then(|c| table.column_index(c)) {
        let distinct: BTreeSet<&str> = table
            .column_values(idx)
            .map(clean_str)
            .filter(|v| !v.is_empty())
            .collect();
        return distinct.into_iter().map(str::to_string).collect();
    }

    match binding.measure() {
        Measure::Column(m) => vec![m.clone()],
        Measure::PerEntity => table
            .columns()
            .iter()
            .enumerate()
            .filter(|(i, c)| c.name != binding.date_column() && table.is_mostly_numeric(*i))
            .map(|(_, c)| c.name.clone())
            .collect(),
    }
}

/// Earliest and latest parseable day in the date column.
pub fn date_coverage(table: &RawTable, binding: &SchemaBinding) -> Option<(NaiveDate, NaiveDate)> {
    let idx = table.column_index(binding.date_column())?;
    table
        .column_values(idx)
        .filter_map(parse_date)
        .fold(None, |acc, d| match acc {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        })
}
