pub mod rank;
pub mod resolve;
pub mod types;

pub use types::{DescriptorSpec, MatchMode, MatchSet, MatchedRow};

use tracing::debug;

use crate::config::MatcherConfig;
use crate::error::{Error, Result};
use crate::table::{utils::contains_ignore_case, RawTable};

/// Rows of the cross-reference `table` whose descriptor columns mention
/// `entity`, optionally ranked by `rank_column`.
///
/// Zero matches is an empty [`MatchSet`], not an error. Errors are reserved
/// for structural problems: a named column that does not exist, or no
/// descriptor column at all.
#[tracing::instrument(level = "debug", skip(table, spec, config), fields(source = table.source()))]
pub fn match_rows(
    table: &RawTable,
    entity: &str,
    spec: &DescriptorSpec,
    rank_column: Option<&str>,
    mode: MatchMode,
    config: &MatcherConfig,
) -> Result<MatchSet> {
    let descriptors = resolve::resolve_descriptors(table, entity, spec, config)?;
    if let Some(rank) = rank_column {
        if !table.has_column(rank) {
            return Err(Error::MissingColumn {
                column: rank.to_string(),
            });
        }
    }

    let needle = entity.trim().to_lowercase();
    let names: Vec<String> = table.column_names().map(str::to_string).collect();
    let mut rows: Vec<MatchedRow> = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            descriptors
                .iter()
                .any(|&i| row.get(i).is_some_and(|cell| cell_matches(cell, &needle, mode)))
        })
        .map(|(index, row)| MatchedRow {
            index,
            cells: names.iter().cloned().zip(row.iter().cloned()).collect(),
        })
        .collect();

    let ranked = match rank_column {
        Some(rank) => rank::rank_descending(&mut rows, rank),
        None => false,
    };
    debug!(matches = rows.len(), ranked, "cross-reference matched");

    Ok(MatchSet {
        descriptors: descriptors.iter().map(|&i| names[i].clone()).collect(),
        rank_column: rank_column.filter(|_| ranked).map(str::to_string),
        rows,
    })
}

fn cell_matches(cell: &str, needle_lower: &str, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Substring => contains_ignore_case(cell, needle_lower),
        MatchMode::Exact => {
            !needle_lower.is_empty() && cell.trim().to_lowercase() == needle_lower
        }
    }
}
