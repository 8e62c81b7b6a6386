use std::cmp::Ordering;

use super::types::MatchedRow;
use crate::table::parse_number;

/// Sort `rows` by the numeric value of `column`, highest first.
///
/// Rows whose rank cell is not a number go after every numeric row. The sort
/// is stable, so equal ranks and unranked rows keep their input order. If no
/// row has a numeric rank the order is left untouched.
pub fn rank_descending(rows: &mut [MatchedRow], column: &str) -> bool {
    let keys: Vec<Option<f64>> = rows
        .iter()
        .map(|r| r.get(column).and_then(parse_number))
        .collect();
    if keys.iter().all(Option::is_none) {
        return false;
    }

    let mut keyed: Vec<(Option<f64>, MatchedRow)> =
        keys.into_iter().zip(rows.iter().cloned()).collect();
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    for (slot, (_, row)) in rows.iter_mut().zip(keyed) {
        *slot = row;
    }
    true
}
