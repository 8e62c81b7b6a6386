use tracing::debug;

use super::date_parser::parse_date;
use super::raw_table::ColumnKind;
use super::utils::{clean_str, parse_integer, parse_number};

/// Infer the kind of column `idx` from every non-empty cell:
///  - all integers ⇒ Integer
///  - all numbers ⇒ Float
///  - all calendar dates ⇒ Date
///  - otherwise, or no non-empty cells at all ⇒ Text
pub fn derive_kind(column_name: &str, idx: usize, rows: &[Vec<String>]) -> ColumnKind {
    let mut integer = true;
    let mut float = true;
    let mut date = true;
    let mut seen = 0usize;

    for row in rows {
        let cell = row.get(idx).map(|s| clean_str(s)).unwrap_or("");
        if cell.is_empty() {
            continue;
        }
        seen += 1;

        integer = integer && parse_integer(cell).is_some();
        float = float && parse_number(cell).is_some();
        date = date && parse_date(cell).is_some();

        if !integer && !float && !date {
            break;
        }
    }

    let kind = match (seen, integer, float, date) {
        (0, ..) => ColumnKind::Text,
        (_, true, ..) => ColumnKind::Integer,
        (_, _, true, _) => ColumnKind::Float,
        (_, _, _, true) => ColumnKind::Date,
        _ => ColumnKind::Text,
    };
    debug!(column = column_name, ?kind, samples = seen, "derived column kind");
    kind
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(cells: &[&str]) -> Vec<Vec<String>> {
        cells.iter().map(|c| vec![c.to_string()]).collect()
    }

    #[test]
    fn test_kinds() {
        assert_eq!(derive_kind("a", 0, &rows(&["1", " 2", ""])), ColumnKind::Integer);
        assert_eq!(derive_kind("a", 0, &rows(&["1", "2.5"])), ColumnKind::Float);
        assert_eq!(derive_kind("a", 0, &rows(&["1,200", "3"])), ColumnKind::Float);
        assert_eq!(
            derive_kind("a", 0, &rows(&["2024-01-01", "2024/01/02"])),
            ColumnKind::Date
        );
        assert_eq!(derive_kind("a", 0, &rows(&["3", "latte"])), ColumnKind::Text);
        assert_eq!(derive_kind("a", 0, &rows(&["", " "])), ColumnKind::Text);
    }

    #[test]
    fn test_short_rows_count_as_empty() {
        let rows = vec![vec!["x".to_string()], vec!["y".to_string(), "7".to_string()]];
        assert_eq!(derive_kind("b", 1, &rows), ColumnKind::Integer);
    }
}
