pub mod series;

pub use series::{DailyPoint, DailySeries, DateRange};

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::{Measure, SchemaBinding};
use crate::table::{parse_date, parse_number, utils::clean_str, RawTable};

/// Daily trend of `entity` between `start` and `end` (both inclusive).
///
/// Rows are kept when their date parses and falls inside the range and,
/// for long tables, when the entity cell equals `entity` exactly (after
/// trimming). Tables without an entity column read the column named
/// `entity`; a name with no column yields zeros. Measure cells that are not
/// numbers are skipped. The result has one point per day, zero where nothing
/// contributed.
#[tracing::instrument(level = "debug", skip(table, binding), fields(source = table.source()))]
pub fn query(
    table: &RawTable,
    binding: &SchemaBinding,
    entity: Option<&str>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<DailySeries> {
    let range = DateRange::new(start, end)?;
    let sums = daily_sums(table, binding, entity, range)?;
    let series = DailySeries::gap_filled(range, &sums);
    debug!(
        days = series.len(),
        active_days = sums.len(),
        total = series.total(),
        "trend computed"
    );
    Ok(series)
}

fn daily_sums(
    table: &RawTable,
    binding: &SchemaBinding,
    entity: Option<&str>,
    range: DateRange,
) -> Result<BTreeMap<NaiveDate, f64>> {
    let mut sums = BTreeMap::new();
    let column = |name: &str| {
        table.column_index(name).ok_or_else(|| Error::MissingColumn {
            column: name.to_string(),
        })
    };
    let date_idx = column(binding.date_column())?;

    // without an entity column the entity names the measure column itself
    let measure_idx = match (binding.measure(), binding.entity_column(), entity.map(str::trim)) {
        (Measure::PerEntity, _, None) => return Err(Error::EntityRequired),
        (Measure::Column(m), Some(_), _) | (Measure::Column(m), None, None) => column(m)?,
        (Measure::Column(m), None, Some(e)) if e == m.as_str() => column(m)?,
        (_, _, Some(e)) => match table.column_index(e) {
            Some(idx) if idx != date_idx => idx,
            _ => {
                debug!(entity = e, "entity has no column in table");
                return Ok(sums);
            }
        },
    };

    // long tables filter rows on the entity column when an entity is given
    let entity_filter = match (binding.entity_column(), entity) {
        (Some(col), Some(want)) => Some((column(col)?, want.trim())),
        _ => None,
    };

    let mut matched = 0usize;
    let mut missing = 0usize;
    for row in table.rows() {
        let Some(day) = row.get(date_idx).and_then(|c| parse_date(c)) else {
            continue;
        };
        if !range.contains(day) {
            continue;
        }
        if let Some((idx, want)) = entity_filter {
            if row.get(idx).map(|c| clean_str(c)) != Some(want) {
                continue;
            }
        }
        matched += 1;

        // the day is present even if the value is not a number
        let slot = sums.entry(day).or_insert(0.0);
        match row.get(measure_idx).and_then(|c| parse_number(c)) {
            Some(v) => *slot += v,
            None => missing += 1,
        }
    }

    debug!(matched, missing, "rows selected");
    Ok(sums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InferenceConfig, LoaderConfig};
    use crate::schema::{infer_binding, SchemaHints};
    use crate::table::{load, TableSource};
    use anyhow::Result;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bind(csv: &str) -> (RawTable, SchemaBinding) {
        let t = load(&TableSource::bytes("DESSERT.csv", csv), &LoaderConfig::default()).unwrap();
        let b = infer_binding(&t, &SchemaHints::default(), &InferenceConfig::default()).unwrap();
        (t, b)
    }

    const LONG: &str = "date,dessert,search_count\n\
                        2024-01-01,latte,3\n\
                        2024-01-01,mocha,10\n\
                        2024-01-02,latte,oops\n\
                        2024-01-03,latte,5\n\
                        2024-01-04,latte,\n\
                        2024-01-05,latte,2\n\
                        2024-01-05,mocha,1\n";

    #[test]
    fn test_malformed_cells_become_zero_days() -> Result<()> {
        let (t, b) = bind(LONG);
        let series = query(&t, &b, Some("latte"), ymd(2024, 1, 1), ymd(2024, 1, 5))?;
        assert_eq!(series.values(), vec![3.0, 0.0, 5.0, 0.0, 2.0]);
        assert_eq!(series.points()[1].date, ymd(2024, 1, 2));
        Ok(())
    }

    #[test]
    fn test_range_wider_than_data() -> Result<()> {
        let (t, b) = bind(
            "date,dessert,search_count\n\
             2024-01-02,latte,1\n\
             2024-01-03,latte,2\n\
             2024-01-04,latte,3\n",
        );
        let series = query(&t, &b, Some("latte"), ymd(2024, 1, 1), ymd(2024, 1, 5))?;
        let points = series.points();
        assert_eq!(points.len(), 5);
        assert_eq!((points[0].date, points[0].value), (ymd(2024, 1, 1), 0.0));
        assert_eq!((points[4].date, points[4].value), (ymd(2024, 1, 5), 0.0));
        assert_eq!(series.values(), vec![0.0, 1.0, 2.0, 3.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_length_and_order_over_long_range() -> Result<()> {
        let (t, b) = bind(LONG);
        let (start, end) = (ymd(2023, 12, 1), ymd(2024, 3, 1));
        let series = query(&t, &b, Some("latte"), start, end)?;
        assert_eq!(series.len() as i64, (end - start).num_days() + 1);
        assert!(series
            .points()
            .windows(2)
            .all(|w| w[1].date == w[0].date.succ_opt().unwrap()));
        Ok(())
    }

    #[test]
    fn test_unknown_entity_is_all_zero() -> Result<()> {
        let (t, b) = bind(LONG);
        let series = query(&t, &b, Some("macaron"), ymd(2024, 1, 1), ymd(2024, 1, 3))?;
        assert_eq!(series.len(), 3);
        assert!(series.is_all_zero());
        Ok(())
    }

    #[test]
    fn test_entity_match_is_case_sensitive_but_trimmed() -> Result<()> {
        let (t, b) = bind(LONG);
        let upper = query(&t, &b, Some("Latte"), ymd(2024, 1, 1), ymd(2024, 1, 1))?;
        assert!(upper.is_all_zero());
        let padded = query(&t, &b, Some(" latte "), ymd(2024, 1, 1), ymd(2024, 1, 1))?;
        assert_eq!(padded.values(), vec![3.0]);
        Ok(())
    }

    #[test]
    fn test_no_entity_sums_everything() -> Result<()> {
        let (t, b) = bind(LONG);
        let series = query(&t, &b, None, ymd(2024, 1, 1), ymd(2024, 1, 1))?;
        assert_eq!(series.values(), vec![13.0]);
        Ok(())
    }

    #[test]
    fn test_same_day_rows_are_summed() -> Result<()> {
        let (t, b) = bind(
            "date,dessert,search_count\n\
             2024-01-01 09:00:00,latte,1\n\
             2024-01-01 18:30:00,latte,2.5\n",
        );
        let series = query(&t, &b, Some("latte"), ymd(2024, 1, 1), ymd(2024, 1, 1))?;
        assert_eq!(series.values(), vec![3.5]);
        Ok(())
    }

    #[test]
    fn test_invalid_range() {
        let (t, b) = bind(LONG);
        let err = query(&t, &b, Some("latte"), ymd(2024, 1, 5), ymd(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
    }

    #[test]
    fn test_idempotent() -> Result<()> {
        let (t, b) = bind(LONG);
        let a = query(&t, &b, Some("latte"), ymd(2024, 1, 1), ymd(2024, 1, 9))?;
        let c = query(&t, &b, Some("latte"), ymd(2024, 1, 1), ymd(2024, 1, 9))?;
        assert_eq!(a, c);
        Ok(())
    }

    #[test]
    fn test_wide_table_reads_entity_column() -> Result<()> {
        let (t, b) = bind(
            "날짜,라떼,아메리카노\n\
             2024-01-01,3,7\n\
             2024-01-03,5,1\n\
             not a date,100,100\n",
        );
        let series = query(&t, &b, Some("라떼"), ymd(2024, 1, 1), ymd(2024, 1, 3))?;
        assert_eq!(series.values(), vec![3.0, 0.0, 5.0]);

        let missing = query(&t, &b, Some("마카롱"), ymd(2024, 1, 1), ymd(2024, 1, 3))?;
        assert!(missing.is_all_zero());
        assert_eq!(missing.len(), 3);
        Ok(())
    }

    #[test]
    fn test_wide_table_with_malformed_cell() -> Result<()> {
        let (t, b) = bind(
            "날짜,라떼,아메리카노\n\
             2024-01-01,3,7\n\
             2024-01-02,x,1\n\
             2024-01-03,5,2\n",
        );
        assert_eq!(b.measure(), &Measure::PerEntity);
        let latte = query(&t, &b, Some("라떼"), ymd(2024, 1, 1), ymd(2024, 1, 3))?;
        assert_eq!(latte.values(), vec![3.0, 0.0, 5.0]);
        let americano = query(&t, &b, Some("아메리카노"), ymd(2024, 1, 1), ymd(2024, 1, 3))?;
        assert_eq!(americano.values(), vec![7.0, 1.0, 2.0]);
        Ok(())
    }

    #[test]
    fn test_single_table_reads_column_named_by_entity() -> Result<()> {
        let (t, b) = bind(
            "date,latte_count,mocha_count\n\
             2024-01-01,3,7\n\
             2024-01-02,4,1\n",
        );
        assert_eq!(b.measure(), &Measure::Column("latte_count".into()));
        assert_eq!(b.entity_column(), None);

        let (start, end) = (ymd(2024, 1, 1), ymd(2024, 1, 2));
        let mocha = query(&t, &b, Some("mocha_count"), start, end)?;
        assert_eq!(mocha.values(), vec![7.0, 1.0]);
        let latte = query(&t, &b, Some("latte_count"), start, end)?;
        assert_eq!(latte.values(), vec![3.0, 4.0]);
        let bound = query(&t, &b, None, start, end)?;
        assert_eq!(bound.values(), vec![3.0, 4.0]);
        let unknown = query(&t, &b, Some("tart_count"), start, end)?;
        assert!(unknown.is_all_zero());
        let date = query(&t, &b, Some("date"), start, end)?;
        assert!(date.is_all_zero());
        Ok(())
    }

    #[test]
    fn test_wide_table_needs_entity() {
        let (t, b) = bind("날짜,라떼,아메리카노\n2024-01-01,3,7\n");
        let err = query(&t, &b, None, ymd(2024, 1, 1), ymd(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, Error::EntityRequired));
    }
}
