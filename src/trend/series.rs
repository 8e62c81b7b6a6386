use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Inclusive `[start, end]` calendar range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Number of days in the range, both ends included.
    pub fn day_count(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |d| {
            d.succ_opt().filter(|next| *next <= end)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One point per calendar day of a range, ascending, no gaps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DailySeries {
    points: Vec<DailyPoint>,
}

impl DailySeries {
    /// Spread per-day sums over `range`; days without a sum become 0.
    pub fn gap_filled(range: DateRange, sums: &BTreeMap<NaiveDate, f64>) -> Self {
        let points = range
            .days()
            .map(|date| DailyPoint {
                date,
                value: sums.get(&date).copied().unwrap_or(0.0),
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[DailyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    /// Highest day; the earliest one wins ties.
    pub fn peak(&self) -> Option<DailyPoint> {
        self.points
            .iter()
            .copied()
            .reduce(|best, p| if p.value > best.value { p } else { best })
    }

    pub fn is_all_zero(&self) -> bool {
        self.points.iter().all(|p| p.value == 0.0)
    }
}
