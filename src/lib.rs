//! Trend and cross-reference engine for loosely-shaped CSV tables.
//!
//! A trend table (long: one row per entity per day, or wide: one column per
//! entity) is loaded, its date/entity/measure columns are inferred, and a
//! gap-free daily series is computed for one entity over a date range. A
//! second table is searched for rows that mention the same entity.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use trendmatch::{config::Config, matcher, schema, table, trend};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load(None)?;
//! let desserts = table::load(&table::TableSource::path("DESSERT.csv"), &config.loader)?;
//! let binding = schema::infer_binding(&desserts, &Default::default(), &config.inference)?;
//! let series = trend::query(
//!     &desserts,
//!     &binding,
//!     Some("latte"),
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
//! )?;
//!
//! let cafes = table::load(&table::TableSource::path("CAFE.csv"), &config.loader)?;
//! let matches = matcher::match_rows(
//!     &cafes,
//!     "latte",
//!     &matcher::DescriptorSpec::Infer,
//!     Some("rating"),
//!     matcher::MatchMode::Substring,
//!     &config.matcher,
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod matcher;
pub mod schema;
pub mod table;
pub mod trend;

pub use error::{Error, Result};
