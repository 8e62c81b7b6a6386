use chrono::NaiveDate;
use thiserror::Error;

/// Failures surfaced by the loader, inferrer, trend engine and matcher.
///
/// Cell-level coercion problems (a non-numeric measure, an unparseable date)
/// are never reported here; they only show up as reduced or zeroed output.
#[derive(Debug, Error)]
pub enum Error {
    #[error("source `{source_name}` could not be opened: {detail}")]
    SourceNotFound { source_name: String, detail: String },

    #[error("source `{source_name}` could not be decoded with any of [{}]", .tried.join(", "))]
    Decode {
        source_name: String,
        tried: Vec<String>,
    },

    #[error("source `{source_name}` has no columns")]
    EmptyTable { source_name: String },

    #[error("source `{source_name}` is not valid CSV: {detail}")]
    Malformed { source_name: String, detail: String },

    #[error("could not resolve the {axis} column: {detail}")]
    SchemaInference { axis: Axis, detail: String },

    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("wide tables need an entity to select the measure column")]
    EntityRequired,

    #[error("column `{column}` does not exist")]
    MissingColumn { column: String },

    #[error("no descriptor column could be resolved for entity `{entity}`")]
    NoDescriptorColumn { entity: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The semantic roles the schema inferrer assigns to columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Date,
    Entity,
    Measure,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Axis::Date => "date",
            Axis::Entity => "entity",
            Axis::Measure => "measure",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_lists_encodings() {
        let err = Error::Decode {
            source_name: "DESSERT.csv".into(),
            tried: vec!["UTF-8".into(), "EUC-KR".into()],
        };
        assert_eq!(
            err.to_string(),
            "source `DESSERT.csv` could not be decoded with any of [UTF-8, EUC-KR]"
        );
    }

    #[test]
    fn test_schema_error_names_axis() {
        let err = Error::SchemaInference {
            axis: Axis::Measure,
            detail: "no numeric column".into(),
        };
        assert!(err.to_string().contains("measure column"));
    }
}
