// src/schema/types.rs

use serde::{Deserialize, Serialize};

use crate::error::{Axis, Error, Result};
use crate::table::RawTable;

/// Caller-supplied column names that win over inference when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaHints {
    pub date: Option<String>,
    pub entity: Option<String>,
    pub measure: Option<String>,
}

/// Where the numeric values of a query come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "column", rename_all = "snake_case")]
pub enum Measure {
    /// A single fixed measure column.
    Column(String),
    /// Wide table: the selected entity names the measure column.
    PerEntity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableShape {
    /// One row per entity per day, entity in its own column.
    Long,
    /// One row per day, one column per entity.
    Wide,
    /// One row per day, a single measure and no entity axis.
    Single,
}

/// Result of inference. Any axis may be unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferredSchema {
    pub date_column: Option<String>,
    pub entity_column: Option<String>,
    pub measure: Option<Measure>,
}

impl InferredSchema {
    pub fn shape(&self) -> TableShape {
        match (&self.entity_column, &self.measure) {
            (Some(_), _) => TableShape::Long,
            (None, Some(Measure::PerEntity)) => TableShape::Wide,
            _ => TableShape::Single,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.date_column.is_some() && self.measure.is_some()
    }

    /// Turn a partial result into a binding, naming the first missing axis.
    pub fn bind(self, table: &RawTable) -> Result<SchemaBinding> {
        let date_column = self.date_column.ok_or_else(|| Error::SchemaInference {
            axis: Axis::Date,
            detail: format!("no date-like column in `{}`", table.source()),
        })?;
        let measure = self.measure.ok_or_else(|| Error::SchemaInference {
            axis: Axis::Measure,
            detail: format!("no numeric column in `{}`", table.source()),
        })?;
        SchemaBinding::new(table, date_column, self.entity_column, measure)
    }
}

/// Validated column roles for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaBinding {
    date_column: String,
    entity_column: Option<String>,
    measure: Measure,
}

impl SchemaBinding {
    /// Build a binding, checking that every named column exists in `table`.
    pub fn new(
        table: &RawTable,
        date_column: impl Into<String>,
        entity_column: Option<String>,
        measure: Measure,
    ) -> Result<Self> {
        let date_column = date_column.into();
        let check = |axis: Axis, column: &str| {
            if table.has_column(column) {
                Ok(())
            } else {
                Err(Error::SchemaInference {
                    axis,
                    detail: format!("column `{}` not in `{}`", column, table.source()),
                })
            }
        };

        check(Axis::Date, &date_column)?;
        if let Some(entity) = &entity_column {
            check(Axis::Entity, entity)?;
        }
        match (&measure, &entity_column) {
            (Measure::Column(m), _) => check(Axis::Measure, m)?,
            (Measure::PerEntity, Some(entity)) => {
                return Err(Error::SchemaInference {
                    axis: Axis::Measure,
                    detail: format!(
                        "a per-entity measure cannot be combined with entity column `{}`",
                        entity
                    ),
                })
            }
            (Measure::PerEntity, None) => {}
        }

        Ok(Self {
            date_column,
            entity_column,
            measure,
        })
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    pub fn entity_column(&self) -> Option<&str> {
        self.entity_column.as_deref()
    }

    pub fn measure(&self) -> &Measure {
        &self.measure
    }

    pub fn shape(&self) -> TableShape {
        match (&self.entity_column, &self.measure) {
            (Some(_), _) => TableShape::Long,
            (None, Measure::PerEntity) => TableShape::Wide,
            (None, Measure::Column(_)) => TableShape::Single,
        }
    }
}
