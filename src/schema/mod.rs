pub mod catalog;
pub mod rules;
pub mod types;

pub use catalog::{date_coverage, entities};
pub use types::{InferredSchema, Measure, SchemaBinding, SchemaHints, TableShape};

use tracing::debug;

use crate::config::InferenceConfig;
use crate::error::{Axis, Result};
use crate::table::RawTable;
use rules::{Rule, RuleContext, DATE_RULES, ENTITY_RULES, MEASURE_RULES};

/// Locate the date, entity and measure roles in `table`.
///
/// Axes are resolved in that order and a column bound to one axis is not
/// considered for the next. Unresolved axes stay `None`.
#[tracing::instrument(level = "debug", skip_all, fields(source = table.source()))]
pub fn infer(table: &RawTable, hints: &SchemaHints, config: &InferenceConfig) -> InferredSchema {
    let mut ctx = RuleContext::new(table, hints, config);

    let date = first_match(&DATE_RULES, &ctx, Axis::Date);
    if let Some(idx) = date {
        ctx.claimed.push(idx);
    }

    let entity = first_match(&ENTITY_RULES, &ctx, Axis::Entity);
    if let Some(idx) = entity {
        ctx.claimed.push(idx);
        ctx.entity_resolved = true;
    }

    let measure = first_match(&MEASURE_RULES, &ctx, Axis::Measure);

    let name = |idx: usize| table.columns()[idx].name.clone();
    let inferred = InferredSchema {
        date_column: date.map(name),
        entity_column: entity.map(name),
        measure,
    };
    debug!(?inferred, shape = ?inferred.shape(), "schema inferred");
    inferred
}

/// Infer and bind in one step; fails naming the first unresolved axis.
pub fn infer_binding(
    table: &RawTable,
    hints: &SchemaHints,
    config: &InferenceConfig,
) -> Result<SchemaBinding> {
    infer(table, hints, config).bind(table)
}

fn first_match<T>(rules: &[Rule<T>], ctx: &RuleContext<'_>, axis: Axis) -> Option<T> {
    for rule in rules {
        if let Some(found) = (rule.apply)(ctx) {
            debug!(%axis, rule = rule.name, "rule matched");
            return Some(found);
        }
    }
    debug!(%axis, "no rule matched");
    None
}
