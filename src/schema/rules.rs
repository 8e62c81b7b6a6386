//! Ordered, independent rules per axis. Each rule looks at the table and
//! either claims a column or passes; the first rule that claims wins.

use std::collections::HashSet;
use tracing::warn;

use super::types::{Measure, SchemaHints};
use crate::config::InferenceConfig;
use crate::table::{parse_date, utils::clean_str, ColumnKind, RawTable};

/// Everything a rule may look at. `claimed` holds columns already bound to
/// an earlier axis; rules never return those.
pub struct RuleContext<'a> {
    pub table: &'a RawTable,
    pub hints: &'a SchemaHints,
    pub config: &'a InferenceConfig,
    pub claimed: Vec<usize>,
    pub entity_resolved: bool,
}

impl<'a> RuleContext<'a> {
    pub fn new(table: &'a RawTable, hints: &'a SchemaHints, config: &'a InferenceConfig) -> Self {
        Self {
            table,
            hints,
            config,
            claimed: Vec::new(),
            entity_resolved: false,
        }
    }

    fn unclaimed(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.table.columns().len()).filter(move |i| !self.claimed.contains(i))
    }

    fn hinted(&self, axis: &str, hint: Option<&String>) -> Option<usize> {
        let name = hint?;
        match self.table.column_index(name.trim()) {
            Some(idx) if !self.claimed.contains(&idx) => Some(idx),
            Some(_) => {
                warn!(axis, hint = %name, "hinted column already bound to another axis; ignoring");
                None
            }
            None => {
                warn!(axis, hint = %name, source = self.table.source(), "hinted column not in table; ignoring");
                None
            }
        }
    }

    fn first_with_token(&self, tokens: &[String]) -> Option<usize> {
        let tokens: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        self.unclaimed().find(|&i| {
            let name = self.table.columns()[i].name.to_lowercase();
            tokens.iter().any(|t| !t.is_empty() && name.contains(t.as_str()))
        })
    }

    fn numeric_columns(&self) -> Vec<usize> {
        self.unclaimed()
            .filter(|&i| self.table.is_mostly_numeric(i))
            .collect()
    }
}

pub struct Rule<T> {
    pub name: &'static str,
    pub apply: fn(&RuleContext<'_>) -> Option<T>,
}

pub const DATE_RULES: [Rule<usize>; 3] = [
    Rule {
        name: "hint",
        apply: date_hint,
    },
    Rule {
        name: "name_token",
        apply: date_name_token,
    },
    Rule {
        name: "full_parse",
        apply: date_full_parse,
    },
];

pub const ENTITY_RULES: [Rule<usize>; 3] = [
    Rule {
        name: "hint",
        apply: entity_hint,
    },
    Rule {
        name: "name_token",
        apply: entity_name_token,
    },
    Rule {
        name: "cardinality",
        apply: entity_cardinality,
    },
];

pub const MEASURE_RULES: [Rule<Measure>; 4] = [
    Rule {
        name: "hint",
        apply: measure_hint,
    },
    Rule {
        name: "name_token",
        apply: measure_name_token,
    },
    Rule {
        name: "wide_shape",
        apply: measure_wide_shape,
    },
    Rule {
        name: "first_numeric",
        apply: measure_first_numeric,
    },
];

pub fn date_hint(ctx: &RuleContext<'_>) -> Option<usize> {
    ctx.hinted("date", ctx.hints.date.as_ref())
}

pub fn date_name_token(ctx: &RuleContext<'_>) -> Option<usize> {
    ctx.first_with_token(&ctx.config.date_tokens)
}

/// First column with at least one non-empty cell where every non-empty cell
/// is a calendar date.
pub fn date_full_parse(ctx: &RuleContext<'_>) -> Option<usize> {
    ctx.unclaimed().find(|&i| {
        let mut seen = false;
        for cell in ctx.table.column_values(i).map(clean_str) {
            if cell.is_empty() {
                continue;
            }
            if parse_date(cell).is_none() {
                return false;
            }
            seen = true;
        }
        seen
    })
}

pub fn entity_hint(ctx: &RuleContext<'_>) -> Option<usize> {
    ctx.hinted("entity", ctx.hints.entity.as_ref())
}

pub fn entity_name_token(ctx: &RuleContext<'_>) -> Option<usize> {
    ctx.first_with_token(&ctx.config.entity_tokens)
}

/// First text column with more than one distinct value but fewer than
/// `row_count * cardinality_ratio`: not constant, not an identifier.
/// Measure columns with a few malformed cells are not candidates.
pub fn entity_cardinality(ctx: &RuleContext<'_>) -> Option<usize> {
    let bound = ctx.table.row_count() as f64 * ctx.config.cardinality_ratio;
    ctx.unclaimed()
        .filter(|&i| {
            ctx.table.columns()[i].kind == ColumnKind::Text && !ctx.table.is_mostly_numeric(i)
        })
        .find(|&i| {
            let distinct: HashSet<&str> = ctx
                .table
                .column_values(i)
                .map(clean_str)
                .filter(|v| !v.is_empty())
                .collect();
            distinct.len() > 1 && (distinct.len() as f64) < bound
        })
}

pub fn measure_hint(ctx: &RuleContext<'_>) -> Option<Measure> {
    ctx.hinted("measure", ctx.hints.measure.as_ref())
        .map(|i| Measure::Column(ctx.table.columns()[i].name.clone()))
}

pub fn measure_name_token(ctx: &RuleContext<'_>) -> Option<Measure> {
    ctx.first_with_token(&ctx.config.measure_tokens)
        .map(|i| Measure::Column(ctx.table.columns()[i].name.clone()))
}

/// No entity column and several numeric columns: one column per entity.
pub fn measure_wide_shape(ctx: &RuleContext<'_>) -> Option<Measure> {
    (!ctx.entity_resolved && ctx.numeric_columns().len() >= 2).then_some(Measure::PerEntity)
}

pub fn measure_first_numeric(ctx: &RuleContext<'_>) -> Option<Measure> {
    ctx.numeric_columns()
        .first()
        .map(|&i| Measure::Column(ctx.table.columns()[i].name.clone()))
}
