use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use glob::glob;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use trendmatch::{
    cache::TableCache,
    config::{Config, SourcesConfig},
    matcher::{self, DescriptorSpec, MatchMode},
    schema::{self, SchemaBinding, SchemaHints, TableShape},
    table::{RawTable, TableSource},
    trend::{self, DailyPoint, DailySeries},
};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Daily trend of an entity plus matching rows from a cross-reference table"
)]
struct Cli {
    /// YAML config file (falls back to $TRENDMATCH_CONFIG, then defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Trend table; discovered under `sources.data_dir` when omitted
    #[arg(long, global = true)]
    trend_file: Option<PathBuf>,
    /// Cross-reference table; discovered under `sources.data_dir` when omitted
    #[arg(long, global = true)]
    xref_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List selectable entities and the date coverage of the trend table
    Entities(HintArgs),
    /// Daily series for one entity over an inclusive date range
    Trend {
        #[arg(short, long)]
        entity: Option<String>,
        /// First day (YYYY-MM-DD); defaults to the earliest day in the data
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD); defaults to the latest day in the data
        #[arg(long)]
        end: Option<NaiveDate>,
        #[command(flatten)]
        hints: HintArgs,
    },
    /// Rows of the cross-reference table that mention an entity
    Match {
        #[arg(short, long)]
        entity: String,
        /// Column to search; repeat for several. Inferred when omitted.
        #[arg(long = "descriptor")]
        descriptors: Vec<String>,
        /// Numeric column to rank by, highest first
        #[arg(long)]
        rank: Option<String>,
        /// Require equality instead of substring containment
        #[arg(long)]
        exact: bool,
    },
}

#[derive(Args)]
struct HintArgs {
    #[arg(long)]
    date_column: Option<String>,
    #[arg(long)]
    entity_column: Option<String>,
    #[arg(long)]
    measure_column: Option<String>,
}

impl From<HintArgs> for SchemaHints {
    fn from(h: HintArgs) -> Self {
        Self {
            date: h.date_column,
            entity: h.entity_column,
            measure: h.measure_column,
        }
    }
}

#[derive(Serialize)]
struct EntitiesReport {
    source: String,
    shape: TableShape,
    binding: SchemaBinding,
    entities: Vec<String>,
    first_day: Option<NaiveDate>,
    last_day: Option<NaiveDate>,
}

#[derive(Serialize)]
struct TrendReport {
    source: String,
    entity: Option<String>,
    start: NaiveDate,
    end: NaiveDate,
    total: f64,
    peak: Option<DailyPoint>,
    series: DailySeries,
}

fn main() -> Result<()> {
    // logs go to stderr so stdout stays machine-readable
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let cache = TableCache::new(config.loader.clone());

    match cli.command {
        Command::Entities(hints) => {
            let path = source_path(cli.trend_file, &config.sources, &config.sources.trend)?;
            let table = cache.get(&TableSource::Path(path))?;
            let binding = bind(&table, hints.into(), &config)?;
            let coverage = schema::date_coverage(&table, &binding);
            print_json(&EntitiesReport {
                source: table.source().to_string(),
                shape: binding.shape(),
                entities: schema::entities(&table, &binding),
                first_day: coverage.map(|c| c.0),
                last_day: coverage.map(|c| c.1),
                binding,
            })
        }

        Command::Trend {
            entity,
            start,
            end,
            hints,
        } => {
            let path = source_path(cli.trend_file, &config.sources, &config.sources.trend)?;
            let table = cache.get(&TableSource::Path(path))?;
            let binding = bind(&table, hints.into(), &config)?;

            let (start, end) = match (start, end, schema::date_coverage(&table, &binding)) {
                (Some(s), Some(e), _) => (s, e),
                (s, e, Some((lo, hi))) => (s.unwrap_or(lo), e.unwrap_or(hi)),
                (_, _, None) => bail!(
                    "no parseable dates in `{}`; pass --start and --end",
                    binding.date_column()
                ),
            };

            let series = trend::query(&table, &binding, entity.as_deref(), start, end)
                .with_context(|| format!("querying trend in {}", table.source()))?;
            info!(days = series.len(), "trend ready");
            print_json(&TrendReport {
                source: table.source().to_string(),
                entity,
                start,
                end,
                total: series.total(),
                peak: series.peak(),
                series,
            })
        }

        Command::Match {
            entity,
            descriptors,
            rank,
            exact,
        } => {
            let path = source_path(cli.xref_file, &config.sources, &config.sources.xref)?;
            let table = cache.get(&TableSource::Path(path))?;
            let spec = if descriptors.is_empty() {
                DescriptorSpec::Infer
            } else {
                DescriptorSpec::Columns(descriptors)
            };
            let mode = if exact {
                MatchMode::Exact
            } else {
                config.matcher.mode
            };
            let rank = rank.or_else(|| config.matcher.rank_column.clone());

            let set = matcher::match_rows(
                &table,
                &entity,
                &spec,
                rank.as_deref(),
                mode,
                &config.matcher,
            )
            .with_context(|| format!("matching `{}` in {}", entity, table.source()))?;
            info!(matches = set.len(), "cross-reference ready");
            print_json(&set)
        }
    }
}

fn bind(table: &RawTable, hints: SchemaHints, config: &Config) -> Result<SchemaBinding> {
    schema::infer_binding(table, &hints, &config.inference).with_context(|| {
        format!(
            "inferring columns of {}; pass --date-column/--entity-column/--measure-column",
            table.source()
        )
    })
}

/// Explicit path wins; otherwise the first file matching `pattern` under
/// the data directory.
fn source_path(explicit: Option<PathBuf>, sources: &SourcesConfig, pattern: &str) -> Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p);
    }
    let full = Path::new(&sources.data_dir).join(pattern);
    let full = full.to_string_lossy();
    let mut paths: Vec<PathBuf> = glob(&full)
        .context(format!("Failed to parse glob pattern: {}", full))?
        .filter_map(|p| p.ok())
        .collect();
    paths.sort();

    match paths.into_iter().next() {
        Some(p) => {
            info!(path = %p.display(), "discovered source");
            Ok(p)
        }
        None => bail!("no file matches {}", full),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{}", text);
    Ok(())
}
