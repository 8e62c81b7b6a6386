//! Engine configuration: encodings, inference tokens, matcher defaults and
//! where the two source tables live.
//!
//! Everything has a default, so an absent file (or an empty one) yields a
//! working configuration. The file is YAML:
//!
//! ```yaml
//! loader:
//!   encodings: [utf-8, euc-kr]
//! inference:
//!   cardinality_ratio: 0.5
//! sources:
//!   data_dir: ./data
//!   trend: "DESSERT*.csv"
//! ```

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::matcher::MatchMode;

/// Environment variable consulted when no explicit config path is given.
pub const CONFIG_ENV: &str = "TRENDMATCH_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub loader: LoaderConfig,
    pub inference: InferenceConfig,
    pub matcher: MatcherConfig,
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoaderConfig {
    /// Encoding labels tried in order; first strict decode wins.
    pub encodings: Vec<String>,
    pub delimiter: char,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            encodings: vec!["utf-8".into(), "euc-kr".into()],
            delimiter: ',',
        }
    }
}

impl LoaderConfig {
    /// Resolve the configured labels to decoders, rejecting unknown ones.
    pub fn resolve_encodings(&self) -> Result<Vec<&'static Encoding>> {
        self.encodings
            .iter()
            .map(|label| {
                Encoding::for_label(label.trim().as_bytes())
                    .ok_or_else(|| Error::Config(format!("unknown encoding label `{}`", label)))
            })
            .collect()
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                Error::Config(format!(
                    "delimiter `{}` must be a single ASCII character",
                    self.delimiter
                ))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InferenceConfig {
    pub date_tokens: Vec<String>,
    pub entity_tokens: Vec<String>,
    pub measure_tokens: Vec<String>,
    /// An entity column must have fewer distinct values than
    /// `row_count * cardinality_ratio`.
    pub cardinality_ratio: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            date_tokens: strings(&["date", "day", "time", "날짜", "일자"]),
            entity_tokens: strings(&["name", "item", "dessert", "menu", "디저트", "메뉴"]),
            measure_tokens: strings(&["count", "search", "value", "freq", "volume", "검색"]),
            cardinality_ratio: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatcherConfig {
    pub descriptor_tokens: Vec<String>,
    pub rank_column: Option<String>,
    pub mode: MatchMode,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            descriptor_tokens: strings(&["menu", "dessert", "item", "product", "디저트", "메뉴"]),
            rank_column: None,
            mode: MatchMode::Substring,
        }
    }
}

/// Where the CLI looks for tables when no explicit file is passed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourcesConfig {
    pub data_dir: PathBuf,
    /// Glob pattern (relative to `data_dir`) for the trend table.
    pub trend: String,
    /// Glob pattern (relative to `data_dir`) for the cross-reference table.
    pub xref: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            trend: "DESSERT*.csv".into(),
            xref: "CAFE*.csv".into(),
        }
    }
}

impl Config {
    /// Load from `path`, else from `$TRENDMATCH_CONFIG`, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => env::var_os(CONFIG_ENV).map(PathBuf::from),
        };

        let config = match path {
            Some(p) => {
                let text = fs::read_to_string(&p).map_err(|e| {
                    Error::Config(format!("reading {}: {}", p.display(), e))
                })?;
                info!(path = %p.display(), "loaded config");
                Self::from_yaml(&text)?
            }
            None => {
                debug!("no config file; using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.loader.encodings.is_empty() {
            return Err(Error::Config("at least one encoding is required".into()));
        }
        self.loader.resolve_encodings()?;
        self.loader.delimiter_byte()?;

        let ratio = self.inference.cardinality_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(Error::Config(format!(
                "cardinality_ratio must be in (0, 1], got {}",
                ratio
            )));
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
