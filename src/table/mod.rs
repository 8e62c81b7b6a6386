// src/table/mod.rs
use csv::{ReaderBuilder, StringRecord};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use crate::config::LoaderConfig;
use crate::error::{Error, Result};

pub mod archive;
pub mod date_parser;
pub mod decode;
pub mod derive;
pub mod raw_table;
pub mod utils;

pub use date_parser::parse_date;
pub use raw_table::{Column, ColumnKind, RawTable};
pub use utils::parse_number;

/// Where a table comes from: a file on disk or a buffer already in memory.
#[derive(Debug, Clone)]
pub enum TableSource {
    Path(PathBuf),
    Bytes { name: String, bytes: Vec<u8> },
}

impl TableSource {
    pub fn path(p: impl Into<PathBuf>) -> Self {
        Self::Path(p.into())
    }

    pub fn bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Bytes { name, .. } => name.clone(),
        }
    }
}

impl fmt::Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Load `source` into a [`RawTable`]:
/// 1) read the bytes (unwrapping a ZIP archive if that is what we got)
/// 2) decode them with the configured encoding chain
/// 3) parse CSV, trim headers, pad/truncate rows to the header width
/// 4) derive a kind for every column
#[tracing::instrument(level = "info", skip(source, config), fields(source = %source))]
pub fn load(source: &TableSource, config: &LoaderConfig) -> Result<RawTable> {
    let name = source.name();
    let bytes = match source {
        TableSource::Path(p) => read_path(p)?,
        TableSource::Bytes { bytes, .. } => bytes.clone(),
    };
    load_bytes(&name, &bytes, config)
}

fn read_path(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::SourceNotFound {
        source_name: path.display().to_string(),
        detail: e.to_string(),
    })
}

fn load_bytes(name: &str, bytes: &[u8], config: &LoaderConfig) -> Result<RawTable> {
    let extracted;
    let bytes = if archive::is_zip(bytes) {
        extracted = archive::extract_first_csv(name, bytes)?;
        extracted.as_slice()
    } else {
        bytes
    };

    let encodings = config.resolve_encodings()?;
    let text = decode::decode_with_fallback(name, bytes, &encodings)?;
    parse_csv(name, &text, config.delimiter_byte()?)
}

fn parse_csv(name: &str, text: &str, delimiter: u8) -> Result<RawTable> {
    let malformed = |e: csv::Error| Error::Malformed {
        source_name: name.to_string(),
        detail: e.to_string(),
    };

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true) // keep this so records with different field-counts work
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(malformed)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() || text.trim().is_empty() {
        return Err(Error::EmptyTable {
            source_name: name.to_string(),
        });
    }

    let width = headers.len();
    let mut rows = Vec::new();
    let mut truncated = 0usize;
    let mut record = StringRecord::new();
    while rdr.read_record(&mut record).map_err(malformed)? {
        if record.len() > width {
            truncated += 1;
        }
        let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }
    if truncated > 0 {
        warn!(
            source = name,
            truncated, width, "some rows have more cells than headers; extra cells dropped"
        );
    }

    let columns = headers
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let kind = derive::derive_kind(&name, idx, &rows);
            Column { name, kind }
        })
        .collect();

    let table = RawTable::new(name.to_string(), columns, rows);
    info!(
        source = name,
        columns = table.columns().len(),
        rows = table.row_count(),
        "loaded table"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use encoding_rs::EUC_KR;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    use zip::write::SimpleFileOptions;

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,trendmatch=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    #[test]
    fn test_load_path_trims_headers_and_keeps_cells() -> Result<()> {
        init_test_logging();
        let mut tmp = NamedTempFile::new()?;
        write!(
            tmp,
            " date , dessert ,search_count\n2024-01-01, latte ,3\n2024-01-02,mocha,x\n"
        )?;

        let table = load(&TableSource::path(tmp.path()), &LoaderConfig::default())?;
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["date", "dessert", "search_count"]
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0][1], " latte ");
        assert_eq!(table.columns()[0].kind, ColumnKind::Date);
        assert_eq!(table.columns()[1].kind, ColumnKind::Text);
        assert_eq!(table.columns()[2].kind, ColumnKind::Text);
        Ok(())
    }

    #[test]
    fn test_missing_path() {
        let err = load(
            &TableSource::path("/no/such/DESSERT.csv"),
            &LoaderConfig::default(),
        )
        .unwrap_err();
        match err {
            Error::SourceNotFound { source_name, .. } => {
                assert_eq!(source_name, "/no/such/DESSERT.csv")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_source() {
        let err = load(&TableSource::bytes("empty", ""), &LoaderConfig::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyTable { .. }));
    }

    #[test]
    fn test_legacy_encoding_fallback() -> Result<()> {
        let (bytes, _, _) = EUC_KR.encode("날짜,라떼,아메리카노\n2024-01-01,3,5\n");
        let table = load(
            &TableSource::bytes("DESSERT.csv", bytes.into_owned()),
            &LoaderConfig::default(),
        )?;
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["날짜", "라떼", "아메리카노"]
        );
        assert_eq!(table.columns()[1].kind, ColumnKind::Integer);
        Ok(())
    }

    #[test]
    fn test_undecodable_source() {
        let config = LoaderConfig {
            encodings: vec!["utf-8".into()],
            ..LoaderConfig::default()
        };
        let err = load(&TableSource::bytes("bin", vec![0xFF, 0xFE, 0x41]), &config).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_ragged_rows_are_padded_and_truncated() -> Result<()> {
        let table = load(
            &TableSource::bytes("ragged", "a,b\n1\n2,3,4\n"),
            &LoaderConfig::default(),
        )?;
        assert_eq!(table.rows()[0], vec!["1".to_string(), String::new()]);
        assert_eq!(table.rows()[1], vec!["2".to_string(), "3".to_string()]);
        Ok(())
    }

    #[test]
    fn test_custom_delimiter() -> Result<()> {
        let config = LoaderConfig {
            delimiter: ';',
            ..LoaderConfig::default()
        };
        let table = load(&TableSource::bytes("semi", "a;b\n1;2\n"), &config)?;
        assert_eq!(table.columns().len(), 2);
        Ok(())
    }

    #[test]
    fn test_load_csv_from_zip() -> Result<()> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file("CAFE.csv", SimpleFileOptions::default())?;
            zip.write_all("cafe_name,dessert\nBean,latte\n".as_bytes())?;
            zip.finish()?;
        }
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(&buf)?;

        let table = load(&TableSource::path(tmp.path()), &LoaderConfig::default())?;
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows()[0][0], "Bean");
        Ok(())
    }
}
