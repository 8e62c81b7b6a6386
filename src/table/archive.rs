use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

use crate::error::{Error, Result};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

pub fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC)
}

/// Pull the first `.csv` entry (in archive order) out of an in-memory ZIP.
pub fn extract_first_csv(source_name: &str, bytes: &[u8]) -> Result<Vec<u8>> {
    let not_found = |detail: String| Error::SourceNotFound {
        source_name: source_name.to_string(),
        detail,
    };

    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| not_found(format!("failed to read ZIP archive: {}", e)))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| not_found(format!("failed to access ZIP entry #{}: {}", i, e)))?;
        let name = entry.name().to_string();
        if !entry.is_file() || !name.to_lowercase().ends_with(".csv") {
            continue;
        }

        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut buf)
            .map_err(|e| not_found(format!("failed to read {} into memory: {}", name, e)))?;
        debug!(source = source_name, entry = %name, bytes = buf.len(), "using archive entry");
        return Ok(buf);
    }

    Err(not_found("archive contains no .csv entry".into()))
}
