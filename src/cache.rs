use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::SystemTime,
};
use tracing::debug;

use crate::config::LoaderConfig;
use crate::error::{Error, Result};
use crate::table::{load, RawTable, TableSource};

/// Identity of a file on disk at the time it was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Stamp {
    modified: Option<SystemTime>,
    len: u64,
}

type Entries = HashMap<PathBuf, (Stamp, Arc<RawTable>)>;

/// Session-scoped memo of tables loaded from paths.
///
/// Keyed by canonical path; an entry is reused only while the file's
/// modification time and length are unchanged.
pub struct TableCache {
    config: LoaderConfig,
    map: RwLock<Entries>,
}

impl TableCache {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            map: RwLock::new(HashMap::new()),
        }
    }

    /// Load `source`, reusing a cached table when the file is unchanged.
    /// Byte sources are always loaded fresh.
    pub fn get(&self, source: &TableSource) -> Result<Arc<RawTable>> {
        let path = match source {
            TableSource::Path(p) => p,
            TableSource::Bytes { .. } => return load(source, &self.config).map(Arc::new),
        };

        let (key, stamp) = stamp_of(path)?;
        if let Some((cached, table)) = self.read_map().get(&key) {
            if *cached == stamp {
                debug!(path = %key.display(), "table cache hit");
                return Ok(Arc::clone(table));
            }
        }

        let table = Arc::new(load(source, &self.config)?);
        debug!(path = %key.display(), "table cache fill");
        self.write_map().insert(key, (stamp, Arc::clone(&table)));
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.read_map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.write_map().clear();
    }

    // poisoning is ignored: entries are immutable once inserted
    fn read_map(&self) -> RwLockReadGuard<'_, Entries> {
        self.map.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_map(&self) -> RwLockWriteGuard<'_, Entries> {
        self.map.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn stamp_of(path: &Path) -> Result<(PathBuf, Stamp)> {
    let not_found = |e: std::io::Error| Error::SourceNotFound {
        source_name: path.display().to_string(),
        detail: e.to_string(),
    };
    let key = fs::canonicalize(path).map_err(not_found)?;
    let meta = fs::metadata(&key).map_err(not_found)?;
    Ok((
        key,
        Stamp {
            modified: meta.modified().ok(),
            len: meta.len(),
        },
    ))
}
