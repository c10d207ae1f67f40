//! JSON snapshots of table metadata.
//!
//! A snapshot lets a registry be rebuilt without a database round trip, for
//! example to validate a deployed schema against the one the code expects.

use crate::column::Columns;
use chrono::{DateTime, Utc};
use dmlkit::{ErrorKind, SqlError, SqlResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    #[serde(default)]
    pub is_view: bool,
    pub columns: Columns,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablesSnapshot {
    pub version: u32,
    pub retrieved_at: DateTime<Utc>,
    pub tables: BTreeMap<String, TableSnapshot>,
}

impl TablesSnapshot {
    pub fn new(tables: BTreeMap<String, TableSnapshot>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            retrieved_at: Utc::now(),
            tables,
        }
    }

    pub fn from_json(data: &[u8]) -> SqlResult<Self> {
        let snapshot: Self = serde_json::from_slice(data)
            .map_err(|e| SqlError::not_valid(format!("failed to parse snapshot: {e}")))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SqlError::not_supported(format!(
                "snapshot version {} not supported, expected {SNAPSHOT_VERSION}",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }

    pub fn to_json(&self) -> SqlResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(SqlError::driver)
    }

    pub fn read(path: &Path) -> SqlResult<Self> {
        let data = std::fs::read(path).map_err(|e| io_error("read", path, e))?;
        Self::from_json(&data)
    }

    /// Write to `path` through a temporary file, creating parent directories.
    pub fn write(&self, path: &Path) -> SqlResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| io_error("create directory for", path, e))?;
        }

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, self.to_json()?).map_err(|e| io_error("write", path, e))?;
        std::fs::rename(&tmp_path, path).map_err(|e| io_error("replace", path, e))?;
        Ok(())
    }
}

/// Keep the I/O error as the source, naming the file; a missing file is
/// tagged `NotFound`.
fn io_error(what: &str, path: &Path, e: std::io::Error) -> SqlError {
    let kind = e.kind();
    let err = std::io::Error::new(
        kind,
        format!("failed to {what} snapshot {}: {e}", path.display()),
    );
    match kind {
        std::io::ErrorKind::NotFound => SqlError::driver_with_kind(ErrorKind::NotFound, err),
        _ => SqlError::driver(err),
    }
}
