//! Tabular workbook output.
//!
//! A workbook is a set of named sheets, each with an ordered column list and
//! rows of cell values. It is persisted as a single pretty-printed JSON
//! document so later runs can read it back.
//!
//! # Output Structure
//!
//! ```text
//! {
//!   "sheets": [
//!     { "name": "youtube_base", "columns": ["title", "link", ...], "rows": [[...], ...] },
//!     { "name": "youtube_with_extras", "columns": [...], "rows": [[...], ...] }
//!   ]
//! }
//! ```
//!
//! Records are projected onto a sheet through their serde representation, so
//! any `Serialize` struct whose field names match the columns can be written,
//! and any `Deserialize` struct with defaults can be read back.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// A named table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Sheet {
    /// Project `records` onto `columns`. Fields missing from a record become `null`.
    pub fn from_records<T: Serialize>(
        name: &str,
        columns: &[&str],
        records: &[T],
    ) -> Result<Self, serde_json::Error> {
        let rows = records
            .iter()
            .map(|record| -> Result<Vec<Value>, serde_json::Error> {
                let value = serde_json::to_value(record)?;
                Ok(columns
                    .iter()
                    .map(|col| value.get(*col).cloned().unwrap_or(Value::Null))
                    .collect())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Sheet {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }

    /// Read every row back as a `T`, matching cells to fields by column name.
    pub fn records<T: DeserializeOwned>(&self) -> Result<Vec<T>, serde_json::Error> {
        self.rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .filter(|(_, v)| !v.is_null())
                    .collect();
                serde_json::from_value(Value::Object(object))
            })
            .collect()
    }
}

/// An ordered set of sheets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Write `workbook` to `path`, creating the parent directory if needed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_workbook(workbook: &Workbook, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(workbook)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(
        sheets = workbook.sheets.len(),
        rows = workbook.sheets.first().map_or(0, |s| s.rows.len()),
        "Wrote workbook"
    );
    Ok(())
}

/// Read a workbook previously written by [`write_workbook`].
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_workbook(path: &Path) -> Result<Workbook, Box<dyn Error>> {
    let raw = fs::read_to_string(path).await?;
    let workbook: Workbook = serde_json::from_str(&raw)?;
    info!(sheets = workbook.sheets.len(), "Read workbook");
    Ok(workbook)
}
