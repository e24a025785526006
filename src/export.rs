//! Export harvested records as JSON.
//!
//! Produces a single document with every stored record ordered by uid,
//! for handing the data to other tools without giving them the SQLite file.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use crate::config::Config;
use crate::models::PersonRecord;
use crate::store::RecordStore;

#[derive(Debug, Serialize)]
pub struct ExportData {
    pub exported_at: DateTime<Utc>,
    pub count: usize,
    pub records: Vec<PersonRecord>,
}

/// Read every record from `store` into an export document.
pub async fn collect_export(store: &RecordStore) -> Result<ExportData> {
    let records = store.all().await?;
    Ok(ExportData {
        exported_at: Utc::now(),
        count: records.len(),
        records,
    })
}

/// Export records as JSON.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub async fn run_export(config: &Config, output: Option<&Path>) -> Result<()> {
    let store = RecordStore::open(&config.db.path).await?;
    let data = collect_export(&store).await;
    store.close().await;
    let data = data?;

    let json = serde_json::to_string_pretty(&data)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &json)?;
            eprintln!("Exported {} records to {}", data.count, path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
