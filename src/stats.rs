//! Store statistics.
//!
//! A quick summary of what has been harvested so far: row count, covered
//! uid span and file size. Used by `harvest stats` to confirm that runs are
//! landing where expected.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::store::RecordStore;

/// Run the stats command: query the store and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let store = RecordStore::open(&config.db.path)
        .await
        .with_context(|| format!("Failed to open store: {}", config.db.path.display()))?;

    let total = store.count().await?;
    let span = store.uid_span().await?;
    let with_phone = store.count_with_phone().await?;
    store.close().await;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Portal Harvest: Store Stats");
    println!("============================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Records:     {}", total);
    match span {
        Some((lo, hi)) => println!("  Uid span:    {} .. {}", lo, hi),
        None => println!("  Uid span:    (empty)"),
    }
    println!("  With phone:  {} / {}", with_phone, total);
    println!();

    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
