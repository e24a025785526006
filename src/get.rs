//! Record retrieval by uid.
//!
//! Backs the `harvest get` command.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::models::PersonRecord;
use crate::store::RecordStore;

/// Core get function returning the stored record.
pub async fn get_record(config: &Config, uid: i64) -> Result<PersonRecord> {
    let store = RecordStore::open(&config.db.path).await?;
    let record = store.get(uid).await;
    store.close().await;

    match record? {
        Some(r) => Ok(r),
        None => bail!("record not found: {}", uid),
    }
}

/// CLI entry point. Calls get_record and prints to stdout.
pub async fn run_get(config: &Config, uid: i64) -> Result<()> {
    let record = get_record(config, uid).await?;

    println!("--- Record ---");
    println!("uid:               {}", record.uid);
    println!("name:              {}", record.name);
    println!("local_address:     {}", or_dash(&record.local_address));
    println!("permanent_address: {}", or_dash(&record.permanent_address));
    println!("national_id:       {}", or_dash(&record.national_id));
    println!("phone:             {}", or_dash(&record.phone));

    Ok(())
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
