//! Harvester loop orchestration.
//!
//! Walks an identifier range one id at a time: fetch → extract → upsert →
//! pause. A failed fetch or a page without a profile skips that id and the
//! walk continues; only the store-error policy can end a run early.
//!
//! The walk is strictly sequential with a fixed pause between requests.
//! The pause is the only throttle towards the portal, so fetches are never
//! issued concurrently.

use anyhow::{bail, Context, Result};
use std::ops::Range;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::auth;
use crate::config::{Config, StoreErrorPolicy};
use crate::credentials::load_credentials;
use crate::error::HarvestError;
use crate::extract::FieldExtractor;
use crate::models::HarvestSummary;
use crate::progress::{HarvestProgressEvent, HarvestProgressReporter};
use crate::store::RecordStore;
use crate::traits::ProfileSource;

/// Loop behaviour that is not part of the range itself.
#[derive(Debug, Clone, Copy)]
pub struct HarvestSettings {
    /// Pause between consecutive fetches.
    pub delay: Duration,
    pub on_store_error: StoreErrorPolicy,
}

/// Overrides for a single `harvest run` invocation.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub delay_ms: Option<u64>,
}

/// Walk `range` in ascending order and store every extracted record.
///
/// # Errors
///
/// Only [`HarvestError::Store`] escapes, and only with
/// [`StoreErrorPolicy::Abort`]. Fetch failures and extraction misses are
/// logged, counted and skipped.
pub async fn harvest(
    source: &dyn ProfileSource,
    range: Range<i64>,
    extractor: &FieldExtractor,
    store: &RecordStore,
    settings: &HarvestSettings,
    reporter: &dyn HarvestProgressReporter,
) -> Result<HarvestSummary, HarvestError> {
    let total = range_len(&range);
    let mut summary = HarvestSummary::default();

    for uid in range.clone() {
        if uid > range.start && !settings.delay.is_zero() {
            tokio::time::sleep(settings.delay).await;
        }

        debug!(uid, "harvesting profile");
        summary.attempted += 1;

        match source.fetch_profile(uid).await {
            Err(e) => {
                warn!(uid, error = %e, "skipping identifier");
                summary.failed += 1;
            }
            Ok(body) => match extractor.extract_html(&body, uid) {
                None => {
                    info!(uid, "no profile found");
                    summary.skipped += 1;
                }
                Some(record) => match store.upsert(&record).await {
                    Ok(()) => {
                        info!(uid, name = %record.name, "saved record");
                        summary.saved += 1;
                    }
                    Err(e) => match settings.on_store_error {
                        StoreErrorPolicy::Abort => {
                            error!(uid, error = %e, "store write failed, aborting run");
                            return Err(e);
                        }
                        StoreErrorPolicy::Skip => {
                            error!(uid, error = %e, "store write failed, skipping identifier");
                            summary.store_failed += 1;
                        }
                    },
                },
            },
        }

        reporter.report(HarvestProgressEvent::Harvesting {
            uid,
            n: summary.attempted,
            total,
            saved: summary.saved,
        });
    }

    Ok(summary)
}

/// Number of ids in `range`; an inverted range is empty.
fn range_len(range: &Range<i64>) -> u64 {
    if range.end > range.start {
        range.end.abs_diff(range.start)
    } else {
        0
    }
}

/// CLI entry point for `harvest run`: log in, walk the range, print a summary.
///
/// Authentication happens before the store is opened, so a failed login
/// leaves the store untouched.
pub async fn run_harvest(
    config: &Config,
    options: RunOptions,
    reporter: &dyn HarvestProgressReporter,
) -> Result<HarvestSummary> {
    let start = options.start.unwrap_or(config.harvest.start);
    let end = options.end.unwrap_or(config.harvest.end);
    if start < 0 {
        bail!("start ({}) must not be negative", start);
    }
    if start > end {
        bail!("start ({}) must be <= end ({})", start, end);
    }
    let settings = HarvestSettings {
        delay: Duration::from_millis(options.delay_ms.unwrap_or(config.harvest.delay_ms)),
        on_store_error: config.harvest.on_store_error,
    };

    let extractor = FieldExtractor::from_config(&config.fields)?;
    let credentials = load_credentials(&config.credentials.path)?;

    reporter.report(HarvestProgressEvent::Authenticating {
        portal: config.portal.base_url.clone(),
    });
    let session = auth::authenticate(&config.portal, &credentials).await?;

    let store = RecordStore::open(&config.db.path)
        .await
        .with_context(|| format!("Failed to open store: {}", config.db.path.display()))?;

    info!(start, end, delay_ms = settings.delay.as_millis() as u64, "starting harvest");
    let result = harvest(&session, start..end, &extractor, &store, &settings, reporter).await;
    store.close().await;
    let summary = result?;

    println!("harvest {}..{}", start, end);
    println!("  attempted: {}", summary.attempted);
    println!("  saved: {}", summary.saved);
    println!("  skipped (no profile): {}", summary.skipped);
    println!("  failed: {}", summary.failed);
    if summary.store_failed > 0 {
        println!("  store failures: {}", summary.store_failed);
    }
    println!("ok");

    Ok(summary)
}

/// CLI entry point for `harvest login`: authenticate and report, nothing else.
pub async fn run_login(config: &Config) -> Result<()> {
    let credentials = load_credentials(&config.credentials.path)?;
    auth::authenticate(&config.portal, &credentials).await?;
    println!("login ok: {} @ {}", credentials.username, config.portal.base_url);
    Ok(())
}
