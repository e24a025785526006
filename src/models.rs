//! Records that flow from the extractor into the store.

use serde::Serialize;

/// One harvested profile, keyed by the portal's numeric profile id.
///
/// `name` is always non-empty: the extractor drops profiles without one
/// before a record is ever built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonRecord {
    pub uid: i64,
    pub name: String,
    pub local_address: String,
    pub permanent_address: String,
    pub national_id: String,
    pub phone: String,
}

/// Per-run counters reported at the end of a harvest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    /// Identifiers a fetch was issued for.
    pub attempted: u64,
    /// Records written to the store.
    pub saved: u64,
    /// Pages fetched but without a usable name.
    pub skipped: u64,
    /// Transport failures and non-2xx responses.
    pub failed: u64,
    /// Records that could not be written (only with `on_store_error = "skip"`).
    pub store_failed: u64,
}
