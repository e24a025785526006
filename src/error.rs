//! Harvest error taxonomy.
//!
//! Only failures that change control flow get a variant here. A profile page
//! without a name is an expected outcome and is modelled as `None` by the
//! extractor, not as an error.

use thiserror::Error;

/// Errors raised by the authenticator, the profile source and the store.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Login page unreachable, token absent, or credentials rejected.
    /// Fatal: the harvest cannot start without a session.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Transport failure or non-2xx response for a single identifier.
    /// Recovered by the harvester loop.
    #[error("failed to fetch profile {uid}: {reason}")]
    Fetch { uid: i64, reason: String },

    /// Write or connection failure in the record store.
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl HarvestError {
    pub(crate) fn fetch(uid: i64, reason: impl Into<String>) -> Self {
        HarvestError::Fetch {
            uid,
            reason: reason.into(),
        }
    }
}
