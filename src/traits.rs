//! Seams between the harvester loop and the outside world.
//!
//! The loop never talks to reqwest directly. It asks a [`ProfileSource`]
//! for one page at a time, which lets the production [`Session`] be swapped
//! for an in-memory source in tests.
//!
//! [`Session`]: crate::auth::Session

use async_trait::async_trait;

use crate::error::HarvestError;

/// Something that can produce the profile page for a numeric identifier.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use portal_harvest::error::HarvestError;
/// use portal_harvest::traits::ProfileSource;
///
/// struct Fixed(&'static str);
///
/// #[async_trait]
/// impl ProfileSource for Fixed {
///     async fn fetch_profile(&self, _uid: i64) -> Result<String, HarvestError> {
///         Ok(self.0.to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetch the raw HTML for `uid`.
    ///
    /// Returns [`HarvestError::Fetch`] for transport failures and non-2xx
    /// responses. The harvester treats that as a per-identifier skip.
    async fn fetch_profile(&self, uid: i64) -> Result<String, HarvestError>;
}
