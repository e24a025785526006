//! Portal credentials loaded from a local JSON file.
//!
//! ```json
//! { "username": "admin", "password": "secret" }
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Username/password pair, read once at startup and never written back.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub fn load_credentials(path: &Path) -> Result<Credentials> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;

    let creds: Credentials = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse credentials file: {}", path.display()))?;

    if creds.username.trim().is_empty() {
        bail!("credentials file {} has an empty username", path.display());
    }

    Ok(creds)
}
