//! Portal login.
//!
//! The portal protects its login form with an anti-forgery token embedded
//! as a hidden input. Logging in is a three-step handshake:
//!
//! 1. `GET` the portal root and parse the login form.
//! 2. Read the token from the configured hidden-input selector.
//! 3. `POST` the token with the username and password to the login endpoint.
//!
//! The resulting [`Session`] owns a cookie-carrying HTTP client and is used
//! for every profile fetch afterwards. There is no renewal: if the portal
//! expires the session mid-run, later fetches fail and are skipped.

use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::PortalConfig;
use crate::credentials::Credentials;
use crate::error::HarvestError;
use crate::traits::ProfileSource;

/// An authenticated portal session.
pub struct Session {
    client: Client,
    profile_url: Url,
    profile_id_param: String,
}

impl Session {
    /// URL of the profile page for `uid`.
    pub fn profile_url(&self, uid: i64) -> Url {
        let mut url = self.profile_url.clone();
        url.query_pairs_mut()
            .append_pair(&self.profile_id_param, &uid.to_string());
        url
    }
}

#[async_trait]
impl ProfileSource for Session {
    async fn fetch_profile(&self, uid: i64) -> Result<String, HarvestError> {
        let url = self.profile_url(uid);
        debug!(uid, url = %url, "fetching profile");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HarvestError::fetch(uid, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(HarvestError::fetch(uid, format!("HTTP {}", status)));
        }

        resp.text()
            .await
            .map_err(|e| HarvestError::fetch(uid, format!("failed to read body: {}", e)))
    }
}

/// Log in to the portal and return an authenticated [`Session`].
///
/// # Errors
///
/// Returns [`HarvestError::Authentication`] if:
/// - the login page cannot be fetched or answers non-2xx
/// - the token element is missing or has no `value` attribute
/// - the credential submission fails or answers non-2xx
/// - `login_error_selector` is set and matches the login response
pub async fn authenticate(
    portal: &PortalConfig,
    credentials: &Credentials,
) -> Result<Session, HarvestError> {
    let base = portal
        .base()
        .map_err(|e| HarvestError::Authentication(e.to_string()))?;
    let login_url = join(&base, &portal.login_path)?;
    let profile_url = join(&base, &portal.profile_path)?;

    let token_selector = parse_selector("token_selector", &portal.token_selector)?;
    let error_selector = portal
        .login_error_selector
        .as_deref()
        .map(|s| parse_selector("login_error_selector", s))
        .transpose()?;

    let client = build_client(portal)?;

    // Step 1: login page
    let resp = client
        .get(base.clone())
        .send()
        .await
        .map_err(|e| auth_error(format!("could not fetch login page {}: {}", base, e)))?;
    if !resp.status().is_success() {
        return Err(auth_error(format!(
            "login page {} returned HTTP {}",
            base,
            resp.status()
        )));
    }
    let login_page = resp
        .text()
        .await
        .map_err(|e| auth_error(format!("could not read login page: {}", e)))?;

    // Step 2: anti-forgery token
    let token = find_token(&login_page, &token_selector).ok_or_else(|| {
        auth_error(format!(
            "login token not found on {} (selector '{}')",
            base, portal.token_selector
        ))
    })?;
    debug!("found login token");

    // Step 3: submit credentials
    let form = [
        (portal.token_field.as_str(), token.as_str()),
        ("username", credentials.username.as_str()),
        ("password", credentials.password.as_str()),
    ];
    let resp = client
        .post(login_url.clone())
        .form(&form)
        .send()
        .await
        .map_err(|e| auth_error(format!("could not submit credentials to {}: {}", login_url, e)))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(auth_error(format!(
            "login rejected by {} (HTTP {})",
            login_url, status
        )));
    }

    if let Some(selector) = error_selector {
        let body = resp
            .text()
            .await
            .map_err(|e| auth_error(format!("could not read login response: {}", e)))?;
        if let Some(message) = find_text(&body, &selector) {
            return Err(auth_error(format!("portal rejected credentials: {}", message)));
        }
    }

    info!(user = %credentials.username, portal = %base, "logged in");

    Ok(Session {
        client,
        profile_url,
        profile_id_param: portal.profile_id_param.clone(),
    })
}

fn build_client(portal: &PortalConfig) -> Result<Client, HarvestError> {
    let mut builder = Client::builder()
        .cookie_store(true)
        .user_agent(portal.user_agent.clone());
    if let Some(secs) = portal.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| auth_error(format!("could not build HTTP client: {}", e)))
}

/// Join a config path under the portal base. A leading `/` is ignored so
/// portals installed under a sub-path keep their prefix.
fn join(base: &Url, path: &str) -> Result<Url, HarvestError> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| auth_error(format!("invalid portal path '{}': {}", path, e)))
}

fn parse_selector(key: &str, selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector)
        .map_err(|e| auth_error(format!("invalid portal.{} '{}': {}", key, selector, e)))
}

fn find_token(page: &str, selector: &Selector) -> Option<String> {
    let document = Html::parse_document(page);
    let element = document.select(selector).next()?;
    element
        .value()
        .attr("value")
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn find_text(page: &str, selector: &Selector) -> Option<String> {
    let document = Html::parse_document(page);
    document
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

fn auth_error(msg: String) -> HarvestError {
    HarvestError::Authentication(msg)
}
