use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub portal: PortalConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub fields: FieldsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PortalConfig {
    pub base_url: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_profile_path")]
    pub profile_path: String,
    #[serde(default = "default_profile_id_param")]
    pub profile_id_param: String,
    #[serde(default = "default_token_selector")]
    pub token_selector: String,
    #[serde(default = "default_token_field")]
    pub token_field: String,
    /// Element present on the login response only when the portal rejected
    /// the credentials but still answered 2xx.
    #[serde(default)]
    pub login_error_selector: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_login_path() -> String {
    "login/index.php".to_string()
}
fn default_profile_path() -> String {
    "user/profile.php".to_string()
}
fn default_profile_id_param() -> String {
    "id".to_string()
}
fn default_token_selector() -> String {
    "#pre-login-form > input:nth-child(1)".to_string()
}
fn default_token_field() -> String {
    "logintoken".to_string()
}
fn default_user_agent() -> String {
    format!("portal-harvest/{}", env!("CARGO_PKG_VERSION"))
}

impl PortalConfig {
    /// Portal root as a URL with a trailing slash, so relative paths join
    /// underneath it instead of replacing its last segment.
    pub fn base(&self) -> Result<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw)
            .with_context(|| format!("portal.base_url is not a valid URL: {}", self.base_url))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => bail!("portal.base_url must be http or https, got '{}'", other),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    #[serde(default = "default_credentials_path")]
    pub path: PathBuf,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            path: default_credentials_path(),
        }
    }
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("./userpass.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/person_data.db")
}

/// What the harvester does when a record cannot be written.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreErrorPolicy {
    /// Stop the run and report the store error.
    #[default]
    Abort,
    /// Log the error, count it, and move on to the next identifier.
    Skip,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HarvestConfig {
    #[serde(default)]
    pub start: i64,
    #[serde(default)]
    pub end: i64,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default)]
    pub on_store_error: StoreErrorPolicy,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            delay_ms: default_delay_ms(),
            on_store_error: StoreErrorPolicy::default(),
        }
    }
}

fn default_delay_ms() -> u64 {
    1000
}

/// Selector and fallback value for one extracted field.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub selector: String,
    #[serde(default)]
    pub default: Option<String>,
}

impl FieldSpec {
    fn new(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            default: None,
        }
    }
}

/// Selectors for every person field. The built-in values target the stock
/// profile page template; override them per field when the template drifts.
#[derive(Debug, Deserialize, Clone)]
pub struct FieldsConfig {
    #[serde(default = "default_name_field")]
    pub name: FieldSpec,
    #[serde(default = "default_local_address_field")]
    pub local_address: FieldSpec,
    #[serde(default = "default_permanent_address_field")]
    pub permanent_address: FieldSpec,
    #[serde(default = "default_national_id_field")]
    pub national_id: FieldSpec,
    #[serde(default = "default_phone_field")]
    pub phone: FieldSpec,
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            name: default_name_field(),
            local_address: default_local_address_field(),
            permanent_address: default_permanent_address_field(),
            national_id: default_national_id_field(),
            phone: default_phone_field(),
        }
    }
}

fn default_name_field() -> FieldSpec {
    FieldSpec::new(".fullname > span:nth-child(1)")
}
fn default_local_address_field() -> FieldSpec {
    FieldSpec::new(
        "li.contentnode:nth-child(3) > dl:nth-child(1) > dd:nth-child(2) > div:nth-child(1) \
         > table:nth-child(2) > tbody:nth-child(2) > tr:nth-child(1) > td:nth-child(1)",
    )
}
fn default_permanent_address_field() -> FieldSpec {
    FieldSpec::new(".custom_field_CorrespondenceAddressPermanent > dl:nth-child(1) > dd:nth-child(2)")
}
fn default_national_id_field() -> FieldSpec {
    FieldSpec::new(".custom_field_AaadharNo > dl:nth-child(1) > dd:nth-child(2)")
}
fn default_phone_field() -> FieldSpec {
    FieldSpec::new(".custom_field_ContactNumber > dl:nth-child(1) > dd:nth-child(2)")
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)?;
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    config.portal.base()?;

    if config.portal.token_field.trim().is_empty() {
        bail!("portal.token_field must not be empty");
    }
    if config.portal.profile_id_param.trim().is_empty() {
        bail!("portal.profile_id_param must not be empty");
    }
    if config.portal.timeout_secs == Some(0) {
        bail!("portal.timeout_secs must be > 0 when set");
    }
    check_selector("portal.token_selector", &config.portal.token_selector)?;
    if let Some(selector) = &config.portal.login_error_selector {
        check_selector("portal.login_error_selector", selector)?;
    }

    if config.harvest.start < 0 {
        bail!("harvest.start ({}) must not be negative", config.harvest.start);
    }
    if config.harvest.start > config.harvest.end {
        bail!(
            "harvest.start ({}) must be <= harvest.end ({})",
            config.harvest.start,
            config.harvest.end
        );
    }

    // A record without a name is discarded, so a fallback name would turn
    // every miss into a bogus row.
    if config.fields.name.default.is_some() {
        bail!("fields.name must not define a default");
    }

    Ok(())
}

fn check_selector(key: &str, selector: &str) -> Result<()> {
    scraper::Selector::parse(selector)
        .map_err(|e| anyhow::anyhow!("invalid selector for {} '{}': {}", key, selector, e))?;
    Ok(())
}
