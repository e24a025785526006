//! Selector-driven field extraction from profile pages.
//!
//! Each person field is located by a CSS selector taken from `[fields.*]`
//! in the config. The first matching element supplies the field's trimmed
//! text; a selector that matches nothing falls back to the field default.
//! Profiles without a name are not records: the extractor returns `None`
//! and the harvester moves on.

use anyhow::{anyhow, Result};
use scraper::{Html, Selector};

use crate::config::{FieldSpec, FieldsConfig};
use crate::models::PersonRecord;

/// A compiled selector plus the value used when it matches nothing.
struct CompiledField {
    selector: Selector,
    default: String,
}

impl CompiledField {
    fn compile(field: &str, spec: &FieldSpec) -> Result<Self> {
        Ok(Self {
            selector: compile_selector(field, &spec.selector)?,
            default: spec.default.clone().unwrap_or_default(),
        })
    }

    fn extract(&self, document: &Html) -> String {
        first_text(document, &self.selector).unwrap_or_else(|| self.default.clone())
    }
}

/// Extracts [`PersonRecord`]s from parsed profile pages.
///
/// Selectors are parsed once, at construction, so a typo in the config
/// fails the run before the first request is sent.
pub struct FieldExtractor {
    name: Selector,
    local_address: CompiledField,
    permanent_address: CompiledField,
    national_id: CompiledField,
    phone: CompiledField,
}

impl FieldExtractor {
    pub fn from_config(fields: &FieldsConfig) -> Result<Self> {
        Ok(Self {
            name: compile_selector("name", &fields.name.selector)?,
            local_address: CompiledField::compile("local_address", &fields.local_address)?,
            permanent_address: CompiledField::compile(
                "permanent_address",
                &fields.permanent_address,
            )?,
            national_id: CompiledField::compile("national_id", &fields.national_id)?,
            phone: CompiledField::compile("phone", &fields.phone)?,
        })
    }

    /// Pull a record for `uid` out of `document`.
    ///
    /// Returns `None` when the name selector matches nothing or only
    /// whitespace. That is the normal outcome for ids with no profile, a
    /// disabled account or a restricted page.
    pub fn extract(&self, document: &Html, uid: i64) -> Option<PersonRecord> {
        let name = first_text(document, &self.name).filter(|n| !n.is_empty())?;

        Some(PersonRecord {
            uid,
            name,
            local_address: self.local_address.extract(document),
            permanent_address: self.permanent_address.extract(document),
            national_id: self.national_id.extract(document),
            phone: self.phone.extract(document),
        })
    }

    /// Parse `body` as HTML and extract in one step.
    ///
    /// The parsed document never outlives this call, which keeps callers'
    /// futures free of the non-`Send` DOM.
    pub fn extract_html(&self, body: &str, uid: i64) -> Option<PersonRecord> {
        let document = Html::parse_document(body);
        self.extract(&document, uid)
    }
}

fn compile_selector(field: &str, selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| anyhow!("invalid selector for fields.{} '{}': {}", field, selector, e))
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}
