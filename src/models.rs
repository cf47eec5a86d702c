use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Sentinel written for any field that is missing or could not be parsed.
pub const UNRESOLVED: &str = "N/A";

/// A single cell of a listing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Unresolved,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, FieldValue::Unresolved)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => write!(f, "{}", text),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Unresolved => write!(f, "{}", UNRESOLVED),
        }
    }
}

impl From<Option<&str>> for FieldValue {
    fn from(value: Option<&str>) -> Self {
        match value {
            Some(text) => FieldValue::text(text),
            None => FieldValue::Unresolved,
        }
    }
}

/// Which extraction path produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordSource {
    StructuredData,
    ListingCard,
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSource::StructuredData => write!(f, "json-ld"),
            RecordSource::ListingCard => write!(f, "listing-card"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub capture_date: NaiveDate,
    /// Only listing cards carry a title; structured data goes straight to the locality.
    pub title: Option<FieldValue>,
    pub neighborhood: FieldValue,
    pub price: FieldValue,
    pub bedrooms: FieldValue,
    pub bathrooms: FieldValue,
    pub area: FieldValue,
}

impl ListingRecord {
    /// Cells in output order. Card records are one cell wider than the header
    /// because title and location are written separately.
    pub fn to_csv_record(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(7);
        cells.push(self.capture_date.format("%Y-%m-%d").to_string());
        if let Some(title) = &self.title {
            cells.push(title.to_string());
        }
        cells.push(self.neighborhood.to_string());
        cells.push(self.price.to_string());
        cells.push(self.bedrooms.to_string());
        cells.push(self.bathrooms.to_string());
        cells.push(self.area.to_string());
        cells
    }
}

/// Date and page index a raw page was captured under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaptureId {
    pub date: NaiveDate,
    pub page: u32,
}

impl CaptureId {
    pub fn new(date: NaiveDate, page: u32) -> Self {
        Self { date, page }
    }

    /// Storage key for the raw page: `{date}/pagina-{page}.html`.
    pub fn key(&self) -> String {
        format!("{}/pagina-{}.html", self.date.format("%Y-%m-%d"), self.page)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        static KEY_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
        let re = KEY_PATTERN
            .get_or_init(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})/pagina-(\d+)\.html$").ok())
            .as_ref()?;
        let captures = re.captures(key)?;
        let date = NaiveDate::parse_from_str(captures.get(1)?.as_str(), "%Y-%m-%d").ok()?;
        let page = captures.get(2)?.as_str().parse::<u32>().ok()?;
        Some(Self { date, page })
    }
}

impl fmt::Display for CaptureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} page {}", self.date.format("%Y-%m-%d"), self.page)
    }
}

#[derive(Debug, Clone)]
pub struct RawPage {
    pub key: String,
    pub capture: Option<CaptureId>,
    pub html: String,
}

impl RawPage {
    pub fn captured(capture: CaptureId, html: String) -> Self {
        Self {
            key: capture.key(),
            capture: Some(capture),
            html,
        }
    }

    /// Rebuild a page from a stored object. Keys that don't follow the
    /// capture layout are still accepted, just without a capture id.
    pub fn from_object(key: &str, body: Vec<u8>) -> Result<Self> {
        let html = String::from_utf8(body)
            .with_context(|| format!("Object {} is not valid UTF-8", key))?;
        Ok(Self {
            key: key.to_string(),
            capture: CaptureId::from_key(key),
            html,
        })
    }
}

/// What an invocation hands back to its trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: body.into(),
        }
    }

    pub fn no_data(body: impl Into<String>) -> Self {
        Self {
            status_code: 400,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}
