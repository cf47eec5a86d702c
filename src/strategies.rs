use crate::extractor::ExtractionStrategy;
use crate::models::{ListingRecord, RecordSource};
use crate::{json_ld, listing_cards};
use anyhow::Result;
use chrono::NaiveDate;
use scraper::Html;

pub struct JsonLdStrategy;

impl ExtractionStrategy for JsonLdStrategy {
    fn name(&self) -> &str {
        "json-ld"
    }

    fn source(&self) -> RecordSource {
        RecordSource::StructuredData
    }

    fn extract(&self, document: &Html, capture_date: NaiveDate) -> Result<Vec<ListingRecord>> {
        json_ld::extract_listings(document, capture_date)
    }
}

pub struct ListingCardStrategy;

impl ExtractionStrategy for ListingCardStrategy {
    fn name(&self) -> &str {
        "listing-card"
    }

    fn source(&self) -> RecordSource {
        RecordSource::ListingCard
    }

    fn extract(&self, document: &Html, capture_date: NaiveDate) -> Result<Vec<ListingRecord>> {
        listing_cards::extract_listings(document, capture_date)
    }
}
