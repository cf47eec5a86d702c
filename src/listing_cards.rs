use crate::models::{FieldValue, ListingRecord};
use crate::parser::{clean_price, extract_number, passthrough};
use anyhow::Result;
use chrono::NaiveDate;
use scraper::{Html, Selector};
use tracing::debug;

// Cards are rendered as <a class="listing listing-card" data-price=... data-rooms=...>
const CARD_SELECTOR: &str = "a.listing.listing-card";

/// Scrape listing cards from their data attributes. Cards don't expose a
/// bathroom count, so that cell is always unresolved.
pub fn extract_listings(document: &Html, capture_date: NaiveDate) -> Result<Vec<ListingRecord>> {
    let selector = Selector::parse(CARD_SELECTOR)
        .map_err(|e| anyhow::anyhow!("Failed to parse listing card selector: {:?}", e))?;

    let records: Vec<ListingRecord> = document
        .select(&selector)
        .map(|card| {
            let attrs = card.value();
            ListingRecord {
                capture_date,
                title: Some(passthrough(attrs.attr("title"))),
                neighborhood: passthrough(attrs.attr("data-location")),
                price: clean_price(attrs.attr("data-price")),
                bedrooms: passthrough(attrs.attr("data-rooms")),
                bathrooms: FieldValue::Unresolved,
                area: extract_number(attrs.attr("data-floorarea")),
            }
        })
        .collect();

    debug!("Found {} listing cards", records.len());
    Ok(records)
}
