use crate::models::ListingRecord;
use crate::parser::{clean_price_json, extract_number_json, passthrough_json};
use anyhow::Result;
use chrono::NaiveDate;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

const JSON_LD_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

/// Extract listings from the page's JSON-LD block.
///
/// The search pages embed an array whose first element carries the result list
/// under `about`. A missing block, an unparseable block or an empty list all
/// yield no records, so the caller can move on to the next strategy.
pub fn extract_listings(document: &Html, capture_date: NaiveDate) -> Result<Vec<ListingRecord>> {
    let Some(json_str) = structured_data_block(document)? else {
        debug!("No JSON-LD block found");
        return Ok(Vec::new());
    };

    let data: Value = match serde_json::from_str(&json_str) {
        Ok(data) => data,
        Err(e) => {
            warn!("Failed to parse JSON-LD, falling back to listing cards: {}", e);
            return Ok(Vec::new());
        }
    };

    let records: Vec<ListingRecord> = listing_objects(&data)
        .iter()
        .filter_map(|listing| {
            if listing.is_object() {
                Some(listing_record(listing, capture_date))
            } else {
                debug!("Skipping non-object JSON-LD listing: {}", listing);
                None
            }
        })
        .collect();

    debug!("Extracted {} listings from JSON-LD", records.len());
    Ok(records)
}

fn structured_data_block(document: &Html) -> Result<Option<String>> {
    let selector = Selector::parse(JSON_LD_SELECTOR)
        .map_err(|e| anyhow::anyhow!("Failed to parse JSON-LD selector: {:?}", e))?;

    Ok(document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>()))
}

fn listing_objects(data: &Value) -> &[Value] {
    let root = match data {
        Value::Array(items) => match items.first() {
            Some(first) => first,
            None => return &[],
        },
        other => other,
    };

    match root.get("about") {
        Some(Value::Array(listings)) => listings.as_slice(),
        _ => &[],
    }
}

fn listing_record(listing: &Value, capture_date: NaiveDate) -> ListingRecord {
    let locality = listing
        .get("address")
        .and_then(|address| address.get("addressLocality"));
    let price = listing.get("offers").and_then(|offers| offers.get("price"));
    let floor_size = listing
        .get("floorSize")
        .and_then(|floor_size| floor_size.get("value"));

    ListingRecord {
        capture_date,
        title: None,
        neighborhood: passthrough_json(locality),
        price: clean_price_json(price),
        bedrooms: passthrough_json(listing.get("numberOfBedrooms")),
        bathrooms: passthrough_json(listing.get("numberOfBathroomsTotal")),
        area: extract_number_json(floor_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn page(json: &str) -> Html {
        Html::parse_document(&format!(
            r#"<html><head><script type="application/ld+json">{}</script></head><body></body></html>"#,
            json
        ))
    }

    #[test]
    fn extracts_single_listing() {
        let document = page(
            r#"[{"@type":"ItemList","about":[{"address":{"addressLocality":"Suba"},"offers":{"price":"$700.000"},"numberOfBedrooms":1,"numberOfBathroomsTotal":1,"floorSize":{"value":"30"}}]}]"#,
        );
        let records = extract_listings(&document, date()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].to_csv_record(),
            vec!["2025-03-01", "Suba", "700000", "1", "1", "30"]
        );
        assert_eq!(records[0].bedrooms, FieldValue::Integer(1));
        assert_eq!(records[0].area, FieldValue::Integer(30));
    }

    #[test]
    fn keeps_document_order() {
        let document = page(
            r#"[{"about":[
                {"address":{"addressLocality":"Usaquén"}},
                {"address":{"addressLocality":"Kennedy"}},
                {"address":{"addressLocality":"Bosa"}}
            ]}]"#,
        );
        let records = extract_listings(&document, date()).unwrap();
        let localities: Vec<String> = records.iter().map(|r| r.neighborhood.to_string()).collect();
        assert_eq!(localities, vec!["Usaquén", "Kennedy", "Bosa"]);
    }

    #[test]
    fn missing_fields_are_unresolved() {
        let document = page(r#"[{"about":[{"floorSize":{"value":"abc"}}]}]"#);
        let records = extract_listings(&document, date()).unwrap();
        assert_eq!(
            records[0].to_csv_record(),
            vec!["2025-03-01", "N/A", "N/A", "N/A", "N/A", "N/A"]
        );
    }

    #[test]
    fn accepts_top_level_object() {
        let document = page(r#"{"about":[{"address":{"addressLocality":"Teusaquillo"}}]}"#);
        let records = extract_listings(&document, date()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].neighborhood, FieldValue::text("Teusaquillo"));
    }

    #[test]
    fn malformed_json_yields_nothing() {
        let document = page(r#"[{"about": [ {"address": "#);
        assert!(extract_listings(&document, date()).unwrap().is_empty());
    }

    #[test]
    fn missing_block_yields_nothing() {
        let document = Html::parse_document("<html><body><p>Sin resultados</p></body></html>");
        assert!(extract_listings(&document, date()).unwrap().is_empty());
    }

    #[test]
    fn skips_non_object_listings() {
        let document = page(r#"[{"about":["oops", {"numberOfBedrooms":"2"}]}]"#);
        let records = extract_listings(&document, date()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].bedrooms, FieldValue::text("2"));
    }
}
