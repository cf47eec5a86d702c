use crate::event::StorageEvent;
use crate::extractor::{ExtractionResult, Extractor};
use crate::models::{InvocationResponse, ListingRecord, RawPage};
use crate::storage::{ObjectStore, CSV_CONTENT_TYPE};
use crate::utils;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

pub const NO_DATA_MESSAGE: &str = "No data found in the HTML";
pub const NO_MATCHING_OBJECTS_MESSAGE: &str = "No matching objects in event";

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub source_container: String,
    pub destination_container: String,
}

/// Load one raw object and run it through the strategy chain.
///
/// Records are stamped with `processing_date`, not the capture date in the key.
pub fn extract_object(
    store: &dyn ObjectStore,
    extractor: &Extractor,
    container: &str,
    key: &str,
    processing_date: NaiveDate,
) -> Result<ExtractionResult> {
    let body = store
        .get(container, key)
        .with_context(|| format!("Failed to load {}/{}", container, key))?;
    let page = RawPage::from_object(key, body)?;

    match page.capture {
        Some(capture) => info!("Extracting {} (captured {})", page.key, capture),
        None => info!("Extracting {}", page.key),
    }

    extractor.extract(&page.html, processing_date)
}

/// Handle one storage notification: extract every object in the source
/// container and write the combined records as `{processing_date}.csv`.
///
/// An event with nothing to process, or pages with no listings, is reported
/// as a 400 response rather than an error. Storage failures are errors.
pub fn process_event(
    event: &StorageEvent,
    store: &dyn ObjectStore,
    extractor: &Extractor,
    config: &ExtractorConfig,
    processing_date: NaiveDate,
) -> Result<InvocationResponse> {
    let keys = event.matching_keys(&config.source_container);
    let ignored = event.records.len() - keys.len();
    if ignored > 0 {
        info!("Ignoring {} records outside {}", ignored, config.source_container);
    }
    if keys.is_empty() {
        warn!("{}", NO_MATCHING_OBJECTS_MESSAGE);
        return Ok(InvocationResponse::no_data(NO_MATCHING_OBJECTS_MESSAGE));
    }

    let mut records: Vec<ListingRecord> = Vec::new();
    for key in &keys {
        let result = extract_object(
            store,
            extractor,
            &config.source_container,
            key,
            processing_date,
        )?;
        match result.source {
            Some(source) => info!("{}: {} records via {}", key, result.len(), source),
            None => warn!("{}: {}", key, NO_DATA_MESSAGE),
        }
        records.extend(result.records);
    }

    if records.is_empty() {
        return Ok(InvocationResponse::no_data(NO_DATA_MESSAGE));
    }

    let csv = utils::records_to_csv(&records)?;
    let artifact = utils::artifact_key(processing_date);
    store
        .put(
            &config.destination_container,
            &artifact,
            csv.as_bytes(),
            CSV_CONTENT_TYPE,
        )
        .with_context(|| {
            format!(
                "Failed to write {}/{}",
                config.destination_container, artifact
            )
        })?;

    info!(
        "Saved {} records from {} objects to {}/{}",
        records.len(),
        keys.len(),
        config.destination_container,
        artifact
    );
    Ok(InvocationResponse::ok(format!(
        "Processed {} records and saved them to {}/{}",
        records.len(),
        config.destination_container,
        artifact
    )))
}
