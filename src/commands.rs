//! Entry points shared by the binaries: real HTTP client, filesystem store.

use crate::config::{FetchArgs, StoreArgs};
use crate::event::StorageEvent;
use crate::extractor::Extractor;
use crate::fetcher::{fetch_pages, FetchReport, HttpPageClient};
use crate::models::InvocationResponse;
use crate::pipeline::{process_event, ExtractorConfig};
use crate::storage::FsStore;
use crate::tui::FetchTUI;
use crate::utils;
use anyhow::Result;
use tracing::debug;

pub fn run_fetch(store_args: &StoreArgs, fetch_args: &FetchArgs) -> Result<FetchReport> {
    let store = FsStore::new(&store_args.store_root);
    let client = HttpPageClient::new(fetch_args.timeout())?;
    let options = fetch_args.to_options();

    let mut tui = FetchTUI::new();
    let tui = if fetch_args.quiet { None } else { Some(&mut tui) };

    let report = fetch_pages(
        &client,
        &store,
        &store_args.raw_container,
        &options,
        utils::today_utc(),
        tui,
    )?;
    debug!("Fetch report: {}", serde_json::to_string(&report)?);
    Ok(report)
}

pub fn run_extract(store_args: &StoreArgs, event: &StorageEvent) -> Result<InvocationResponse> {
    let store = FsStore::new(&store_args.store_root);
    let config = ExtractorConfig {
        source_container: store_args.raw_container.clone(),
        destination_container: store_args.processed_container.clone(),
    };
    process_event(
        event,
        &store,
        &Extractor::default(),
        &config,
        utils::today_utc(),
    )
}

/// Fetch, then extract exactly the pages this run stored.
pub fn run_pipeline(store_args: &StoreArgs, fetch_args: &FetchArgs) -> Result<InvocationResponse> {
    let report = run_fetch(store_args, fetch_args)?;
    let event = StorageEvent::for_objects(&store_args.raw_container, report.stored_keys());
    run_extract(store_args, &event)
}

pub fn print_response(response: &InvocationResponse) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}
