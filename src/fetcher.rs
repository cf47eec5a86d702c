use crate::config::SearchQuery;
use crate::models::{CaptureId, InvocationResponse, RawPage};
use crate::storage::{ObjectStore, HTML_CONTENT_TYPE};
use crate::tui::FetchTUI;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_MAX_PAGES: u32 = 10;

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can GET a search page.
pub trait PageClient {
    fn get(&self, url: &str) -> Result<FetchedPage>;
}

pub struct HttpPageClient {
    client: reqwest::blocking::Client,
}

impl HttpPageClient {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl PageClient for HttpPageClient {
    fn get(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .send()
            .context("Failed to fetch listing page")?;
        let status = response.status().as_u16();
        let body = response.text().context("Failed to read response body")?;
        Ok(FetchedPage { status, body })
    }
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub base_url: String,
    pub max_pages: u32,
    pub delay: Duration,
    /// Upper bound of random extra delay, in milliseconds.
    pub jitter_ms: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            base_url: SearchQuery::default().to_url(),
            max_pages: DEFAULT_MAX_PAGES,
            delay: Duration::from_millis(500),
            jitter_ms: 250,
        }
    }
}

pub fn page_url(base_url: &str, page: u32) -> String {
    format!("{}/pag-{}", base_url.trim_end_matches('/'), page)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PageStatus {
    Stored { key: String },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageOutcome {
    pub page: u32,
    pub url: String,
    #[serde(flatten)]
    pub status: PageStatus,
}

/// Per-page outcomes of one fetch run.
#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub capture_date: NaiveDate,
    pub outcomes: Vec<PageOutcome>,
}

impl FetchReport {
    pub fn stored_keys(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match &outcome.status {
                PageStatus::Stored { key } => Some(key.clone()),
                PageStatus::Skipped { .. } => None,
            })
            .collect()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.stored_keys().len()
    }

    /// Always a success response, even when every page was skipped; callers
    /// that care inspect the outcomes instead.
    pub fn to_response(&self, container: &str) -> InvocationResponse {
        let locations: Vec<String> = self
            .stored_keys()
            .iter()
            .map(|key| format!("{}/{}", container, key))
            .collect();
        InvocationResponse::ok(format!(
            "Stored {} of {} pages: [{}]",
            locations.len(),
            self.outcomes.len(),
            locations.join(", ")
        ))
    }
}

/// Fetch pages 1..=max_pages and archive every successful body.
///
/// A page that fails or comes back non-2xx is recorded as skipped and never
/// affects the others. Storage failures are fatal.
pub fn fetch_pages(
    client: &dyn PageClient,
    store: &dyn ObjectStore,
    container: &str,
    options: &FetchOptions,
    capture_date: NaiveDate,
    mut tui: Option<&mut FetchTUI>,
) -> Result<FetchReport> {
    let mut outcomes = Vec::new();

    if let Some(tui) = tui.as_mut() {
        tui.start(options.max_pages)?;
    }

    // The progress display is finished even when a storage failure aborts the run.
    let fetched = fetch_page_range(
        client,
        store,
        container,
        options,
        capture_date,
        tui.as_deref_mut(),
        &mut outcomes,
    );
    let finished = match tui {
        Some(tui) => tui.finish(outcomes.len()),
        None => Ok(()),
    };
    fetched?;
    finished?;

    let report = FetchReport {
        capture_date,
        outcomes,
    };
    if report.stored_keys().is_empty() {
        warn!("No pages were stored for {}", capture_date);
    }

    Ok(report)
}

fn fetch_page_range(
    client: &dyn PageClient,
    store: &dyn ObjectStore,
    container: &str,
    options: &FetchOptions,
    capture_date: NaiveDate,
    mut tui: Option<&mut FetchTUI>,
    outcomes: &mut Vec<PageOutcome>,
) -> Result<()> {
    for page in 1..=options.max_pages {
        if page > 1 {
            polite_delay(options);
        }

        let url = page_url(&options.base_url, page);
        debug!("Fetching listing page: {}", url);

        let status = match client.get(&url) {
            Ok(fetched) if fetched.is_success() => {
                let raw = RawPage::captured(CaptureId::new(capture_date, page), fetched.body);
                store
                    .put(container, &raw.key, raw.html.as_bytes(), HTML_CONTENT_TYPE)
                    .with_context(|| format!("Failed to store page {} as {}", page, raw.key))?;
                info!("Stored page {} at {}/{}", page, container, raw.key);
                PageStatus::Stored { key: raw.key }
            }
            Ok(fetched) => {
                warn!("Skipping page {}: HTTP {}", page, fetched.status);
                PageStatus::Skipped {
                    reason: format!("HTTP {}", fetched.status),
                }
            }
            Err(e) => {
                warn!("Skipping page {}: {:#}", page, e);
                PageStatus::Skipped {
                    reason: format!("{:#}", e),
                }
            }
        };

        if let Some(tui) = tui.as_mut() {
            tui.page_done(page, &status)?;
        }
        outcomes.push(PageOutcome { page, url, status });
    }
    Ok(())
}

fn polite_delay(options: &FetchOptions) {
    let jitter = if options.jitter_ms > 0 {
        rand::thread_rng().gen_range(0..=options.jitter_ms)
    } else {
        0
    };
    let delay = options.delay + Duration::from_millis(jitter);
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}
