use crate::event::StorageEvent;
use crate::fetcher::{FetchOptions, DEFAULT_MAX_PAGES};
use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_RAW_CONTAINER: &str = "listings-raw";
pub const DEFAULT_PROCESSED_CONTAINER: &str = "listings-parsed";

/// Search whose result pages get archived.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub host: String,
    pub operation_type: String,
    pub property_type: String,
    pub geo_id: String,
    pub text: String,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            host: "https://casas.mitula.com.co".to_string(),
            operation_type: "sell".to_string(),
            property_type: "mitula_studio_apartment".to_string(),
            geo_id: "mitula-CO-poblacion-0000014156".to_string(),
            text: "Bogotá,  (Cundinamarca)".to_string(),
        }
    }
}

impl SearchQuery {
    pub fn to_url(&self) -> String {
        format!(
            "{}/find?operationType={}&propertyType={}&geoId={}&text={}",
            self.host.trim_end_matches('/'),
            urlencoding::encode(&self.operation_type),
            urlencoding::encode(&self.property_type),
            urlencoding::encode(&self.geo_id),
            urlencoding::encode(&self.text)
        )
    }
}

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Root directory of the object store; each container is a subdirectory
    #[arg(long, env = "CASAFINDER_STORE_ROOT", default_value = "store", global = true)]
    pub store_root: PathBuf,

    /// Container raw HTML pages are archived in
    #[arg(long, env = "CASAFINDER_RAW_CONTAINER", default_value = DEFAULT_RAW_CONTAINER, global = true)]
    pub raw_container: String,

    /// Container CSV artifacts are written to
    #[arg(long, env = "CASAFINDER_PROCESSED_CONTAINER", default_value = DEFAULT_PROCESSED_CONTAINER, global = true)]
    pub processed_container: String,
}

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Search URL that page segments are appended to
    #[arg(long, env = "CASAFINDER_BASE_URL")]
    pub base_url: Option<String>,

    /// Number of result pages to fetch
    #[arg(short, long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: u32,

    /// Pause between page requests, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub delay_ms: u64,

    /// Request timeout in seconds (client default if unset)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Don't draw progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl FetchArgs {
    pub fn to_options(&self) -> FetchOptions {
        let defaults = FetchOptions::default();
        FetchOptions {
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            max_pages: self.max_pages,
            delay: Duration::from_millis(self.delay_ms),
            jitter_ms: if self.delay_ms == 0 { 0 } else { defaults.jitter_ms },
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Storage notification JSON to process
    #[arg(long, conflicts_with = "key")]
    pub event: Option<PathBuf>,

    /// Raw object key to process directly (repeatable)
    #[arg(long)]
    pub key: Vec<String>,
}

impl ExtractArgs {
    /// Load the event file, or synthesize one for `--key` objects in `raw_container`.
    pub fn load_event(&self, raw_container: &str) -> Result<StorageEvent> {
        if let Some(path) = &self.event {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read event file: {}", path.display()))?;
            return StorageEvent::from_json(&json);
        }
        if self.key.is_empty() {
            anyhow::bail!("Either --event or --key is required");
        }
        Ok(StorageEvent::for_objects(raw_container, self.key.iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_search_url_is_encoded() {
        assert_eq!(
            SearchQuery::default().to_url(),
            "https://casas.mitula.com.co/find?operationType=sell&propertyType=mitula_studio_apartment&geoId=mitula-CO-poblacion-0000014156&text=Bogot%C3%A1%2C%20%20%28Cundinamarca%29"
        );
    }

    #[test]
    fn zero_delay_disables_jitter() {
        let args = FetchArgs {
            base_url: Some("https://example.com/find".to_string()),
            max_pages: 3,
            delay_ms: 0,
            timeout_secs: Some(5),
            quiet: true,
        };
        let options = args.to_options();
        assert_eq!(options.base_url, "https://example.com/find");
        assert_eq!(options.max_pages, 3);
        assert_eq!(options.jitter_ms, 0);
        assert_eq!(args.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn keys_become_an_event_for_the_raw_container() {
        let args = ExtractArgs {
            event: None,
            key: vec!["2025-03-01/pagina-1.html".to_string()],
        };
        let event = args.load_event("listings-raw").unwrap();
        assert_eq!(event.matching_keys("listings-raw"), vec!["2025-03-01/pagina-1.html"]);
    }

    #[test]
    fn extract_needs_a_source() {
        let args = ExtractArgs {
            event: None,
            key: Vec::new(),
        };
        assert!(args.load_event("listings-raw").is_err());
    }
}
