use crate::models::{ListingRecord, RecordSource};
use crate::strategies::{JsonLdStrategy, ListingCardStrategy};
use anyhow::Result;
use chrono::NaiveDate;
use scraper::Html;
use tracing::{debug, info};

/// One way of pulling listings out of a parsed search page.
/// An empty vector means "no match here, try the next one".
pub trait ExtractionStrategy {
    fn name(&self) -> &str;
    fn source(&self) -> RecordSource;
    fn extract(&self, document: &Html, capture_date: NaiveDate) -> Result<Vec<ListingRecord>>;
}

/// Records from a single page, all produced by the same strategy.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    pub source: Option<RecordSource>,
    pub records: Vec<ListingRecord>,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Ordered strategy chain; the first strategy that finds anything wins and
/// later strategies are never consulted.
pub struct Extractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// JSON-LD first, listing cards second.
    pub fn with_default_strategies() -> Self {
        let mut extractor = Self::new();
        extractor.register(Box::new(JsonLdStrategy));
        extractor.register(Box::new(ListingCardStrategy));
        extractor
    }

    pub fn register(&mut self, strategy: Box<dyn ExtractionStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn extract(&self, html: &str, capture_date: NaiveDate) -> Result<ExtractionResult> {
        let document = Html::parse_document(html);

        for strategy in &self.strategies {
            let records = strategy.extract(&document, capture_date)?;
            if records.is_empty() {
                debug!("{} found no listings", strategy.name());
                continue;
            }

            info!("{} extracted {} listings", strategy.name(), records.len());
            return Ok(ExtractionResult {
                source: Some(strategy.source()),
                records,
            });
        }

        Ok(ExtractionResult::default())
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::with_default_strategies()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    struct FixedStrategy {
        count: usize,
    }

    impl ExtractionStrategy for FixedStrategy {
        fn name(&self) -> &str {
            "fixed"
        }

        fn source(&self) -> RecordSource {
            RecordSource::ListingCard
        }

        fn extract(&self, _document: &Html, capture_date: NaiveDate) -> Result<Vec<ListingRecord>> {
            Ok((0..self.count)
                .map(|i| ListingRecord {
                    capture_date,
                    title: None,
                    neighborhood: FieldValue::text(format!("fixed-{}", i)),
                    price: FieldValue::Unresolved,
                    bedrooms: FieldValue::Unresolved,
                    bathrooms: FieldValue::Unresolved,
                    area: FieldValue::Unresolved,
                })
                .collect())
        }
    }

    #[test]
    fn default_order_is_json_ld_then_cards() {
        let extractor = Extractor::default();
        assert_eq!(extractor.strategy_names(), vec!["json-ld", "listing-card"]);
    }

    #[test]
    fn structured_data_wins_over_cards() {
        let html = r#"<html><head><script type="application/ld+json">
            [{"about":[{"address":{"addressLocality":"Suba"}},{"address":{"addressLocality":"Bosa"}}]}]
            </script></head><body>
            <a class="listing listing-card" title="Card" data-price="$1"></a>
            </body></html>"#;
        let result = Extractor::default().extract(html, date()).unwrap();
        assert_eq!(result.source, Some(RecordSource::StructuredData));
        assert_eq!(result.len(), 2);
        assert!(result.records.iter().all(|r| r.title.is_none()));
    }

    #[test]
    fn malformed_json_falls_back_to_cards_only() {
        let html = r#"<html><head><script type="application/ld+json">{not json</script></head><body>
            <a class="listing listing-card" title="Card A" data-price="$1"></a>
            <a class="listing listing-card" title="Card B" data-price="$2"></a>
            </body></html>"#;
        let result = Extractor::default().extract(html, date()).unwrap();
        assert_eq!(result.source, Some(RecordSource::ListingCard));
        assert_eq!(result.len(), 2);
        assert!(result.records.iter().all(|r| r.title.is_some()));
    }

    #[test]
    fn empty_about_list_falls_back() {
        let html = r#"<script type="application/ld+json">[{"about":[]}]</script>
            <a class="listing listing-card" title="Card" data-rooms="2"></a>"#;
        let result = Extractor::default().extract(html, date()).unwrap();
        assert_eq!(result.source, Some(RecordSource::ListingCard));
        assert_eq!(result.records[0].bedrooms, FieldValue::text("2"));
    }

    #[test]
    fn nothing_matches_gives_empty_result() {
        let result = Extractor::default()
            .extract("<html><body><h1>Sin resultados</h1></body></html>", date())
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.source, None);
    }

    #[test]
    fn stops_at_first_non_empty_strategy() {
        let mut extractor = Extractor::new();
        extractor.register(Box::new(FixedStrategy { count: 0 }));
        extractor.register(Box::new(FixedStrategy { count: 2 }));
        extractor.register(Box::new(FixedStrategy { count: 5 }));
        let result = extractor.extract("<html></html>", date()).unwrap();
        assert_eq!(result.len(), 2);
    }
}
