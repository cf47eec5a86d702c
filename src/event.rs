use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Storage "object created" notification, as delivered to the extractor.
///
/// Only the fields the extractor reads are modelled; everything else in the
/// payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<NotificationRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub s3: ObjectLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub key: String,
}

impl StorageEvent {
    /// Parse a delivered notification. Keys are decoded here, once, so
    /// everything downstream works with real object keys.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut event: Self = serde_json::from_str(json).context("Failed to parse storage event")?;
        for record in &mut event.records {
            record.s3.object.key = decode_key(&record.s3.object.key);
        }
        Ok(event)
    }

    /// Synthesize an event for keys already known to exist in `container`.
    /// Keys are taken verbatim.
    pub fn for_objects<I, S>(container: &str, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let records = keys
            .into_iter()
            .map(|key| NotificationRecord {
                s3: ObjectLocation {
                    bucket: BucketRef {
                        name: container.to_string(),
                    },
                    object: ObjectRef { key: key.into() },
                },
            })
            .collect();
        Self { records }
    }

    /// Keys of every record that points into `container`, in event order.
    pub fn matching_keys(&self, container: &str) -> Vec<String> {
        self.records
            .iter()
            .filter(|record| record.s3.bucket.name == container)
            .map(|record| record.s3.object.key.clone())
            .collect()
    }
}

/// Notification keys arrive form-encoded: `+` for spaces, `%XX` escapes.
pub fn decode_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT: &str = r#"{
        "Records": [
            {
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": {"name": "listings-raw", "arn": "arn:aws:s3:::listings-raw"},
                    "object": {"key": "2025-03-01/pagina-1.html", "size": 1024}
                }
            },
            {
                "s3": {
                    "bucket": {"name": "somewhere-else"},
                    "object": {"key": "2025-03-01/pagina-2.html"}
                }
            },
            {
                "s3": {
                    "bucket": {"name": "listings-raw"},
                    "object": {"key": "manual+upload/p%C3%A1gina.html"}
                }
            }
        ]
    }"#;

    #[test]
    fn filters_by_container_and_decodes_keys() {
        let event = StorageEvent::from_json(EVENT).unwrap();
        assert_eq!(event.records.len(), 3);
        assert_eq!(
            event.matching_keys("listings-raw"),
            vec!["2025-03-01/pagina-1.html", "manual upload/página.html"]
        );
        assert!(event.matching_keys("listings-parsed").is_empty());
    }

    #[test]
    fn missing_records_is_an_empty_event() {
        let event = StorageEvent::from_json("{}").unwrap();
        assert!(event.records.is_empty());
    }

    #[test]
    fn rejects_garbage() {
        assert!(StorageEvent::from_json("not json").is_err());
    }

    #[test]
    fn synthesized_event_round_trips() {
        let event = StorageEvent::for_objects("listings-raw", ["2025-03-01/pagina-1.html"]);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""Records""#));
        assert_eq!(StorageEvent::from_json(&json).unwrap(), event);
    }

    #[test]
    fn synthesized_keys_are_not_decoded() {
        let event = StorageEvent::for_objects("listings-raw", ["manual/a+b%20c.html"]);
        assert_eq!(event.matching_keys("listings-raw"), vec!["manual/a+b%20c.html"]);
    }

    #[test]
    fn invalid_escapes_are_kept() {
        assert_eq!(decode_key("a%ZZb"), "a%ZZb");
    }
}
