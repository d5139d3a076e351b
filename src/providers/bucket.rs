//! Rates mirrored into a public storage bucket as one JSON document.
//!
//! A scheduled job copies the Korea Exim feed into the bucket so the app never
//! needs an API key. The document wraps the provider's record list:
//!
//! ```json
//! {"timestamp": "...", "searchdate": "20250314", "exchange_rates": [ ... ]}
//! ```

use crate::core::source::{FetchError, RateSource, RawPayload, RawRecord};
use crate::providers::util::{REQUEST_TIMEOUT, get_json, parse_url};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_BUCKET_URL: &str =
    "https://exchng-rate-bucket.s3.us-east-1.amazonaws.com/exchange_rate.json";

#[derive(Debug, Deserialize)]
struct BucketResponse {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    searchdate: Option<String>,
    exchange_rates: Vec<RawRecord>,
}

pub struct BucketSource {
    url: String,
    timeout: Duration,
}

impl BucketSource {
    pub fn new(url: &str) -> Self {
        BucketSource {
            url: url.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl RateSource for BucketSource {
    #[instrument(name = "BucketFetch", skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<RawPayload, FetchError> {
        let url = parse_url(&self.url)?;
        let response: BucketResponse = get_json(&url, self.timeout).await?;
        debug!(
            "Received {} records for {:?}",
            response.exchange_rates.len(),
            response.searchdate
        );

        Ok(RawPayload {
            timestamp: response.timestamp,
            search_date: response.searchdate,
            records: response.exchange_rates,
        })
    }
}
