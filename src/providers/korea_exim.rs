//! Direct access to the Korea Eximbank exchange rate API.
//!
//! The endpoint returns a flat JSON list of records for the requested date and
//! needs an API key. Outside publishing hours (weekends, before ~11:00 KST) the
//! list is empty; normalization then falls back to defaults for every code.

use crate::core::source::{FetchError, RateSource, RawPayload, RawRecord};
use crate::providers::util::{REQUEST_TIMEOUT, get_json, parse_url};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str =
    "https://oapi.koreaexim.go.kr/site/program/financial/exchangeJSON";

/// Dataset code for exchange rates.
const DATA_CODE: &str = "AP01";

pub struct KoreaEximSource {
    base_url: String,
    auth_key: String,
    search_date: Option<NaiveDate>,
    timeout: Duration,
}

impl KoreaEximSource {
    pub fn new(base_url: &str, auth_key: &str) -> Self {
        KoreaEximSource {
            base_url: base_url.to_string(),
            auth_key: auth_key.to_string(),
            search_date: None,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Pins the quoted date instead of using today.
    pub fn with_search_date(mut self, date: NaiveDate) -> Self {
        self.search_date = Some(date);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn search_date(&self) -> String {
        self.search_date
            .unwrap_or_else(|| Local::now().date_naive())
            .format("%Y%m%d")
            .to_string()
    }
}

#[async_trait]
impl RateSource for KoreaEximSource {
    #[instrument(name = "KoreaEximFetch", skip(self), fields(base_url = %self.base_url))]
    async fn fetch(&self) -> Result<RawPayload, FetchError> {
        let search_date = self.search_date();
        let mut url = parse_url(&self.base_url)?;
        url.query_pairs_mut()
            .append_pair("authkey", &self.auth_key)
            .append_pair("searchdate", &search_date)
            .append_pair("data", DATA_CODE);

        let records: Vec<RawRecord> = get_json(&url, self.timeout).await?;
        debug!("Received {} records for {}", records.len(), search_date);

        Ok(RawPayload {
            timestamp: None,
            search_date: Some(search_date),
            records,
        })
    }
}
