//! Remote rate source abstractions

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Result code the provider uses for a successfully quoted record.
pub const RESULT_SUCCESS: i64 = 1;

pub const OFFLINE_MESSAGE: &str = "No internet connection. Showing saved exchange rates.";
pub const TIMEOUT_MESSAGE: &str = "The request timed out. Please try again later.";
pub const CONNECTION_MESSAGE: &str = "Could not connect to the exchange rate server.";
pub const FETCH_MESSAGE: &str = "Failed to fetch exchange rates.";
pub const INVALID_URL_MESSAGE: &str = "The exchange rate server address is invalid.";

/// Why a single fetch attempt failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The configured URL could not be turned into a request.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request timed out")]
    Timeout,

    /// The device has no usable network.
    #[error("No network connectivity: {0}")]
    NoConnectivity(String),

    /// The connection dropped mid-request.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// DNS failure or the server refused the connection.
    #[error("Host unreachable: {0}")]
    HostUnreachable(String),

    /// The body was not the JSON shape the provider promises.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Network error: {0}")]
    Other(String),
}

impl FetchError {
    /// Connectivity failures put the app in offline mode; everything else is
    /// reported as a plain error.
    pub fn is_offline(&self) -> bool {
        matches!(
            self,
            FetchError::NoConnectivity(_) | FetchError::ConnectionLost(_)
        )
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::NoConnectivity(_) | FetchError::ConnectionLost(_) => OFFLINE_MESSAGE,
            FetchError::Timeout => TIMEOUT_MESSAGE,
            FetchError::HostUnreachable(_) => CONNECTION_MESSAGE,
            FetchError::InvalidUrl(_) => INVALID_URL_MESSAGE,
            FetchError::Decode(_) | FetchError::Other(_) => FETCH_MESSAGE,
        }
    }
}

/// One quote as published by the provider. Fields decode leniently so a single
/// odd record never fails the whole payload; normalization skips it instead.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    #[serde(deserialize_with = "lenient_i64")]
    pub result: Option<i64>,
    /// Unit label, e.g. `USD` or `JPY(100)`.
    #[serde(deserialize_with = "lenient_string")]
    pub cur_unit: String,
    /// Base rate with thousands separators, e.g. `1,386.5`.
    #[serde(deserialize_with = "lenient_string")]
    pub deal_bas_r: String,
    #[serde(deserialize_with = "lenient_string")]
    pub ttb: String,
    #[serde(deserialize_with = "lenient_string")]
    pub tts: String,
    #[serde(deserialize_with = "lenient_string")]
    pub cur_nm: String,
}

impl RawRecord {
    pub fn is_success(&self) -> bool {
        self.result == Some(RESULT_SUCCESS)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPayload {
    pub timestamp: Option<String>,
    pub search_date: Option<String>,
    pub records: Vec<RawRecord>,
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Performs exactly one request. No retries, no caching.
    async fn fetch(&self) -> Result<RawPayload, FetchError>;
}
