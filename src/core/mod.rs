//! Core business logic abstractions

pub mod cache;
pub mod calculator;
pub mod config;
pub mod currency;
pub mod defaults;
pub mod log;
pub mod rates;
pub mod source;

// Re-export main types for cleaner imports
pub use currency::{BASE_CURRENCY, Currency};
pub use rates::RateTable;
pub use source::{FetchError, RateSource, RawPayload, RawRecord};
