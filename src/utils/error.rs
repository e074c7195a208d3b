// src/utils/error.rs
use chrono::NaiveDate;
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode), // e.g., 404 Not Found, 502 Bad Gateway

    #[error("Yahoo rate limit likely exceeded")]
    RateLimited, // 429, or Yahoo's unofficial 999
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unable to parse earnings data from page")]
    UnparseableFormat, // neither page layout recognized the content
}

/// Failures surfaced by the public calendar operations.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("From-date {from} should not be after to-date {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("Page fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Page extraction failed: {0}")]
    Unparseable(#[from] ExtractError),

    // Yahoo offers no machine-distinguishable "symbol does not exist"
    // signal, so the symbol operations collapse everything into these two.
    #[error("Invalid symbol or unavailable earnings data for {0}")]
    SymbolLookupFailed(String),

    #[error("No upcoming earnings date found for {0}")]
    NoUpcomingEarnings(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calendar query failed: {0}")]
    Calendar(#[from] CalendarError),

    #[error("HTTP client setup failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Output serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
