// src/yahoo/client.rs
use crate::utils::error::FetchError;
use chrono::NaiveDate;
use reqwest::header;
use std::time::Duration;

pub const BASE_CALENDAR_URL: &str = "https://finance.yahoo.com/calendar/earnings";
pub const BASE_QUOTE_URL: &str = "https://finance.yahoo.com/quote";

// Yahoo serves an interstitial to clients announcing themselves as bots.
const YAHOO_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0";

// Stay under ~2000 requests/hour to avoid the throttle.
const REQUESTS_PER_HOUR: u64 = 2000;
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(60 * 60 * 1000 / REQUESTS_PER_HOUR);

/// Records per calendar page; also the pagination offset step.
pub const PAGE_SIZE: u64 = 100;

/// One page of the earnings calendar for a single day.
pub fn day_url(date: NaiveDate, offset: u64) -> String {
    format!(
        "{}?day={}&offset={}&size={}",
        BASE_CALENDAR_URL,
        date.format("%Y-%m-%d"),
        offset,
        PAGE_SIZE
    )
}

/// The calendar filtered to a single ticker symbol.
pub fn symbol_calendar_url(symbol: &str) -> String {
    format!("{}?symbol={}", BASE_CALENDAR_URL, symbol)
}

/// The symbol's quote detail page.
pub fn quote_url(symbol: &str) -> String {
    format!("{}/{}", BASE_QUOTE_URL, symbol)
}

/// The transport boundary: fetch a URL, return the raw page text.
///
/// The calendar operations only ever see this trait, so tests can substitute
/// a canned source and count calls.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Blocking-style HTTP page source with a fixed inter-request delay.
///
/// The delay is configured once at construction and enforced in full
/// immediately before every request, not just on retry, to respect the
/// global request-rate ceiling.
pub struct HttpFetcher {
    client: reqwest::Client,
    delay: Duration,
}

impl HttpFetcher {
    pub fn new(delay: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(YAHOO_USER_AGENT)
            .build()?;
        Ok(Self { client, delay })
    }
}

impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tokio::time::sleep(self.delay).await;
        tracing::debug!("Fetching page: {}", url);

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            // Yahoo answers 999 (unregistered) or 429 when throttling.
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.as_u16() == 999 {
                tracing::warn!("Received {} - slow down the request rate.", status);
                return Err(FetchError::RateLimited);
            }
            return Err(FetchError::Http(status));
        }

        let body = response.text().await?;
        tracing::debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
