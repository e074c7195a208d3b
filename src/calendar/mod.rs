// src/calendar/mod.rs
use crate::extractors::PayloadExtractor;
use crate::utils::error::{CalendarError, FetchError};
use crate::yahoo::client::{self, HttpFetcher, PageSource, DEFAULT_REQUEST_DELAY, PAGE_SIZE};
use crate::yahoo::models::{EarningsRecord, PageResultSet};
use chrono::{NaiveDate, Utc};
use std::time::Duration;

/// Parses a `YYYY-MM-DD` string into a pure calendar date. Anything else,
/// including date-times, is rejected.
pub fn parse_day(value: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        CalendarError::InvalidArgument(format!("'{value}' is not a YYYY-MM-DD calendar date"))
    })
}

/// Earnings-calendar queries against Yahoo! Finance.
///
/// Holds the page source, whose fixed inter-request delay it configures once
/// at construction, and the payload extractor. Every operation issues its
/// fetches strictly sequentially; a long date range simply pays
/// days x pages delayed round trips, and a transport failure aborts the
/// operation immediately.
pub struct EarningsCalendar<F = HttpFetcher> {
    fetcher: F,
    extractor: PayloadExtractor,
}

impl EarningsCalendar<HttpFetcher> {
    /// HTTP-backed calendar with the default request delay.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_delay(DEFAULT_REQUEST_DELAY)
    }

    /// HTTP-backed calendar sleeping `delay` before every request.
    pub fn with_delay(delay: Duration) -> Result<Self, FetchError> {
        Ok(Self::with_source(HttpFetcher::new(delay)?))
    }
}

impl<F: PageSource> EarningsCalendar<F> {
    /// Calendar over an arbitrary page source.
    pub fn with_source(fetcher: F) -> Self {
        Self {
            fetcher,
            extractor: PayloadExtractor::new(),
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<PageResultSet, CalendarError> {
        let page_text = self.fetcher.fetch(url).await?;
        Ok(self.extractor.extract(&page_text)?)
    }

    /// All earnings announced on `date`, across every result page.
    pub async fn earnings_on(&self, date: NaiveDate) -> Result<Vec<EarningsRecord>, CalendarError> {
        // 1 stands in for "total not yet known": it forces the first fetch,
        // whose reported total then takes over as the real bound.
        self.earnings_on_paged(date, 0, 1).await
    }

    /// Pages through the calendar for `date` starting at `offset`, treating
    /// `limit` as the expected total until a fetched page reports the true
    /// one. `offset >= limit` returns empty without fetching.
    pub async fn earnings_on_paged(
        &self,
        date: NaiveDate,
        mut offset: u64,
        mut limit: u64,
    ) -> Result<Vec<EarningsRecord>, CalendarError> {
        let mut records = Vec::new();
        while offset < limit {
            tracing::debug!("Fetching earnings data for {} at offset {}", date, offset);
            let page = self.fetch_page(&client::day_url(date, offset)).await?;
            limit = page.total;
            records.extend(page.records);
            offset += PAGE_SIZE;
        }
        Ok(records)
    }

    /// All earnings from `from` to `to`, both inclusive, concatenated in
    /// chronological day order.
    pub async fn earnings_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EarningsRecord>, CalendarError> {
        if from > to {
            return Err(CalendarError::InvalidRange { from, to });
        }
        let mut records = Vec::new();
        let mut day = from;
        while day <= to {
            records.extend(self.earnings_on(day).await?);
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        Ok(records)
    }

    /// Every earnings record Yahoo lists for `symbol`. The symbol filter
    /// returns a single page's worth of history, so no pagination here.
    pub async fn earnings_of(&self, symbol: &str) -> Result<Vec<EarningsRecord>, CalendarError> {
        match self.fetch_page(&client::symbol_calendar_url(symbol)).await {
            Ok(page) => Ok(page.records),
            Err(err) => {
                tracing::debug!("Symbol lookup for {} failed: {}", symbol, err);
                Err(CalendarError::SymbolLookupFailed(symbol.to_string()))
            }
        }
    }

    /// Unix timestamp of the next scheduled earnings announcement for
    /// `symbol`.
    pub async fn next_earnings_date(&self, symbol: &str) -> Result<i64, CalendarError> {
        let no_upcoming = || CalendarError::NoUpcomingEarnings(symbol.to_string());

        let quote_page = self
            .fetcher
            .fetch(&client::quote_url(symbol))
            .await
            .map_err(|err| {
                tracing::debug!("Quote page fetch for {} failed: {}", symbol, err);
                no_upcoming()
            })?;

        // The legacy layout pre-computes the date in its quote summary.
        if let Some(timestamp) = self.extractor.next_earnings_hint(&quote_page) {
            return Ok(timestamp);
        }

        // Otherwise scan the symbol's calendar for the earliest start time
        // still ahead of the current moment, in UTC. Entries that carry only
        // a date, or fail to parse, are skipped rather than aborting.
        let mut records = self.earnings_of(symbol).await.map_err(|_| no_upcoming())?;
        records.sort_by(|a, b| {
            a.start_date_time
                .as_deref()
                .unwrap_or("")
                .cmp(b.start_date_time.as_deref().unwrap_or(""))
        });
        let now = Utc::now().naive_utc();
        for record in &records {
            if let Some(start) = record.start_date_time_utc() {
                if start >= now {
                    return Ok(start.and_utc().timestamp());
                }
            }
        }
        Err(no_upcoming())
    }
}
