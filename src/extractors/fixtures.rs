// src/extractors/fixtures.rs
//! Canned page builders shared by the extraction and calendar tests.

use serde_json::{json, Value};

pub(crate) const EARNINGS_COLUMNS: &[&str] = &[
    "ticker",
    "companyshortname",
    "startdatetime",
    "startdatetimetype",
    "epsestimate",
    "epsactual",
    "epssurprisepct",
    "gmtOffsetMilliSeconds",
];

/// One positional row aligned to [`EARNINGS_COLUMNS`].
pub(crate) fn row_values(ticker: &str, start: &str) -> Value {
    json!([ticker, format!("{ticker} Inc."), start, "TAS", 1.02, null, null, 0])
}

/// The same logical row in the legacy object shape.
pub(crate) fn row_object(ticker: &str, start: &str) -> Value {
    json!({
        "ticker": ticker,
        "companyshortname": format!("{ticker} Inc."),
        "startdatetime": start,
        "startdatetimetype": "TAS",
        "epsestimate": 1.02,
        "epsactual": null,
        "epssurprisepct": null,
        "gmtOffsetMilliSeconds": 0,
    })
}

pub(crate) fn visualization_document(entity: &str, columns: &[&str], rows: &Value) -> Value {
    json!({
        "entityIdType": entity,
        "columns": columns.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>(),
        "rows": rows,
    })
}

/// A SvelteKit-layout page whose visualization script carries `documents`.
pub(crate) fn visualization_page_with(documents: Vec<Value>, total: u64) -> String {
    let body = json!({ "finance": { "result": [{ "total": total, "documents": documents }] } });
    let envelope = json!({ "status": 200, "body": body.to_string() });
    format!(
        "<html><head></head><body>\n\
         <script type=\"application/json\" data-sveltekit-fetched \
         data-url=\"https://query1.finance.yahoo.com/v1/finance/visualization?lang=en-US\">\
         {envelope}</script>\n\
         </body></html>"
    )
}

/// A SvelteKit-layout page with one earnings document.
pub(crate) fn visualization_page(rows: &Value, total: u64) -> String {
    visualization_page_with(
        vec![visualization_document("SP_EARNINGS", EARNINGS_COLUMNS, rows)],
        total,
    )
}

/// A legacy-layout calendar page with the given screener rows and total.
pub(crate) fn legacy_calendar_page(rows: &Value, total: u64) -> String {
    let state = json!({ "context": { "dispatcher": { "stores": {
        "ScreenerCriteriaStore": { "meta": { "total": total } },
        "ScreenerResultsStore": { "results": { "rows": rows } },
    } } } });
    format!("<html><body><script>\nroot.App.main = {state};\n</script></body></html>")
}

/// A legacy-layout quote page carrying a pre-computed next earnings date.
pub(crate) fn legacy_quote_page(next_earnings_ts: i64) -> String {
    let state = json!({ "context": { "dispatcher": { "stores": {
        "QuoteSummaryStore": { "calendarEvents": { "earnings": {
            "earningsDate": [{ "raw": next_earnings_ts, "fmt": "2018-02-01" }]
        } } },
    } } } });
    format!("<html><body><script>\nroot.App.main = {state};\n</script></body></html>")
}

/// A page carrying neither layout.
pub(crate) fn empty_page() -> String {
    "<html><head><title>Earnings</title></head><body><p>No data.</p></body></html>".to_string()
}
