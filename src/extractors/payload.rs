// src/extractors/payload.rs

// --- Imports ---
use crate::extractors::normalize;
use crate::utils::error::ExtractError;
use crate::yahoo::models::{PageResultSet, SvelteKitEnvelope, VisualizationBody};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

// --- Constants ---
// Brittle string matches against an undocumented upstream schema. Treat as
// configuration to update when Yahoo ships a new layout, not as invariants.
const EARNINGS_ENTITY_TYPE: &str = "SP_EARNINGS";
const APP_MAIN_PREFIX: &str = "root.App.main = ";
const SCREENER_ROWS_PATH: &str =
    "/context/dispatcher/stores/ScreenerResultsStore/results/rows";
const SCREENER_TOTAL_PATH: &str =
    "/context/dispatcher/stores/ScreenerCriteriaStore/meta/total";
const NEXT_EARNINGS_PATH: &str =
    "/context/dispatcher/stores/QuoteSummaryStore/calendarEvents/earnings/earningsDate/0/raw";

// --- CSS Selectors / Regex (Lazy Static) ---
static FETCHED_SCRIPT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/json"][data-sveltekit-fetched]"#)
        .expect("Failed to compile FETCHED_SCRIPT_SELECTOR")
});

static VISUALIZATION_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://query[12]\.finance\.yahoo\.com/v1/finance/visualization")
        .expect("Failed to compile VISUALIZATION_URL_RE")
});

/// One recognized page layout. Each variant independently reports
/// match/no-match; the extractor tries them in fixed priority order, so a
/// future layout means one new implementation here, not new branching.
trait PageLayout {
    fn label(&self) -> &'static str;
    fn try_extract(&self, page: &str) -> Option<PageResultSet>;
}

/// Current layout: SvelteKit embeds backend responses in
/// `<script type="application/json" data-sveltekit-fetched data-url="...">`
/// elements. The ones tied to the visualization endpoint carry earnings.
struct SvelteKitScripts;

impl PageLayout for SvelteKitScripts {
    fn label(&self) -> &'static str {
        "sveltekit-scripts"
    }

    fn try_extract(&self, page: &str) -> Option<PageResultSet> {
        let document = Html::parse_document(page);
        for element in document.select(&FETCHED_SCRIPT_SELECTOR) {
            let Some(data_url) = element.value().attr("data-url") else {
                continue;
            };
            if !VISUALIZATION_URL_RE.is_match(data_url) {
                continue;
            }
            let body = element.text().collect::<String>();
            if let Some(page_set) = extract_from_envelope(&body) {
                return Some(page_set);
            }
            tracing::trace!("Candidate script at {} did not match", data_url);
        }
        None
    }
}

/// Parse one candidate script body: a JSON envelope whose `body` field is
/// itself serialized JSON holding the result list. Parse failures and
/// missing keys mean "this candidate doesn't match", never a hard failure.
fn extract_from_envelope(raw: &str) -> Option<PageResultSet> {
    let envelope: SvelteKitEnvelope = serde_json::from_str(raw).ok()?;
    let body: VisualizationBody = serde_json::from_str(&envelope.body).ok()?;
    for result in &body.finance.result {
        for document in &result.documents {
            if document.entity_id_type.as_deref() == Some(EARNINGS_ENTITY_TYPE) {
                if let Ok(page_set) = normalize::normalize(result, document) {
                    return Some(page_set);
                }
            }
        }
    }
    None
}

/// Older layout: the page assigns its entire app state to a global in one
/// line of inline script. The state already carries the target row shape.
struct AppMainAssignment;

impl PageLayout for AppMainAssignment {
    fn label(&self) -> &'static str {
        "app-main-assignment"
    }

    fn try_extract(&self, page: &str) -> Option<PageResultSet> {
        let state = app_main_state(page)?;
        let rows = state.pointer(SCREENER_ROWS_PATH)?.as_array()?;
        let records = rows
            .iter()
            .map(|row| serde_json::from_value(row.clone()))
            .collect::<Result<Vec<_>, _>>()
            .ok()?;
        let total = state
            .pointer(SCREENER_TOTAL_PATH)
            .and_then(Value::as_u64)
            .unwrap_or(rows.len() as u64);
        Some(PageResultSet { records, total })
    }
}

/// Finds the unique assignment line, strips the prefix and the trailing
/// semicolon, and parses the remainder as JSON.
fn app_main_state(page: &str) -> Option<Value> {
    let line = page.lines().find(|line| line.starts_with(APP_MAIN_PREFIX))?;
    let json = line.trim_end().strip_suffix(';')?.strip_prefix(APP_MAIN_PREFIX)?;
    serde_json::from_str(json).ok()
}

/// Pulls the embedded earnings payload out of raw page markup.
pub struct PayloadExtractor;

impl PayloadExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts one page's result set, trying the current layout first and
    /// the legacy one second. Fails only when both are exhausted.
    pub fn extract(&self, page: &str) -> Result<PageResultSet, ExtractError> {
        let layouts: [&dyn PageLayout; 2] = [&SvelteKitScripts, &AppMainAssignment];
        for layout in layouts {
            if let Some(page_set) = layout.try_extract(page) {
                tracing::debug!(
                    "Extracted {} records (total {}) via {} layout",
                    page_set.records.len(),
                    page_set.total,
                    layout.label()
                );
                return Ok(page_set);
            }
            tracing::trace!("{} layout did not match", layout.label());
        }
        Err(ExtractError::UnparseableFormat)
    }

    /// Pre-computed next-earnings timestamp from the quote-summary block.
    /// Only the legacy layout carries one.
    pub fn next_earnings_hint(&self, page: &str) -> Option<i64> {
        app_main_state(page)?.pointer(NEXT_EARNINGS_PATH)?.as_i64()
    }
}

impl Default for PayloadExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::fixtures::{
        empty_page, legacy_calendar_page, legacy_quote_page, row_object, row_values,
        visualization_document, visualization_page, visualization_page_with, EARNINGS_COLUMNS,
    };
    use serde_json::json;

    #[test]
    fn sveltekit_page_extracts_records_in_row_order() {
        let rows = json!([
            row_values("AAA", "2018-02-01T11:00:00.000-05:00"),
            row_values("BBB", "2018-02-01T16:00:00.000-05:00"),
            row_values("CCC", "2018-02-01T21:00:00.000-05:00"),
        ]);
        let page = visualization_page(&rows, 3);

        let result = PayloadExtractor::new().extract(&page).unwrap();
        assert_eq!(result.total, 3);
        let tickers: Vec<&str> = result.records.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, ["AAA", "BBB", "CCC"]);
        assert_eq!(
            result.records[0].company_short_name.as_deref(),
            Some("AAA Inc.")
        );
    }

    #[test]
    fn legacy_page_extracts_natively() {
        let rows = json!([
            row_object("AAA", "2018-02-01T11:00:00.000-05:00"),
            row_object("BBB", "2018-02-01T16:00:00.000-05:00"),
        ]);
        let page = legacy_calendar_page(&rows, 250);

        let result = PayloadExtractor::new().extract(&page).unwrap();
        assert_eq!(result.total, 250);
        assert_eq!(result.records[0].ticker, "AAA");
        assert_eq!(result.records[1].ticker, "BBB");
    }

    #[test]
    fn both_layouts_yield_identical_result_sets() {
        let starts = ["2018-02-01T11:00:00.000-05:00", "2018-02-01T16:00:00.000-05:00"];
        let columnar = json!([row_values("AAA", starts[0]), row_values("BBB", starts[1])]);
        let objects = json!([row_object("AAA", starts[0]), row_object("BBB", starts[1])]);

        let extractor = PayloadExtractor::new();
        let from_sveltekit = extractor.extract(&visualization_page(&columnar, 2)).unwrap();
        let from_legacy = extractor.extract(&legacy_calendar_page(&objects, 2)).unwrap();
        assert_eq!(from_sveltekit, from_legacy);
    }

    #[test]
    fn non_earnings_documents_are_skipped() {
        let documents = vec![
            visualization_document("SP_IPO", &["ticker"], &json!([["ZZZ"]])),
            visualization_document(
                "SP_EARNINGS",
                EARNINGS_COLUMNS,
                &json!([row_values("AAA", "2018-02-01T11:00:00.000-05:00")]),
            ),
        ];
        let page = visualization_page_with(documents, 1);

        let result = PayloadExtractor::new().extract(&page).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].ticker, "AAA");
    }

    #[test]
    fn scripts_for_other_endpoints_are_ignored() {
        let page = format!(
            "<html><body><script type=\"application/json\" data-sveltekit-fetched \
             data-url=\"https://query1.finance.yahoo.com/v7/finance/quote?symbols=AAA\">\
             {}</script></body></html>",
            json!({ "status": 200, "body": "{}" })
        );
        assert!(matches!(
            PayloadExtractor::new().extract(&page),
            Err(ExtractError::UnparseableFormat)
        ));
    }

    #[test]
    fn corrupt_script_candidate_falls_through_to_legacy() {
        let broken = "<html><body><script type=\"application/json\" data-sveltekit-fetched \
                      data-url=\"https://query2.finance.yahoo.com/v1/finance/visualization?p=1\">\
                      {not json</script></body></html>";
        let rows = json!([row_object("AAA", "2018-02-01T11:00:00.000-05:00")]);
        let page = format!("{broken}\n{}", legacy_calendar_page(&rows, 1));

        let result = PayloadExtractor::new().extract(&page).unwrap();
        assert_eq!(result.records[0].ticker, "AAA");
    }

    #[test]
    fn unrecognizable_page_is_unparseable() {
        assert!(matches!(
            PayloadExtractor::new().extract(&empty_page()),
            Err(ExtractError::UnparseableFormat)
        ));
    }

    #[test]
    fn assignment_line_without_semicolon_does_not_match() {
        let page = "<html><body><script>\nroot.App.main = {\"context\":{}}\n</script></body></html>";
        assert!(matches!(
            PayloadExtractor::new().extract(page),
            Err(ExtractError::UnparseableFormat)
        ));
    }

    #[test]
    fn next_earnings_hint_reads_the_quote_summary() {
        let extractor = PayloadExtractor::new();
        assert_eq!(
            extractor.next_earnings_hint(&legacy_quote_page(1517520600)),
            Some(1517520600)
        );
        assert_eq!(extractor.next_earnings_hint(&empty_page()), None);

        let sveltekit = visualization_page(
            &json!([row_values("AAA", "2018-02-01T11:00:00.000-05:00")]),
            1,
        );
        assert_eq!(extractor.next_earnings_hint(&sveltekit), None);
    }

    #[test]
    fn total_spans_pages_beyond_this_one() {
        let rows = json!([row_values("AAA", "2018-02-01T11:00:00.000-05:00")]);
        let result = PayloadExtractor::new()
            .extract(&visualization_page(&rows, 250))
            .unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.total, 250);
    }
}
