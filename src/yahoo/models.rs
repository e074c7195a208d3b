// src/yahoo/models.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One announced-or-expected earnings event, as Yahoo reports it.
///
/// Field names follow the upstream column identifiers via serde renames so
/// rows deserialize straight out of either page layout. Records are value
/// objects; nothing mutates them after extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarningsRecord {
    // Rows have carried a ticker in every layout seen so far, but a missing
    // column must not sink the whole page.
    #[serde(default)]
    pub ticker: String,

    #[serde(default, rename = "companyshortname")]
    pub company_short_name: Option<String>,

    /// ISO-8601-like, e.g. "2017-04-23T20:00:00.000-04:00". May carry a UTC
    /// offset or a millisecond suffix, or be a bare date for some entries.
    #[serde(default, rename = "startdatetime")]
    pub start_date_time: Option<String>,

    /// Start-time tag such as "TAS" (time as scheduled).
    #[serde(default, rename = "startdatetimetype")]
    pub start_date_time_type: Option<String>,

    #[serde(default, rename = "epsestimate")]
    pub eps_estimate: Option<f64>,

    #[serde(default, rename = "epsactual")]
    pub eps_actual: Option<f64>,

    #[serde(default, rename = "epssurprisepct")]
    pub eps_surprise_pct: Option<f64>,

    #[serde(default, rename = "gmtOffsetMilliSeconds")]
    pub gmt_offset_ms: Option<i64>,
}

impl EarningsRecord {
    /// Scheduled start parsed as a naive UTC datetime.
    ///
    /// Only the leading `YYYY-MM-DDTHH:MM:SS` is read; a fractional-second
    /// suffix is clipped at the first `.`, and any zone offset past the 19th
    /// character is dropped. Bare dates and anything else that fails to
    /// parse yield `None`.
    pub fn start_date_time_utc(&self) -> Option<NaiveDateTime> {
        let raw = self.start_date_time.as_deref()?;
        if !raw.contains('T') {
            return None;
        }
        let clipped = match raw.find('.') {
            Some(dot) => &raw[..dot],
            None => raw.get(..19)?,
        };
        NaiveDateTime::parse_from_str(clipped, "%Y-%m-%dT%H:%M:%S").ok()
    }
}

/// The outcome of extracting one page: the page's records in source row
/// order, plus the server-reported count across all pages of the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResultSet {
    pub records: Vec<EarningsRecord>,
    pub total: u64,
}

// --- Embedded visualization payload ---
// Typed mirror of the JSON Yahoo places inside data-sveltekit-fetched script
// elements. The outer envelope wraps a second JSON document in its `body`
// string; that inner document carries the columnar earnings data.

#[derive(Debug, Deserialize)]
pub struct SvelteKitEnvelope {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct VisualizationBody {
    pub finance: VisualizationFinance,
}

#[derive(Debug, Deserialize)]
pub struct VisualizationFinance {
    #[serde(default)]
    pub result: Vec<VisualizationResult>,
}

#[derive(Debug, Deserialize)]
pub struct VisualizationResult {
    /// Total record count across all pages. Absent on some responses.
    #[serde(default)]
    pub total: Option<u64>,

    #[serde(default)]
    pub documents: Vec<VisualizationDocument>,
}

#[derive(Debug, Deserialize)]
pub struct VisualizationDocument {
    #[serde(default, rename = "entityIdType")]
    pub entity_id_type: Option<String>,

    #[serde(default)]
    pub columns: Vec<VisualizationColumn>,

    /// Positional rows aligned to `columns`.
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub struct VisualizationColumn {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_start(start: Option<&str>) -> EarningsRecord {
        EarningsRecord {
            ticker: "BOX".to_string(),
            start_date_time: start.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn start_with_zone_offset_parses() {
        let record = record_with_start(Some("2017-04-23T20:00:00.000-04:00"));
        let parsed = record.start_date_time_utc().unwrap();
        assert_eq!(parsed.to_string(), "2017-04-23 20:00:00");
    }

    #[test]
    fn start_without_millis_parses() {
        let record = record_with_start(Some("2018-02-01T21:00:00Z"));
        let parsed = record.start_date_time_utc().unwrap();
        assert_eq!(parsed.to_string(), "2018-02-01 21:00:00");
    }

    #[test]
    fn bare_date_is_skipped() {
        assert!(record_with_start(Some("2018-02-01")).start_date_time_utc().is_none());
    }

    #[test]
    fn garbage_and_absent_starts_are_skipped() {
        assert!(record_with_start(Some("not a datetime")).start_date_time_utc().is_none());
        assert!(record_with_start(Some("2018-02-01Tnope")).start_date_time_utc().is_none());
        assert!(record_with_start(None).start_date_time_utc().is_none());
    }

    #[test]
    fn record_deserializes_from_upstream_keys() {
        let record: EarningsRecord = serde_json::from_value(serde_json::json!({
            "ticker": "AMS.S",
            "companyshortname": "Ams AG",
            "startdatetime": "2017-04-23T20:00:00.000-04:00",
            "startdatetimetype": "TAS",
            "epsestimate": null,
            "epsactual": null,
            "epssurprisepct": null,
            "gmtOffsetMilliSeconds": 72000000,
        }))
        .unwrap();
        assert_eq!(record.ticker, "AMS.S");
        assert_eq!(record.company_short_name.as_deref(), Some("Ams AG"));
        assert_eq!(record.start_date_time_type.as_deref(), Some("TAS"));
        assert_eq!(record.gmt_offset_ms, Some(72000000));
        assert!(record.eps_estimate.is_none());
    }
}
