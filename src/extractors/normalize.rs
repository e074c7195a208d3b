// src/extractors/normalize.rs
use crate::utils::error::ExtractError;
use crate::yahoo::models::{
    EarningsRecord, PageResultSet, VisualizationDocument, VisualizationResult,
};
use serde_json::{Map, Value};

/// Converts the visualization API's columnar layout into the row-map shape
/// the legacy page format carries natively.
///
/// Downstream code never needs to know which page layout produced a
/// `PageResultSet`; this equivalence is the whole point of the step.
pub fn normalize(
    result: &VisualizationResult,
    document: &VisualizationDocument,
) -> Result<PageResultSet, ExtractError> {
    let columns: Vec<&str> = document.columns.iter().map(|c| c.id.as_str()).collect();

    let mut records = Vec::with_capacity(document.rows.len());
    for row in &document.rows {
        let mapped = Value::Object(row_to_map(&columns, row));
        // A row that doesn't fit the record shape fails the whole page;
        // partial pages are never surfaced.
        let record: EarningsRecord =
            serde_json::from_value(mapped).map_err(|_| ExtractError::UnparseableFormat)?;
        records.push(record);
    }

    let total = result.total.unwrap_or(document.rows.len() as u64);
    Ok(PageResultSet { records, total })
}

/// Zips column identifiers against one positional row. Positions beyond the
/// row's length map to null.
pub(crate) fn row_to_map(columns: &[&str], row: &[Value]) -> Map<String, Value> {
    let mut mapped = Map::new();
    for (index, column) in columns.iter().enumerate() {
        let value = row.get(index).cloned().unwrap_or(Value::Null);
        mapped.insert((*column).to_string(), value);
    }
    mapped
}
