//! Flat-file bootstrap: `date,product_id,quantity_sold` rows.
//!
//! Fields may be wrapped in double quotes, and commas inside quotes do not split. Doubled quotes
//! (`""`) inside a quoted field are not unescaped, and a field cannot span lines.

use crate::StoreError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use forecast_model::SaleRecord;
use std::path::Path;

const DATETIME_FORMATS: [&str; 4] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Accepts `YYYY-MM-DD[ T]HH:MM:SS[.f]`, RFC 3339, or a bare date (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Some(ts) = DATETIME_FORMATS.iter().find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok()) {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn read_csv(path: &Path) -> Result<Vec<SaleRecord>, StoreError> {
    let text = std::fs::read_to_string(path).map_err(|source| StoreError::Io { path: path.display().to_string(), source })?;
    parse_csv(&text, &path.display().to_string())
}

fn parse_csv(text: &str, origin: &str) -> Result<Vec<SaleRecord>, StoreError> {
    let csv_err = |line: usize, reason: String| StoreError::Csv { path: origin.to_string(), line, reason };
    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
    let (_, header) = lines.next().ok_or_else(|| csv_err(1, "missing header row".into()))?;
    let columns: Vec<&str> = split_row(header);
    let col = |name: &str| columns.iter().position(|c| *c == name).ok_or_else(|| csv_err(1, format!("missing column '{name}'")));
    let (date_i, id_i, qty_i) = (col("date")?, col("product_id")?, col("quantity_sold")?);

    let mut out = Vec::new();
    for (idx, line) in lines {
        let lineno = idx + 1;
        let fields = split_row(line);
        let field = |i: usize| fields.get(i).copied().ok_or_else(|| csv_err(lineno, format!("expected {} fields, got {}", columns.len(), fields.len())));
        let date = field(date_i)?;
        let timestamp = parse_timestamp(date).ok_or_else(|| csv_err(lineno, format!("unparseable date '{date}'")))?;
        let id = field(id_i)?;
        let entity_id = id.parse::<i64>().map_err(|e| csv_err(lineno, format!("product_id '{id}': {e}")))?;
        let qty = field(qty_i)?;
        let quantity = qty.parse::<u32>().map_err(|e| csv_err(lineno, format!("quantity_sold '{qty}': {e}")))?;
        out.push(SaleRecord::new(timestamp, entity_id, quantity));
    }
    Ok(out)
}

fn split_row(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let (mut start, mut quoted) = (0, false);
    for (i, b) in line.bytes().enumerate() {
        match b {
            b'"' => quoted = !quoted,
            b',' if !quoted => {
                fields.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(&line[start..]);
    fields.into_iter().map(|f| f.trim().trim_matches('"')).collect()
}
