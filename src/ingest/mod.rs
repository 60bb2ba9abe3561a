pub mod campaigns;
pub mod orders;

use chrono::NaiveDate;

/// Per-run ingest accounting. Malformed rows are dropped and counted,
/// never fatal.
#[derive(Debug, Default, Clone)]
pub struct IngestStats {
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub issues: Vec<RowIssue>,
}

/// One dropped row and why.
#[derive(Debug, Clone)]
pub struct RowIssue {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub reason: String,
}

impl IngestStats {
    pub fn drop_row(&mut self, row: usize, reason: impl Into<String>) {
        self.rows_dropped += 1;
        self.issues.push(RowIssue { row, reason: reason.into() });
    }
}

/// Case-insensitive, BOM-tolerant lookup over one CSV row.
///
/// Amazon exports rename columns between report types ("Total cost" vs
/// "Spend", "Purchase Date" vs "Order Date"), so every field is fetched
/// through an alias list.
pub struct RowView {
    headers: Vec<String>,
    values: Vec<String>,
}

impl RowView {
    pub fn new(headers: &csv::StringRecord, record: &csv::StringRecord) -> Self {
        let headers = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();
        let values = record.iter().map(|v| v.trim().to_string()).collect();
        Self { headers, values }
    }

    /// First non-empty value among the aliased columns.
    pub fn get(&self, aliases: &[&str]) -> Option<&str> {
        for alias in aliases {
            let wanted = alias.to_lowercase();
            if let Some(idx) = self.headers.iter().position(|h| *h == wanted) {
                let value = self.values.get(idx).map(String::as_str).unwrap_or("");
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
        None
    }
}

/// Parse a currency cell ("$1,234.56") to a float. Missing or junk
/// values count as zero, matching how the exports encode "no spend".
pub fn parse_currency(raw: Option<&str>) -> f64 {
    parse_number(raw)
}

/// Parse a numeric cell, tolerating thousands separators and stray quotes.
pub fn parse_number(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else { return 0.0 };
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '"' | ' '))
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse().unwrap_or(0.0)
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse the date formats seen in order exports. Returns None on failure;
/// callers decide whether the field was required.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    // Timestamps with offsets ("2026-01-15T10:30:00+00:00")
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    None
}
