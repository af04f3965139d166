//! Delimited survey tables
//!
//! Header row required. Columns are matched case-insensitively against a
//! short alias list, so exports from most locator and survey tools load
//! without editing. The delimiter is sniffed from the header line.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use super::{read_to_string, ImportError};
use crate::types::RawSurveyPoint;

const MD_ALIASES: &[&str] = &["md", "depth", "measured depth", "measured_depth", "md (ft)"];
const INC_ALIASES: &[&str] = &["inc", "incl", "inclination", "inc (deg)"];
const AZI_ALIASES: &[&str] = &["azi", "azimuth", "az", "azi (deg)"];
const FIELD_ALIASES: &[&str] = &["field", "total field", "btotal", "mag field"];

fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    // max_by_key keeps the last maximum, so comma wins ties
    [b';', b'\t', b',']
        .into_iter()
        .max_by_key(|d| header.bytes().filter(|b| b == d).count())
        .unwrap_or(b',')
}

fn find_column(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.iter().any(|a| h.trim().eq_ignore_ascii_case(a)))
}

fn parse_field(record: &StringRecord, idx: usize, field: &'static str) -> Result<f64, ImportError> {
    let raw = record.get(idx).unwrap_or_default();
    raw.parse::<f64>().map_err(|_| ImportError::InvalidValue {
        line: record.position().map_or(0, csv::Position::line),
        field,
        value: raw.to_string(),
    })
}

/// Parse a delimited survey table.
pub fn parse_delimited(text: &str) -> Result<Vec<RawSurveyPoint>, ImportError> {
    let delimiter = sniff_delimiter(text);
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let md_col = find_column(&headers, MD_ALIASES).ok_or(ImportError::MissingColumn("md"))?;
    let inc_col = find_column(&headers, INC_ALIASES).ok_or(ImportError::MissingColumn("inclination"))?;
    let azi_col = find_column(&headers, AZI_ALIASES).ok_or(ImportError::MissingColumn("azimuth"))?;
    let field_col = find_column(&headers, FIELD_ALIASES);

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let mut point = RawSurveyPoint::new(
            parse_field(&record, md_col, "md")?,
            parse_field(&record, inc_col, "inclination")?,
            parse_field(&record, azi_col, "azimuth")?,
        );
        if let Some(idx) = field_col {
            if record.get(idx).is_some_and(|v| !v.is_empty()) {
                point.measured_field_nt = Some(parse_field(&record, idx, "field")?);
            }
        }
        points.push(point);
    }

    debug!(points = points.len(), delimiter = %char::from(delimiter), "Parsed delimited survey");
    Ok(points)
}

/// Read and parse a delimited survey file.
pub fn read_delimited_file(path: &Path) -> Result<Vec<RawSurveyPoint>, ImportError> {
    parse_delimited(&read_to_string(path)?)
}
