// src/scoring/records.rs — Parse detector result files into fixed records
//
// Result files are comma-separated with a header row. Required columns:
// timestamp, value, anomaly_score, raw_score, label. Column order is free and
// extra columns are ignored. Fields never contain commas.

use std::path::Path;

use super::timestamp::parse_timestamp;
use super::types::SeriesRecord;
use crate::infra::errors::{Result, ScoreError};

const REQUIRED_COLUMNS: [&str; 5] = ["timestamp", "value", "anomaly_score", "raw_score", "label"];

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    timestamp: usize,
    value: usize,
    anomaly_score: usize,
    raw_score: usize,
    label: usize,
}

impl ColumnIndex {
    fn from_header(header: &str, path: &Path) -> Result<Self> {
        let names: Vec<&str> = header.split(',').map(clean_field).collect();
        let find = |column: &str| {
            names.iter().position(|n| *n == column).ok_or_else(|| {
                ScoreError::malformed_row(path, 1, format!("header is missing column '{column}'"))
            })
        };
        Ok(Self {
            timestamp: find(REQUIRED_COLUMNS[0])?,
            value: find(REQUIRED_COLUMNS[1])?,
            anomaly_score: find(REQUIRED_COLUMNS[2])?,
            raw_score: find(REQUIRED_COLUMNS[3])?,
            label: find(REQUIRED_COLUMNS[4])?,
        })
    }
}

/// Read and parse one result file.
pub fn read_records(path: &Path) -> Result<Vec<SeriesRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| ScoreError::io(path, e))?;
    parse_records(&content, path)
}

/// Parse result-file content. `path` is only used in error messages.
pub fn parse_records(content: &str, path: &Path) -> Result<Vec<SeriesRecord>> {
    let mut lines = content.lines().enumerate();
    let header = loop {
        match lines.next() {
            Some((_, line)) if line.trim().is_empty() => continue,
            Some((_, line)) => break line,
            None => return Ok(Vec::new()),
        }
    };
    let columns = ColumnIndex::from_header(header, path)?;

    let mut records = Vec::new();
    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_row(line, idx + 1, &columns, path)?);
    }
    Ok(records)
}

fn parse_row(line: &str, line_no: usize, columns: &ColumnIndex, path: &Path) -> Result<SeriesRecord> {
    let fields: Vec<&str> = line.split(',').map(clean_field).collect();
    let field = |index: usize, name: &str| {
        fields
            .get(index)
            .copied()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| ScoreError::malformed_row(path, line_no, format!("missing field '{name}'")))
    };
    let float = |index: usize, name: &str| -> Result<f64> {
        let raw = field(index, name)?;
        raw.parse::<f64>().map_err(|_| {
            ScoreError::malformed_row(path, line_no, format!("field '{name}' is not a number: '{raw}'"))
        })
    };
    let score = |index: usize, name: &str| -> Result<f64> {
        let value = float(index, name)?;
        if !value.is_finite() {
            return Err(ScoreError::malformed_row(
                path,
                line_no,
                format!("field '{name}' is not finite: {value}"),
            ));
        }
        Ok(value)
    };

    let timestamp = parse_timestamp(field(columns.timestamp, "timestamp")?)?;
    let value = float(columns.value, "value")?;
    let anomaly_score = score(columns.anomaly_score, "anomaly_score")?;
    let raw_score = score(columns.raw_score, "raw_score")?;
    let label = match field(columns.label, "label")? {
        "0" => false,
        "1" => true,
        other => {
            return Err(ScoreError::malformed_row(
                path,
                line_no,
                format!("field 'label' must be 0 or 1: '{other}'"),
            ))
        }
    };

    Ok(SeriesRecord {
        timestamp,
        value,
        anomaly_score,
        raw_score,
        label,
    })
}

fn clean_field(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}
