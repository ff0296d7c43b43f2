// src/scoring/timestamp.rs — Fixed-format timestamp parsing

use chrono::NaiveDateTime;

use super::types::Timestamp;
use crate::infra::errors::{Result, ScoreError};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse `YYYY-MM-DD HH:MM:SS`. A fractional-seconds suffix of digits is
/// dropped, not rounded.
pub fn parse_timestamp(s: &str) -> Result<Timestamp> {
    let malformed = || ScoreError::MalformedTimestamp {
        value: s.to_string(),
    };
    let trimmed = s.trim();
    let whole = match trimmed.split_once('.') {
        Some((whole, fraction)) => {
            if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            whole
        }
        None => trimmed,
    };
    NaiveDateTime::parse_from_str(whole, TIMESTAMP_FORMAT).map_err(|_| malformed())
}

pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
