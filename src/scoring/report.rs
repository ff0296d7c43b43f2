// src/scoring/report.rs — Render aggregate and per-series results

use std::fmt::Write as _;

use super::timestamp::format_timestamp;
use super::types::{AggregateReport, ClassificationResult};

/// Plain-text aggregate: one `label value` line per total, then the ranked
/// series ids, one per line.
pub fn render_text(report: &AggregateReport) -> String {
    let mut out = String::new();
    let lines: [(&str, String); 7] = [
        ("total true positives", report.true_positives.to_string()),
        ("detected windows", report.detected_windows.to_string()),
        (
            "max positive from detected windows",
            format_weight(report.max_positive_detected),
        ),
        ("undetected windows", report.undetected_windows.to_string()),
        (
            "max positive from undetected windows",
            format_weight(report.max_positive_undetected),
        ),
        ("false positives", report.false_positives.to_string()),
        ("max negative from fp", format_weight(report.fp_penalty)),
    ];
    for (label, value) in lines {
        let _ = writeln!(out, "{label} {value}");
    }
    for missed in &report.worst_offenders {
        let _ = writeln!(out, "{}", missed.series);
    }
    out
}

pub fn to_json(report: &AggregateReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Window-by-window breakdown of one series.
pub fn render_series(result: &ClassificationResult, threshold: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (threshold {})", result.series, threshold);

    if result.windows.is_empty() {
        let _ = writeln!(out, "  no anomaly windows");
    }
    for (i, window) in result.windows.iter().enumerate() {
        let status = if window.is_detected() { "detected" } else { "missed" };
        let _ = writeln!(
            out,
            "  window {} [{}]: {} ({} detections)",
            i + 1,
            window.window,
            status,
            window.detections.len()
        );
        for ts in &window.detections {
            let _ = writeln!(out, "    {}", format_timestamp(ts));
        }
    }

    let _ = writeln!(out, "  false positives: {}", result.false_positives.len());
    for ts in &result.false_positives {
        let _ = writeln!(out, "    {}", format_timestamp(ts));
    }
    out
}

/// Weighted totals always carry a fractional part, rounded to six places with
/// trailing zeros removed.
fn format_weight(value: f64) -> String {
    let fixed = format!("{value:.6}");
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}
