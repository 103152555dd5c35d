//! Report rendering
//!
//! Fixed-column text tables for terminal output and JSON for downstream
//! tooling. The table columns and their precision are stable:
//!
//! | report            | columns                                                                |
//! |-------------------|------------------------------------------------------------------------|
//! | [`EventReport`]   | Event ID, GW Strength (.1), Mag Strength (.1), Space Weather, Classification, Est. EM Flash (UTC) |
//! | [`SymmetryReport`] | Event ID, Category, one score column per detector (.2 or `N/A`), Verdict |
//!
//! JSON output carries the unrounded values and every flag, including
//! whether synthetic content was injected.

use serde::Serialize;

use crate::pipeline::{AnalysisResult, SymmetryResult};
use crate::types::Detector;

const TITLE_EVENTS: &str = "GW CANDIDATE AUDIT REPORT";
const TITLE_SYMMETRY: &str = "DETECTOR SYMMETRY REPORT";

/// Event audit rows in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventReport {
    pub rows: Vec<AnalysisResult>,
}

impl EventReport {
    pub fn new(rows: Vec<AnalysisResult>) -> Self {
        Self { rows }
    }

    pub const HEADERS: [&'static str; 6] = [
        "Event ID",
        "GW Strength",
        "Mag Strength",
        "Space Weather",
        "Classification",
        "Est. EM Flash (UTC)",
    ];

    /// Table cells, one `Vec` per row, formatted at report precision.
    pub fn cells(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                vec![
                    r.event_id.clone(),
                    format!("{:.1}", r.gravitational_strength),
                    format!("{:.1}", r.magnetic_strength),
                    r.space_weather.to_string(),
                    r.classification.to_string(),
                    r.flash_utc.clone(),
                ]
            })
            .collect()
    }

    pub fn render_table(&self) -> String {
        render(TITLE_EVENTS, &Self::HEADERS, &self.cells())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.rows)
    }
}

/// Symmetry audit rows in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymmetryReport {
    /// Score columns, in order
    pub detectors: Vec<Detector>,
    pub rows: Vec<SymmetryResult>,
}

impl SymmetryReport {
    pub fn new(detectors: Vec<Detector>, rows: Vec<SymmetryResult>) -> Self {
        Self { detectors, rows }
    }

    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec!["Event ID".to_string(), "Category".to_string()];
        headers.extend(self.detectors.iter().map(|d| d.to_string()));
        headers.push("Verdict".to_string());
        headers
    }

    pub fn cells(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                let mut row = vec![r.event_id.clone(), r.category.clone()];
                for detector in &self.detectors {
                    row.push(match r.score_for(*detector) {
                        Some(score) => format!("{:.2}", score),
                        None => "N/A".to_string(),
                    });
                }
                row.push(r.verdict.to_string());
                row
            })
            .collect()
    }

    pub fn render_table(&self) -> String {
        let headers = self.headers();
        let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
        render(TITLE_SYMMETRY, &headers, &self.cells())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.rows)
    }
}

/// Left-aligned columns, two spaces apart, framed by `=` rules.
fn render(title: &str, headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let header = pad_line(headers.iter().copied(), &widths);
    let body: Vec<String> = rows
        .iter()
        .map(|row| pad_line(row.iter().map(String::as_str), &widths))
        .collect();
    let rule_len = body
        .iter()
        .map(|l| l.chars().count())
        .chain([header.chars().count(), title.len()])
        .max()
        .unwrap_or(0);
    let rule = "=".repeat(rule_len);

    let mut out = String::new();
    out.push_str(&rule);
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&header);
    out.push('\n');
    for l in &body {
        out.push_str(l);
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

fn pad_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(c, &w)| format!("{:<w$}", c, w = w))
        .collect();
    padded.join("  ").trim_end().to_string()
}
