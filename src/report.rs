use crate::error::{ChartError, Result};
use crate::storage::ChartStore;
use crate::types::ReportRow;
use askama::Template;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Template)]
#[template(path = "report.html")]
pub struct ReportTemplate<'a> {
    pub rows: &'a [ReportRow],
    pub generated_on: String,
}

/// Leading number of a tempo: "170-180" sorts as 170
pub fn tempo_sort_key(tempo: &str) -> Result<i64> {
    let lead = tempo.split('-').next().unwrap_or(tempo).trim();
    lead.parse::<i64>().map_err(|_| ChartError::InvalidTempo {
        tempo: tempo.to_string(),
    })
}

/// Stable sort by tempo; one malformed tempo fails the whole report
pub fn sort_by_tempo(rows: Vec<ReportRow>) -> Result<Vec<ReportRow>> {
    let mut keyed = rows
        .into_iter()
        .map(|row| -> Result<(i64, ReportRow)> { Ok((tempo_sort_key(&row.tempo)?, row)) })
        .collect::<Result<Vec<(i64, ReportRow)>>>()?;
    keyed.sort_by_key(|(key, _)| *key);
    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

pub fn render_report(rows: &[ReportRow]) -> Result<String> {
    let template = ReportTemplate {
        rows,
        generated_on: chrono::Local::now().format("%Y-%m-%d").to_string(),
    };
    Ok(template.render()?)
}

/// Query, sort and render the whole chart
pub fn build_report(store: &ChartStore) -> Result<(String, usize)> {
    let rows = sort_by_tempo(store.report_rows()?)?;
    let html = render_report(&rows)?;
    Ok((html, rows.len()))
}

pub fn write_report<P: AsRef<Path>>(path: P, html: &str) -> Result<()> {
    fs::write(path.as_ref(), html)?;
    info!("Report written to {}", path.as_ref().display());
    Ok(())
}
