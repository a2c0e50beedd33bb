//! Stage runners. Each stage reads the previous stage's file and writes its
//! own, so any stage can be re-run on its own.

use crate::assemble::assemble_records;
use crate::config::Config;
use crate::enrich::{enrich_songs, EnrichSummary, YtDlpSearch};
use crate::error::Result;
use crate::extract::extract_columns;
use crate::fetch::{build_client, fetch_page, save_page, summarize_page, PageSummary};
use crate::normalize::normalize_all;
use crate::report::{build_report, write_report};
use crate::storage::{ChartStore, LoadSummary};
use crate::types::{NormalizedRecord, RawRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

/// Result of a full fetch-to-report run
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub raw_records: usize,
    pub normalized_records: usize,
    pub songs_inserted: usize,
    pub dances: usize,
    pub associations: usize,
    pub report_rows: usize,
}

pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let content = fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&content)?)
}

pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path.as_ref(), json)?;
    Ok(())
}

/// Extract and assemble the chart rows from page markup
pub fn parse_page(html: &str, table_bgcolor: &str) -> Result<Vec<RawRecord>> {
    let columns = extract_columns(html, table_bgcolor)?;
    Ok(assemble_records(&columns))
}

#[instrument(skip(config), fields(url = %config.source.url))]
pub async fn fetch_stage(config: &Config) -> Result<PageSummary> {
    let client = build_client()?;
    let html = fetch_page(&client, &config.source.url).await?;
    save_page(&config.paths.raw_html, &html)?;

    let summary = summarize_page(&html);
    info!(
        "HTML length {} characters, {} table elements, {} pre elements",
        summary.html_len, summary.tables, summary.pre_blocks
    );
    Ok(summary)
}

pub fn parse_stage(config: &Config) -> Result<Vec<RawRecord>> {
    let html = fs::read_to_string(&config.paths.raw_html)?;
    let records = parse_page(&html, &config.source.table_bgcolor)?;
    write_json(&config.paths.raw_json, &records)?;
    info!("Saved {} records to {}", records.len(), config.paths.raw_json.display());
    Ok(records)
}

pub fn normalize_stage(config: &Config) -> Result<Vec<NormalizedRecord>> {
    let raw: Vec<RawRecord> = read_json(&config.paths.raw_json)?;
    let normalized = normalize_all(&raw);
    write_json(&config.paths.normalized_json, &normalized)?;
    info!("Saved normalized records to {}", config.paths.normalized_json.display());
    Ok(normalized)
}

pub fn load_stage(config: &Config) -> Result<(ChartStore, LoadSummary)> {
    let records: Vec<NormalizedRecord> = read_json(&config.paths.normalized_json)?;
    let mut store = ChartStore::open(&config.paths.database)?;
    store.create_schema()?;
    info!("Database schema ready at {}", config.paths.database.display());

    let summary = store.load_records(&records)?;
    Ok((store, summary))
}

pub async fn enrich_stage(config: &Config) -> Result<EnrichSummary> {
    let store = ChartStore::open(&config.paths.database)?;
    store.create_schema()?;
    let search = YtDlpSearch::from_config(&config.enrich);
    enrich_songs(&store, &search, config.enrich.batch_size).await
}

pub fn report_stage(config: &Config) -> Result<usize> {
    let store = ChartStore::open(&config.paths.database)?;
    store.create_schema()?;
    let (html, rows) = build_report(&store)?;
    write_report(&config.paths.report, &html)?;
    info!("Generated report with {} songs", rows);
    Ok(rows)
}

/// Fetch through report. Enrichment is left to its own command.
pub async fn run_all(config: &Config) -> Result<RunSummary> {
    fetch_stage(config).await?;
    let raw = parse_stage(config)?;
    let normalized = normalize_stage(config)?;
    let (_, load) = load_stage(config)?;
    let report_rows = report_stage(config)?;

    Ok(RunSummary {
        raw_records: raw.len(),
        normalized_records: normalized.len(),
        songs_inserted: load.songs_inserted,
        dances: load.distinct_dances,
        associations: load.associations_inserted,
        report_rows,
    })
}
