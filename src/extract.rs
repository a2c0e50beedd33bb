//! Chart table extraction.
//!
//! The chart page is a single table laid out as four tall cells, one per
//! column, each holding one `<p>` per row. The cells are found by their
//! header text and read paragraph by paragraph.

use crate::error::{ChartError, Result};
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartColumn {
    Tempo,
    Title,
    Artist,
    Dance,
}

impl fmt::Display for ChartColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartColumn::Tempo => "BEATS PER MIN",
            ChartColumn::Title => "SONG TITLE",
            ChartColumn::Artist => "ARTIST",
            ChartColumn::Dance => "SUGGESTED DANCE",
        };
        f.write_str(name)
    }
}

/// Paragraph text of the four chart columns, in page order.
/// The sequences are not guaranteed to have equal lengths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartColumns {
    pub tempos: Vec<String>,
    pub titles: Vec<String>,
    pub artists: Vec<String>,
    pub dances: Vec<String>,
}

/// Header classification; categories are tested in column order and a cell
/// belongs to at most one.
pub fn classify_header(text: &str) -> Option<ChartColumn> {
    if text.contains("BEATS PERMIN") || (text.contains("BEATS") && text.contains("MIN")) {
        Some(ChartColumn::Tempo)
    } else if text.contains("SONG") && text.contains("TITLE") {
        Some(ChartColumn::Title)
    } else if text.contains("ARTIST") {
        Some(ChartColumn::Artist)
    } else if text.contains("SUGGESTED") && text.contains("DANCE") {
        Some(ChartColumn::Dance)
    } else {
        None
    }
}

/// True for paragraphs that repeat a column header inside the column body
pub fn is_header_label(text: &str) -> bool {
    text == "BEATS PERMIN"
        || (text.contains("SONG") && text.contains("TITLE"))
        || text.contains("ARTIST's")
        || text == "NAME"
        || (text.contains("SUGGESTED") && text.contains("DANCE"))
}

/// Text of every `<p>` below `cell`, skipping blanks and header labels
pub fn extract_column_data(cell: ElementRef<'_>) -> Vec<String> {
    let p_selector = Selector::parse("p").unwrap();
    let mut data = Vec::new();

    for p in cell.select(&p_selector) {
        let text = p
            .text()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if text.is_empty() || is_header_label(&text) {
            continue;
        }
        data.push(text);
    }

    data
}

#[instrument(skip(html), fields(html_len = html.len()))]
pub fn extract_columns(html: &str, table_bgcolor: &str) -> Result<ChartColumns> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table").unwrap();
    let td_selector = Selector::parse("td").unwrap();

    let table = document
        .select(&table_selector)
        .find(|t| {
            t.value()
                .attr("bgcolor")
                .map(|c| c.trim().eq_ignore_ascii_case(table_bgcolor))
                .unwrap_or(false)
        })
        .ok_or_else(|| ChartError::TableNotFound { bgcolor: table_bgcolor.to_string() })?;

    let mut tempo_cell = None;
    let mut title_cell = None;
    let mut artist_cell = None;
    let mut dance_cell = None;
    let mut cell_count = 0usize;

    for (i, td) in table.select(&td_selector).enumerate() {
        cell_count += 1;
        let text = td.text().collect::<String>();
        let Some(column) = classify_header(text.trim()) else {
            continue;
        };
        let slot = match column {
            ChartColumn::Tempo => &mut tempo_cell,
            ChartColumn::Title => &mut title_cell,
            ChartColumn::Artist => &mut artist_cell,
            ChartColumn::Dance => &mut dance_cell,
        };
        if slot.is_none() {
            debug!("Found {} column at td index {}", column, i);
            *slot = Some(td);
        }
    }
    info!("Found {} td elements in chart table", cell_count);

    let columns = ChartColumns {
        tempos: extract_column_data(require(tempo_cell, ChartColumn::Tempo)?),
        titles: extract_column_data(require(title_cell, ChartColumn::Title)?),
        artists: extract_column_data(require(artist_cell, ChartColumn::Artist)?),
        dances: extract_column_data(require(dance_cell, ChartColumn::Dance)?),
    };

    info!(
        "Extracted bpms={} songs={} artists={} dances={}",
        columns.tempos.len(),
        columns.titles.len(),
        columns.artists.len(),
        columns.dances.len()
    );
    Ok(columns)
}

fn require(cell: Option<ElementRef<'_>>, column: ChartColumn) -> Result<ElementRef<'_>> {
    cell.ok_or_else(|| ChartError::ColumnNotFound(column.to_string()))
}
