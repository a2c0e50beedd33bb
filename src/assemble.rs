use crate::extract::ChartColumns;
use crate::types::RawRecord;
use tracing::debug;

/// Zip the four columns index by index. The longest column decides the
/// record count; shorter columns contribute empty strings past their end.
pub fn assemble_records(columns: &ChartColumns) -> Vec<RawRecord> {
    let lengths = [
        columns.tempos.len(),
        columns.titles.len(),
        columns.artists.len(),
        columns.dances.len(),
    ];
    let count = lengths.iter().copied().max().unwrap_or(0);
    if lengths.iter().any(|&len| len != count) {
        debug!(?lengths, "Column lengths differ; padding short columns");
    }

    let cell = |values: &[String], i: usize| values.get(i).cloned().unwrap_or_default();

    (0..count)
        .map(|i| RawRecord {
            tempo: cell(&columns.tempos, i),
            title: cell(&columns.titles, i),
            artist: cell(&columns.artists, i),
            dance_text: cell(&columns.dances, i),
        })
        .collect()
}
