use serde::{Deserialize, Serialize};

/// One row of the chart exactly as it was read from the page.
/// Serialized with the field names used by the raw JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "bpm")]
    pub tempo: String,
    #[serde(rename = "song")]
    pub title: String,
    pub artist: String,
    #[serde(rename = "dances")]
    pub dance_text: String,
}

/// A cleaned chart row, ready to be loaded into the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    #[serde(rename = "song_title")]
    pub title: String,
    pub artist: String,
    /// Kept verbatim; may be a single value or a "170-180" range
    #[serde(rename = "bpm")]
    pub tempo: String,
    pub dances: Vec<String>,
}

/// Persisted song row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub tempo: String,
    pub video_url: Option<String>,
}

/// One line of the generated report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub song_id: i64,
    pub tempo: String,
    pub title: String,
    pub artist: String,
    /// Dance names joined with ", "; empty when the song has none
    pub dances: String,
}
