use async_trait::async_trait;
use speed_chart::enrich::{
    enrich_songs, LookupOutcome, SkipReason, VideoCandidate, VideoSearch, YtDlpSearch,
};
use speed_chart::storage::ChartStore;
use speed_chart::types::NormalizedRecord;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::tempdir;

fn store_with(titles: &[&str]) -> ChartStore {
    let mut store = ChartStore::open_in_memory().unwrap();
    store.create_schema().unwrap();
    let records: Vec<NormalizedRecord> = titles
        .iter()
        .map(|title| NormalizedRecord {
            title: title.to_string(),
            artist: "Glenn Miller".to_string(),
            tempo: "180".to_string(),
            dances: vec!["Swing".to_string()],
        })
        .collect();
    store.load_records(&records).unwrap();
    store
}

/// Finds a video only for queries mentioning "Mood" and records every query
struct ScriptedSearch {
    queries: Mutex<Vec<String>>,
}

impl ScriptedSearch {
    fn new() -> Self {
        Self { queries: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl VideoSearch for ScriptedSearch {
    async fn lookup(&self, query: &str) -> LookupOutcome {
        self.queries.lock().unwrap().push(query.to_string());
        if query.contains("Mood") {
            LookupOutcome::Found(VideoCandidate {
                url: "https://www.youtube.com/watch?v=mood".to_string(),
                views: 1_000,
            })
        } else {
            LookupOutcome::Skipped(SkipReason::NoResults)
        }
    }
}

#[tokio::test]
async fn test_failing_search_tool_leaves_songs_unlinked() {
    let store = store_with(&["In the Mood", "Moonlight Serenade"]);
    let search = YtDlpSearch::new("false", 3, Duration::from_secs(30));

    let summary = enrich_songs(&store, &search, 50).await.unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.linked, 0);
    assert_eq!(summary.skipped.len(), 2);
    for (_, reason) in &summary.skipped {
        assert_eq!(*reason, SkipReason::ExitStatus(Some(1)));
    }
    assert_eq!(store.songs_missing_video(50).unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_search_tool_is_skipped() {
    let store = store_with(&["In the Mood"]);
    let search = YtDlpSearch::new("speed-chart-no-such-program", 3, Duration::from_secs(30));

    let summary = enrich_songs(&store, &search, 50).await.unwrap();

    assert_eq!(summary.linked, 0);
    assert!(matches!(summary.skipped[0].1, SkipReason::Spawn(_)));
}

#[tokio::test]
async fn test_slow_search_tool_times_out_and_batch_continues() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("slow-search");
    fs::write(&script, "#!/bin/sh\nsleep 10\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let store = store_with(&["In the Mood", "Moonlight Serenade"]);
    let search = YtDlpSearch::new(script.to_string_lossy(), 3, Duration::from_secs(1));

    let summary = enrich_songs(&store, &search, 50).await.unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.linked, 0);
    assert_eq!(summary.skipped.len(), 2);
    for (_, reason) in &summary.skipped {
        assert!(matches!(reason, SkipReason::Timeout(_)));
    }
    assert_eq!(store.songs_missing_video(50).unwrap().len(), 2);
}

#[tokio::test]
async fn test_non_json_output_counts_as_no_results() {
    // echo prints its arguments, which are not JSON
    let store = store_with(&["In the Mood"]);
    let search = YtDlpSearch::new("echo", 3, Duration::from_secs(30));

    let summary = enrich_songs(&store, &search, 50).await.unwrap();

    assert_eq!(summary.skipped, vec![(1, SkipReason::NoResults)]);
}

#[tokio::test]
async fn test_found_links_are_saved_and_failures_continue() {
    let store = store_with(&["Moonlight Serenade", "In the Mood", "Pennsylvania 6-5000"]);
    let search = ScriptedSearch::new();

    let summary = enrich_songs(&store, &search, 50).await.unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.linked, 1);
    assert_eq!(summary.skipped.len(), 2);
    assert_eq!(
        search.queries.lock().unwrap().clone(),
        vec![
            "Moonlight Serenade Glenn Miller",
            "In the Mood Glenn Miller",
            "Pennsylvania 6-5000 Glenn Miller",
        ]
    );

    let mood = store.song(2).unwrap().unwrap();
    assert_eq!(mood.video_url.as_deref(), Some("https://www.youtube.com/watch?v=mood"));

    let remaining: Vec<i64> = store.songs_missing_video(50).unwrap().iter().map(|s| s.id).collect();
    assert_eq!(remaining, vec![1, 3]);
}

#[tokio::test]
async fn test_batch_size_bounds_the_run() {
    let store = store_with(&["a", "b", "c", "d"]);
    let search = ScriptedSearch::new();

    let summary = enrich_songs(&store, &search, 2).await.unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(search.queries.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_nothing_to_enrich() {
    let store = store_with(&[]);
    let search = ScriptedSearch::new();

    let summary = enrich_songs(&store, &search, 50).await.unwrap();

    assert_eq!(summary.processed, 0);
    assert!(search.queries.lock().unwrap().is_empty());
}
