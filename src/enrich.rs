//! Video link enrichment.
//!
//! Songs without a link are looked up one at a time through an external
//! search tool. A failed lookup only skips that song.

use crate::config::EnrichConfig;
use crate::error::Result;
use crate::storage::ChartStore;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCandidate {
    pub url: String,
    pub views: u64,
}

/// Why a song was left without a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The search tool could not be started
    Spawn(String),
    /// The search tool ran past its time limit and was killed
    Timeout(Duration),
    /// Non-zero exit; `None` when killed by a signal
    ExitStatus(Option<i32>),
    NoResults,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Spawn(e) => write!(f, "search tool failed to start: {}", e),
            SkipReason::Timeout(d) => write!(f, "search timed out after {}s", d.as_secs()),
            SkipReason::ExitStatus(Some(code)) => write!(f, "search tool exited with code {}", code),
            SkipReason::ExitStatus(None) => write!(f, "search tool terminated by signal"),
            SkipReason::NoResults => write!(f, "no usable search results"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(VideoCandidate),
    Skipped(SkipReason),
}

#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Look up the best video for a free-text query
    async fn lookup(&self, query: &str) -> LookupOutcome;
}

/// One line of `yt-dlp --dump-json` output; everything else is ignored
#[derive(Debug, Deserialize)]
struct YtDlpEntry {
    webpage_url: Option<String>,
    view_count: Option<u64>,
}

/// Candidates from line-delimited JSON. Lines that fail to parse and
/// entries without a URL are dropped; a missing view count counts as zero.
pub fn parse_search_output(stdout: &str) -> Vec<VideoCandidate> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<YtDlpEntry>(line) {
            Ok(entry) => entry.webpage_url.map(|url| VideoCandidate {
                url,
                views: entry.view_count.unwrap_or(0),
            }),
            Err(e) => {
                debug!("Ignoring unparseable search output line: {}", e);
                None
            }
        })
        .collect()
}

/// Highest view count wins; the earlier candidate wins a tie
pub fn most_viewed(candidates: Vec<VideoCandidate>) -> Option<VideoCandidate> {
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(b) if b.views >= candidate.views => Some(b),
        _ => Some(candidate),
    })
}

pub struct YtDlpSearch {
    program: String,
    max_results: usize,
    timeout: Duration,
}

impl YtDlpSearch {
    pub fn new(program: impl Into<String>, max_results: usize, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            max_results,
            timeout,
        }
    }

    pub fn from_config(config: &EnrichConfig) -> Self {
        Self::new(
            config.program.clone(),
            config.max_results,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn args(&self, query: &str) -> Vec<String> {
        vec![
            "--dump-json".to_string(),
            "--playlist-end".to_string(),
            self.max_results.to_string(),
            format!("ytsearch{}:{}", self.max_results, query),
        ]
    }
}

#[async_trait]
impl VideoSearch for YtDlpSearch {
    async fn lookup(&self, query: &str) -> LookupOutcome {
        let child = Command::new(&self.program)
            .args(self.args(query))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Err(_) => return LookupOutcome::Skipped(SkipReason::Timeout(self.timeout)),
            Ok(Err(e)) => return LookupOutcome::Skipped(SkipReason::Spawn(e.to_string())),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            return LookupOutcome::Skipped(SkipReason::ExitStatus(output.status.code()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match most_viewed(parse_search_output(&stdout)) {
            Some(best) => LookupOutcome::Found(best),
            None => LookupOutcome::Skipped(SkipReason::NoResults),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    pub processed: usize,
    pub linked: usize,
    pub skipped: Vec<(i64, SkipReason)>,
}

/// Look up a link for up to `batch_size` songs that lack one. Each link is
/// written as soon as it is found, so an interrupted run keeps its progress.
#[instrument(skip(store, search))]
pub async fn enrich_songs(
    store: &ChartStore,
    search: &dyn VideoSearch,
    batch_size: usize,
) -> Result<EnrichSummary> {
    let songs = store.songs_missing_video(batch_size)?;
    let mut summary = EnrichSummary::default();

    if songs.is_empty() {
        info!("All songs have video links");
        return Ok(summary);
    }
    info!("Processing {} songs", songs.len());

    for song in songs {
        summary.processed += 1;
        let query = format!("{} {}", song.title, song.artist);

        match search.lookup(&query).await {
            LookupOutcome::Found(video) => {
                store.set_video_url(song.id, &video.url)?;
                info!(song_id = song.id, views = video.views, "{} by {}: {}", song.title, song.artist, video.url);
                summary.linked += 1;
            }
            LookupOutcome::Skipped(reason) => {
                warn!(song_id = song.id, "{} by {}: skipped ({})", song.title, song.artist, reason);
                summary.skipped.push((song.id, reason));
            }
        }
    }

    info!("Added {} video links", summary.linked);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_output_defaults_missing_views_to_zero() {
        let stdout = concat!(
            r#"{"webpage_url": "https://www.youtube.com/watch?v=a", "view_count": 10}"#,
            "\n",
            r#"{"webpage_url": "https://www.youtube.com/watch?v=b", "view_count": null}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"webpage_url": "https://www.youtube.com/watch?v=c"}"#,
            "\n",
            r#"{"view_count": 99999}"#,
            "\n",
        );

        let candidates = parse_search_output(stdout);
        assert_eq!(
            candidates,
            vec![
                VideoCandidate { url: "https://www.youtube.com/watch?v=a".into(), views: 10 },
                VideoCandidate { url: "https://www.youtube.com/watch?v=b".into(), views: 0 },
                VideoCandidate { url: "https://www.youtube.com/watch?v=c".into(), views: 0 },
            ]
        );
    }

    #[test]
    fn test_entry_without_url_never_wins() {
        let stdout = concat!(
            r#"{"webpage_url": "https://www.youtube.com/watch?v=a", "view_count": 10}"#,
            "\n",
            r#"{"title": "no link", "view_count": 5000000}"#,
            "\n",
        );

        let pick = most_viewed(parse_search_output(stdout));
        assert_eq!(pick.map(|c| c.url), Some("https://www.youtube.com/watch?v=a".to_string()));
    }

    #[test]
    fn test_most_viewed_prefers_first_on_tie() {
        let pick = most_viewed(vec![
            VideoCandidate { url: "a".into(), views: 5 },
            VideoCandidate { url: "b".into(), views: 50 },
            VideoCandidate { url: "c".into(), views: 50 },
        ]);
        assert_eq!(pick.map(|c| c.url), Some("b".to_string()));
        assert_eq!(most_viewed(Vec::new()), None);
    }

    #[test]
    fn test_search_arguments() {
        let search = YtDlpSearch::new("yt-dlp", 3, Duration::from_secs(30));
        assert_eq!(
            search.args("In the Mood Glenn Miller"),
            vec!["--dump-json", "--playlist-end", "3", "ytsearch3:In the Mood Glenn Miller"]
        );
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::ExitStatus(Some(1)).to_string(), "search tool exited with code 1");
        assert_eq!(SkipReason::Timeout(Duration::from_secs(30)).to_string(), "search timed out after 30s");
    }
}
