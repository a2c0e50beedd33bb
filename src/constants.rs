/// Default values for every tunable in the pipeline.
/// These reproduce the behaviour of a run with no configuration file.

// Source page
pub const CHART_URL: &str = "https://ssqq.com/stories/speedcha.htm";
pub const CHART_TABLE_BGCOLOR: &str = "#0000FF";

// Files written and read by the pipeline stages
pub const RAW_HTML_FILE: &str = "raw_page.html";
pub const RAW_JSON_FILE: &str = "music_data_raw.json";
pub const NORMALIZED_JSON_FILE: &str = "music_data_normalized.json";
pub const DATABASE_FILE: &str = "music_speed.db";
pub const REPORT_FILE: &str = "music_chart.html";

// Video lookup
pub const VIDEO_SEARCH_PROGRAM: &str = "yt-dlp";
pub const ENRICH_BATCH_SIZE: usize = 50;
pub const VIDEO_SEARCH_RESULTS: usize = 3;
pub const VIDEO_SEARCH_TIMEOUT_SECS: u64 = 30;

/// Configuration file picked up from the working directory when no
/// `--config` flag is given
pub const DEFAULT_CONFIG_FILE: &str = "speed_chart.toml";
