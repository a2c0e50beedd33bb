use crate::constants;
use crate::error::{ChartError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub paths: PathsConfig,
    pub enrich: EnrichConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    /// Value of the `bgcolor` attribute that marks the chart table
    pub table_bgcolor: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub raw_html: PathBuf,
    pub raw_json: PathBuf,
    pub normalized_json: PathBuf,
    pub database: PathBuf,
    pub report: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    pub program: String,
    pub batch_size: usize,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: constants::CHART_URL.to_string(),
            table_bgcolor: constants::CHART_TABLE_BGCOLOR.to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_html: PathBuf::from(constants::RAW_HTML_FILE),
            raw_json: PathBuf::from(constants::RAW_JSON_FILE),
            normalized_json: PathBuf::from(constants::NORMALIZED_JSON_FILE),
            database: PathBuf::from(constants::DATABASE_FILE),
            report: PathBuf::from(constants::REPORT_FILE),
        }
    }
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            program: constants::VIDEO_SEARCH_PROGRAM.to_string(),
            batch_size: constants::ENRICH_BATCH_SIZE,
            max_results: constants::VIDEO_SEARCH_RESULTS,
            timeout_secs: constants::VIDEO_SEARCH_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ChartError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path first, then the default file name if it exists, then
    /// the built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default_path = Path::new(constants::DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Self::load(default_path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.enrich.max_results == 0 {
            return Err(ChartError::Config("enrich.max_results must be at least 1".into()));
        }
        if self.enrich.timeout_secs == 0 {
            return Err(ChartError::Config("enrich.timeout_secs must be at least 1".into()));
        }
        if self.source.table_bgcolor.trim().is_empty() {
            return Err(ChartError::Config("source.table_bgcolor must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = Config::default();
        assert_eq!(config.source.url, constants::CHART_URL);
        assert_eq!(config.paths.database, PathBuf::from("music_speed.db"));
        assert_eq!(config.enrich.batch_size, 50);
        assert_eq!(config.enrich.max_results, 3);
        assert_eq!(config.enrich.timeout_secs, 30);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [paths]
            database = "other.db"

            [enrich]
            batch_size = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.paths.database, PathBuf::from("other.db"));
        assert_eq!(config.paths.report, PathBuf::from("music_chart.html"));
        assert_eq!(config.enrich.batch_size, 5);
        assert_eq!(config.enrich.program, "yt-dlp");
        assert_eq!(config.source.table_bgcolor, "#0000FF");
    }

    #[test]
    fn test_load_rejects_zero_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speed_chart.toml");
        fs::write(&path, "[enrich]\ntimeout_secs = 0\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ChartError::Config(_)));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
