use crate::error::Result;
use scraper::{Html, Selector};
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

const USER_AGENT: &str = concat!("speed_chart/", env!("CARGO_PKG_VERSION"));

/// Rough shape of a fetched page, logged so a layout change on the site is
/// visible before the extractor runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub html_len: usize,
    pub tables: usize,
    pub pre_blocks: usize,
}

pub fn build_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
    Ok(client)
}

/// GET the page and return its body. Non-2xx responses are errors.
#[instrument(skip(client))]
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;
    info!("Fetched {} characters", body.len());
    Ok(body)
}

pub fn save_page<P: AsRef<Path>>(path: P, html: &str) -> Result<()> {
    fs::write(path.as_ref(), html)?;
    info!("Raw HTML saved to {}", path.as_ref().display());
    Ok(())
}

pub fn summarize_page(html: &str) -> PageSummary {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table").unwrap();
    let pre_selector = Selector::parse("pre").unwrap();

    PageSummary {
        html_len: html.len(),
        tables: document.select(&table_selector).count(),
        pre_blocks: document.select(&pre_selector).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_page_counts_elements() {
        let html = r##"<html><body>
            <table><tr><td>a</td></tr></table>
            <table bgcolor="#0000FF"><tr><td>b</td></tr></table>
            <pre>x</pre>
        </body></html>"##;

        let summary = summarize_page(html);
        assert_eq!(summary.tables, 2);
        assert_eq!(summary.pre_blocks, 1);
        assert_eq!(summary.html_len, html.len());
    }

    #[test]
    fn test_save_page_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw_page.html");
        save_page(&path, "<html></html>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");
    }
}
