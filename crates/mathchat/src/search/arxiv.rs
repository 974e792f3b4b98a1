use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use reqwest::StatusCode;
use std::time::Duration;

use super::SearchResult;

pub const ARXIV_HOST: &str = "http://export.arxiv.org";
const DEFAULT_MAX_RESULTS: u32 = 5;

lazy_static! {
    static ref ENTRY: Regex = Regex::new(r"(?s)<entry>(.*?)</entry>").unwrap();
    static ref TITLE: Regex = Regex::new(r"(?s)<title>(.*?)</title>").unwrap();
    static ref SUMMARY: Regex = Regex::new(r"(?s)<summary>(.*?)</summary>").unwrap();
    static ref ID: Regex = Regex::new(r"<id>([^<]*)</id>").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

#[derive(Debug, Clone)]
pub struct ArxivConfig {
    pub host: String,
    pub max_results: u32,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            host: ARXIV_HOST.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

pub struct ArxivClient {
    client: Client,
    config: ArxivConfig,
}

impl ArxivClient {
    pub fn new(config: ArxivConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client, config })
    }

    /// Query the arXiv Atom API and return paper titles, links and abstracts.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = format!(
            "{}/api/query?search_query=all:{}&start=0&max_results={}",
            self.config.host.trim_end_matches('/'),
            urlencoding::encode(query),
            self.config.max_results
        );

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                Ok(parse_feed(&body))
            }
            status => Err(anyhow!("arXiv query failed: {}", status)),
        }
    }
}

/// Pull title/summary/id out of each Atom entry. A few targeted regexes are
/// enough for the fixed fields we consume; entries missing an id are skipped.
fn parse_feed(xml: &str) -> Vec<SearchResult> {
    ENTRY
        .captures_iter(xml)
        .filter_map(|entry| {
            let body = entry.get(1)?.as_str();
            let url = ID.captures(body)?.get(1)?.as_str().trim().to_string();
            let title = TITLE
                .captures(body)
                .and_then(|c| c.get(1))
                .map(|m| collapse(m.as_str()))
                .unwrap_or_else(|| "(untitled)".to_string());
            let text = SUMMARY
                .captures(body)
                .and_then(|c| c.get(1))
                .map(|m| collapse(m.as_str()))
                .unwrap_or_default();
            Some(SearchResult { title, url, text })
        })
        .collect()
}

fn collapse(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}
