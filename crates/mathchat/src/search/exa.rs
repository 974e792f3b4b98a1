use anyhow::{anyhow, Result};
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::SearchResult;

pub const EXA_HOST: &str = "https://api.exa.ai";
const DEFAULT_NUM_RESULTS: u32 = 5;

#[derive(Debug, Clone)]
pub struct ExaConfig {
    pub host: String,
    pub api_key: String,
    pub num_results: u32,
}

impl ExaConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("EXA_API_KEY")
            .map_err(|_| anyhow!("EXA_API_KEY must be set to use web search"))?;
        let host = std::env::var("EXA_HOST").unwrap_or_else(|_| EXA_HOST.to_string());
        Ok(Self {
            host,
            api_key,
            num_results: DEFAULT_NUM_RESULTS,
        })
    }
}

pub struct ExaClient {
    client: Client,
    config: ExaConfig,
}

impl ExaClient {
    pub fn new(config: ExaConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client, config })
    }

    /// Run a web search and return results with page text included.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = format!("{}/search", self.config.host.trim_end_matches('/'));
        let payload = json!({
            "query": query,
            "numResults": self.config.num_results,
            "contents": { "text": true }
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body: Value = response.json().await?;
                Ok(parse_results(&body))
            }
            status => Err(anyhow!("Exa search failed: {}", status)),
        }
    }
}

fn parse_results(body: &Value) -> Vec<SearchResult> {
    let Some(results) = body.get("results").and_then(|r| r.as_array()) else {
        return Vec::new();
    };

    results
        .iter()
        .filter_map(|result| {
            let url = result.get("url").and_then(|u| u.as_str())?;
            Some(SearchResult {
                title: result
                    .get("title")
                    .and_then(|t| t.as_str())
                    .unwrap_or("(untitled)")
                    .to_string(),
                url: url.to_string(),
                text: result
                    .get("text")
                    .and_then(|t| t.as_str())
                    .unwrap_or_default()
                    .to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_search_parses_results() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("x-api-key", "test_api_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {
                        "title": "Eigenvalues explained",
                        "url": "https://example.com/eigen",
                        "text": "An eigenvalue is..."
                    },
                    {
                        "url": "https://example.com/untitled"
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = ExaClient::new(ExaConfig {
            host: mock_server.uri(),
            api_key: "test_api_key".to_string(),
            num_results: 2,
        })?;

        let results = client.search("eigenvalues").await?;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Eigenvalues explained");
        assert_eq!(results[1].title, "(untitled)");
        assert_eq!(results[1].text, "");
        Ok(())
    }

    #[tokio::test]
    async fn test_search_error_status() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = ExaClient::new(ExaConfig {
            host: mock_server.uri(),
            api_key: "bad_key".to_string(),
            num_results: 2,
        })?;

        let result = client.search("anything").await;
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_parse_results_missing_field() {
        assert!(parse_results(&json!({})).is_empty());
        assert!(parse_results(&json!({"results": "not an array"})).is_empty());
    }
}
