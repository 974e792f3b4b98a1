pub mod arxiv;
pub mod exa;

use serde::{Deserialize, Serialize};

/// Marker that opens every search context block. The search-performed
/// predicate in `providers::unify` keys on this exact substring.
pub const SEARCH_MARKER: &str = "SEARCH RESULTS FOR:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub text: String,
}

/// Render search results into the context block that gets injected into the
/// system prompt.
pub fn format_results(query: &str, results: &[SearchResult]) -> String {
    let mut block = format!("{} {}\n", SEARCH_MARKER, query);
    for (index, result) in results.iter().enumerate() {
        block.push_str(&format!(
            "\n[{}] {}\n{}\n{}\n",
            index + 1,
            result.title,
            result.url,
            result.text
        ));
    }
    block
}
