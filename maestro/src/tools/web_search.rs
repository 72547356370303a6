//! Web search over the DuckDuckGo Lite HTML interface.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::ToolError;
use crate::tool::Tool;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

static RESULT_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"class="result-link"[^>]*href="([^"]+)"[^>]*>([^<]+)</a>"#).expect("valid regex")
});
static RESULT_SNIPPET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"class="result-snippet"[^>]*>([^<]+)"#).expect("valid regex"));

/// Searches the web and returns the top hits as markdown.
#[derive(Debug, Clone)]
pub struct WebSearch {
    client: reqwest::Client,
    max_results: usize,
}

/// Arguments for [`WebSearch`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchArgs {
    /// The search query.
    pub query: String,
}

/// A single search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result title.
    pub title: String,
    /// Result URL.
    pub link: String,
    /// Snippet shown under the result.
    pub snippet: String,
}

impl Default for WebSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl WebSearch {
    /// A search tool returning at most 10 hits.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
            max_results: 10,
        }
    }

    /// Caps the number of hits returned.
    #[must_use]
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    fn search_url(query: &str) -> Result<Url, ToolError> {
        let mut url = Url::parse("https://lite.duckduckgo.com/lite/")
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }

    fn parse_hits(&self, html: &str) -> Vec<SearchHit> {
        let snippets: Vec<_> = RESULT_SNIPPET_RE
            .captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .collect();

        RESULT_LINK_RE
            .captures_iter(html)
            .enumerate()
            .filter_map(|(i, cap)| {
                let link = cap.get(1)?.as_str();
                let title = cap.get(2)?.as_str().trim();
                if link.is_empty() || title.is_empty() {
                    return None;
                }
                Some(SearchHit {
                    title: title.to_string(),
                    link: link.to_string(),
                    snippet: snippets.get(i).cloned().unwrap_or_default(),
                })
            })
            .take(self.max_results)
            .collect()
    }

    fn format_hits(hits: &[SearchHit]) -> String {
        let mut out = String::from("## Search Results\n\n");
        for hit in hits {
            out.push_str(&format!("[{}]({})\n{}\n\n", hit.title, hit.link, hit.snippet));
        }
        out
    }
}

impl Tool for WebSearch {
    type Args = WebSearchArgs;
    type Output = String;
    type Error = ToolError;

    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Performs a web search for a query and returns the top results formatted as markdown."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to perform"
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: WebSearchArgs) -> Result<String, ToolError> {
        let url = Self::search_url(&args.query)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ToolError::Execution(format!("search request failed: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| ToolError::Execution(format!("failed to read search response: {e}")))?;

        let hits = self.parse_hits(&html);
        if hits.is_empty() {
            return Err(ToolError::Execution(
                "No results found! Try a less restrictive/shorter query.".to_string(),
            ));
        }

        Ok(Self::format_hits(&hits))
    }
}
