//! Fetches a webpage and renders it as readable markdown.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::ToolError;
use crate::tool::Tool;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

// Markdown rewrites applied before the generic tag strip.
static MARKDOWN_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"<h1[^>]*>([^<]*)</h1>").expect("valid regex"), "\n# $1\n"),
        (Regex::new(r"<h2[^>]*>([^<]*)</h2>").expect("valid regex"), "\n## $1\n"),
        (Regex::new(r"<h3[^>]*>([^<]*)</h3>").expect("valid regex"), "\n### $1\n"),
        (Regex::new(r"<h4[^>]*>([^<]*)</h4>").expect("valid regex"), "\n#### $1\n"),
        (Regex::new(r"<p[^>]*>").expect("valid regex"), "\n"),
        (Regex::new(r"<br\s*/?>").expect("valid regex"), "\n"),
        (Regex::new(r"<li[^>]*>").expect("valid regex"), "\n- "),
        (
            Regex::new(r#"<a[^>]*href=["']([^"']*)["'][^>]*>([^<]*)</a>"#).expect("valid regex"),
            "[$2]($1)",
        ),
        (Regex::new(r"<(?:strong|b)[^>]*>([^<]*)</(?:strong|b)>").expect("valid regex"), "**$1**"),
        (Regex::new(r"<(?:em|i)[^>]*>([^<]*)</(?:em|i)>").expect("valid regex"), "*$1*"),
        (Regex::new(r"<code[^>]*>([^<]*)</code>").expect("valid regex"), "`$1`"),
    ]
});

/// Fetches an HTTP(S) URL and returns its content as markdown.
#[derive(Debug, Clone)]
pub struct VisitWebpage {
    client: reqwest::Client,
    max_output_len: usize,
}

/// Arguments for [`VisitWebpage`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitWebpageArgs {
    /// The URL to visit.
    pub url: String,
}

impl Default for VisitWebpage {
    fn default() -> Self {
        Self::new()
    }
}

impl VisitWebpage {
    /// A webpage tool with a 20 second timeout and 40k character output cap.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(20))
    }

    /// A webpage tool with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
            max_output_len: 40_000,
        }
    }

    /// Caps the returned markdown length.
    #[must_use]
    pub fn with_max_output_len(mut self, max: usize) -> Self {
        self.max_output_len = max;
        self
    }

    fn validate_url(raw: &str) -> Result<Url, ToolError> {
        let url = Url::parse(raw)
            .map_err(|e| ToolError::InvalidArguments(format!("invalid URL {raw:?}: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ToolError::InvalidArguments(format!(
                "unsupported URL scheme {other:?}, only http and https are allowed"
            ))),
        }
    }

    fn html_to_markdown(html: &str) -> String {
        let text = SCRIPT_RE.replace_all(html, "");
        let text = STYLE_RE.replace_all(&text, "");
        let mut text = text.into_owned();

        for (re, replacement) in MARKDOWN_RULES.iter() {
            text = re.replace_all(&text, *replacement).into_owned();
        }

        text = text.replace("</p>", "\n").replace("</li>", "");
        text = TAG_RE.replace_all(&text, "").into_owned();

        text = text
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&nbsp;", " ")
            .replace("&#39;", "'");

        BLANK_LINES_RE.replace_all(&text, "\n\n").trim().to_string()
    }

    fn truncate(&self, content: &str) -> String {
        if content.len() <= self.max_output_len {
            return content.to_string();
        }
        // Back off to a char boundary so the slice cannot panic.
        let mut cut = self.max_output_len;
        while !content.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}...\n\n_Content truncated to {} characters_",
            &content[..cut],
            self.max_output_len
        )
    }
}

impl Tool for VisitWebpage {
    type Args = VisitWebpageArgs;
    type Output = String;
    type Error = ToolError;

    fn name(&self) -> &str {
        "visit_webpage"
    }

    fn description(&self) -> &str {
        "Visits a webpage at the given URL and reads its content as a markdown string. Use this to browse webpages."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "format": "uri",
                    "description": "The URL of the webpage to visit (must be a valid HTTP/HTTPS URL)"
                }
            },
            "required": ["url"]
        })
    }

    async fn call(&self, args: VisitWebpageArgs) -> Result<String, ToolError> {
        let url = Self::validate_url(&args.url)?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ToolError::Execution("request timed out, try again later".to_string())
            } else {
                ToolError::Execution(format!("error fetching webpage: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Execution(format!("HTTP error: {status}")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| ToolError::Execution(format!("failed to read response body: {e}")))?;

        Ok(self.truncate(&Self::html_to_markdown(&html)))
    }
}
