//! Fetching and reading the website a user submits for analysis.

use async_trait::async_trait;
use blastari_core::CoreError;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Below this many characters of readable text there is nothing to analyze.
pub const MIN_CONTENT_CHARS: usize = 100;
/// Page text beyond this is cut before it goes into a prompt.
pub const MAX_CONTENT_CHARS: usize = 8_000;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; BLASTariBot/0.1; +https://blastari.app/bot)";

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the readable text of the page at `url`.
    async fn fetch_text(&self, url: &str) -> Result<String, CoreError>;
}

/// Canonical form of a user-supplied site address, used as the storage key:
/// `https://` is assumed when no scheme is given and a trailing `/` is
/// dropped.
pub fn canonical_url(input: &str) -> Result<String, CoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid_input("url is required"));
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&with_scheme)
        .map_err(|e| CoreError::invalid_input(format!("invalid url '{trimmed}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(CoreError::invalid_input(format!("invalid url '{trimmed}'")));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(el) = ElementRef::wrap(child) {
            let name = el.value().name();
            if matches!(name, "script" | "style" | "noscript" | "svg" | "template") {
                continue;
            }
            visible_text(el, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        }
    }
}

/// Title, meta description and visible body text, whitespace collapsed and
/// capped at [`MAX_CONTENT_CHARS`].
pub fn extract_page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts: Vec<String> = Vec::new();

    if let Ok(selector) = Selector::parse("title") {
        if let Some(title) = document.select(&selector).next() {
            parts.push(title.text().collect::<String>());
        }
    }
    if let Ok(selector) = Selector::parse(r#"meta[name="description"]"#) {
        if let Some(content) = document
            .select(&selector)
            .next()
            .and_then(|m| m.value().attr("content"))
        {
            parts.push(content.to_string());
        }
    }
    if let Ok(selector) = Selector::parse("body") {
        if let Some(body) = document.select(&selector).next() {
            let mut text = String::new();
            visible_text(body, &mut text);
            parts.push(text);
        }
    }

    let text = collapse_whitespace(&parts.join(" "));
    text.chars().take(MAX_CONTENT_CHARS).collect()
}

pub fn ensure_analyzable(text: &str) -> Result<(), CoreError> {
    let length = text.trim().chars().count();
    if length < MIN_CONTENT_CHARS {
        return Err(CoreError::Unprocessable {
            reason: format!(
                "the page has only {length} characters of readable text (at least {MIN_CONTENT_CHARS} needed)"
            ),
        });
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, CoreError> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, CoreError> {
        info!("Fetching website {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
        ) {
            warn!("Website {} refused the fetch with {}", url, status);
            return Err(CoreError::Unprocessable {
                reason: format!("the site refused access ({})", status.as_u16()),
            });
        }
        if !status.is_success() {
            return Err(CoreError::RequestFailed {
                message: format!("fetching {url} returned {status}"),
                status_code: Some(status.as_u16()),
            });
        }

        let html = response.text().await?;
        let text = extract_page_text(&html);
        debug!("Extracted {} characters from {}", text.len(), url);
        Ok(text)
    }
}
