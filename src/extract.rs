use std::collections::HashSet;
use std::time::Duration;

use scraper::{Html, Selector};
use url::Url;

// ── Constants ────────────────────────────────────────────────────────────────

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("{0}")]
    InvalidUrl(String),
    #[error("{0}")]
    Request(String),
}

// ── HTTP client ──────────────────────────────────────────────────────────────

/// Client shared by page and image fetches. Every call is bounded by
/// [`HTTP_TIMEOUT`]; nothing is retried.
pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::ClientBuilder::new()
        .timeout(HTTP_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .user_agent(USER_AGENT)
        .build()
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Fetch an article page and list its candidate image URLs in source order.
pub async fn fetch_image_candidates(
    client: &reqwest::Client,
    article_url: &str,
) -> Result<Vec<String>, ExtractionError> {
    let base = parse_article_url(article_url)?;
    let html = fetch_html(client, &base).await?;
    Ok(extract_image_urls(&html, &base))
}

// ── URL validation ───────────────────────────────────────────────────────────

fn parse_article_url(url: &str) -> Result<Url, ExtractionError> {
    let parsed = Url::parse(url.trim())
        .map_err(|_| ExtractionError::InvalidUrl(format!("Invalid article URL: {}", url)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(ExtractionError::InvalidUrl(format!(
            "Only http(s) article URLs are allowed: {}",
            url
        ))),
    }
}

// ── HTTP fetch ───────────────────────────────────────────────────────────────

pub async fn fetch_html(client: &reqwest::Client, url: &Url) -> Result<String, ExtractionError> {
    let response = client.get(url.as_str()).send().await.map_err(|e| {
        if e.is_timeout() {
            ExtractionError::Request(format!("TimeoutError: {}", e))
        } else if e.is_connect() {
            ExtractionError::Request(format!("ConnectError: {}", e))
        } else {
            ExtractionError::Request(format!("RequestError: {}", e))
        }
    })?;

    // Error pages are still parsed; they simply tend to yield no usable images.
    if !response.status().is_success() {
        tracing::warn!(url = %url, status = %response.status(), "article page returned non-success status");
    }

    response
        .text()
        .await
        .map_err(|e| ExtractionError::Request(e.to_string()))
}

// ── Candidate extraction ─────────────────────────────────────────────────────

/// Candidate image URLs, absolute and de-duplicated, in extraction order:
/// the `og:image` meta tag, then the first image of every `<figure>`, then
/// every `<img>` (`src`, falling back to `data-src`).
pub fn extract_image_urls(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut candidates = Candidates::default();

    if let Some(og) = extract_og_image(&document) {
        candidates.push(base_url, &og);
    }

    let figure_sel = Selector::parse("figure").unwrap();
    let img_sel = Selector::parse("img").unwrap();

    for figure in document.select(&figure_sel) {
        if let Some(src) = figure
            .select(&img_sel)
            .next()
            .and_then(|img| non_empty_attr(img.value().attr("src")))
        {
            candidates.push(base_url, src);
        }
    }

    for img in document.select(&img_sel) {
        let v = img.value();
        if let Some(src) = non_empty_attr(v.attr("src")).or_else(|| non_empty_attr(v.attr("data-src"))) {
            candidates.push(base_url, src);
        }
    }

    candidates.urls
}

fn extract_og_image(document: &Html) -> Option<String> {
    let sel = Selector::parse(r#"meta[property="og:image"]"#).unwrap();
    document
        .select(&sel)
        .next()
        .and_then(|el| non_empty_attr(el.value().attr("content")))
        .map(|s| s.to_string())
}

fn non_empty_attr(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Insertion-ordered set of resolved URLs; the first occurrence wins.
#[derive(Default)]
struct Candidates {
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl Candidates {
    fn push(&mut self, base_url: &Url, raw: &str) {
        let Ok(resolved) = base_url.join(raw) else {
            tracing::debug!(raw, "dropping unresolvable image URL");
            return;
        };
        let resolved = resolved.to_string();
        if self.seen.insert(resolved.clone()) {
            self.urls.push(resolved);
        }
    }
}
