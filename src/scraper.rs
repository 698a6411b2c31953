use reqwest::{Client, ClientBuilder, Url};
use scraper::{Html, Node, Selector};
use std::time::Duration;
use once_cell::sync::Lazy;
use crate::error::{AppError, Result};

// Create a static client to reuse connections
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build HTTP client")
});

// Create static selectors to avoid recompiling them each time
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("body").expect("Failed to parse body selector")
});

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("title").expect("Failed to parse title selector")
});

const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

pub async fn fetch_html(url: &Url) -> Result<String> {
    let response = CLIENT.get(url.clone()).send().await?.error_for_status()?;
    let html = response.text().await?;
    Ok(html)
}

/// Fetches a product page and returns its readable text, title first.
pub async fn fetch_page_text(url: &Url) -> Result<String> {
    let html = fetch_html(url).await?;
    extract_text(&html)
        .ok_or_else(|| AppError::FetchFailed(format!("No <body> tag found at {}", url)))
}

/// Title and visible body text of an HTML document, one text run per line.
pub fn extract_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let body = document.select(&BODY_SELECTOR).next()?;

    let mut raw = String::with_capacity(html.len() / 2);
    if let Some(title) = document.select(&TITLE_SELECTOR).next() {
        raw.extend(title.text());
        raw.push('\n');
    }

    for node in body.descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
            });
            if !hidden {
                raw.push_str(text);
                raw.push('\n');
            }
        }
    }

    Some(format_text(&raw))
}

pub fn format_text(text: &str) -> String {
    // Collapse whitespace runs inside lines and drop blank lines
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let mut words = line.split_whitespace().peekable();
        if words.peek().is_none() {
            continue;
        }
        if !result.is_empty() {
            result.push('\n');
        }
        for (i, word) in words.enumerate() {
            if i > 0 {
                result.push(' ');
            }
            result.push_str(word);
        }
    }

    result
}
