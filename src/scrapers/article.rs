//! Article page extraction.
//!
//! Pages are parsed with `scraper`, stripped of noise nodes, and then the
//! body is located with the source's selector cascade followed by a generic
//! fallback list. The visible text of the matched region is emitted one
//! line per text node and handed to the [`TextCleaner`].

use crate::cleaner::TextCleaner;
use crate::scrapers::http::{BoxError, fetch_text};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Page furniture removed before the content lookup, wherever it sits.
const STRUCTURAL_NOISE: &[&str] = &[
    "script",
    "style",
    "iframe",
    "noscript",
    "nav",
    "header",
    "footer",
    "audio",
    "figcaption",
];

/// Widgets removed before the content lookup, unless they wrap the content.
///
/// Class names are matched as whole tokens or prefixes, never as substrings,
/// so wrappers like `article-wrap has-audio-player` are left alone.
const WIDGET_NOISE: &[&str] = &[
    // advertisements
    ".ad",
    ".ads",
    ".advertisement",
    ".banner",
    ".ad_banner",
    "[class^='ad-']",
    "[class^='ad_']",
    "[id^='ad-']",
    "[id^='ad_']",
    // text-to-speech and audio players
    ".tts",
    ".tts_player",
    ".tts-player",
    ".btn_tts",
    "#tts",
    "#tts_player",
    ".audio_player",
    ".audio-player",
    // captions and zoom buttons
    ".caption",
    ".img_caption",
    ".photo_caption",
    ".img_desc",
    ".zoom",
    ".btn_zoom",
    ".btn-zoom",
];

/// Tried in order when none of the source's own selectors match.
const FALLBACK_SELECTORS: &[&str] = &[
    "#articleBody",
    "#article-body",
    ".article-body",
    ".article_body",
    "#article_body",
    ".news_body",
    "#newsContent",
    "[itemprop='articleBody']",
    "article",
    "main",
];

static STRUCTURAL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(&STRUCTURAL_NOISE.join(", ")).expect("structural selectors are valid")
});

static WIDGETS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(&WIDGET_NOISE.join(", ")).expect("widget selectors are valid")
});

static OG_IMAGE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="og:image"]"#).expect("og:image selector is valid")
});

/// Body text and page metadata pulled from an article page.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedArticle {
    /// Cleaned body text; paragraphs separated by a blank line.
    pub text: String,
    /// `og:image` of the page, if declared.
    pub og_image: Option<String>,
}

/// Fetch an article and extract its cleaned body.
///
/// Returns `None` on any fetch failure or when no content region matches.
#[instrument(level = "info", skip(client, cascade, cleaner, timeout))]
pub async fn extract_article(
    client: &reqwest::Client,
    url: &str,
    cascade: &[String],
    cleaner: &TextCleaner,
    timeout: Duration,
) -> Option<ExtractedArticle> {
    match try_extract_article(client, url, cascade, cleaner, timeout).await {
        Ok(Some(article)) => {
            info!(chars = article.text.chars().count(), "Extracted article");
            Some(article)
        }
        Ok(None) => {
            warn!(%url, "Article produced no content");
            None
        }
        Err(e) => {
            error!(error = %e, %url, "Article fetch failed");
            None
        }
    }
}

async fn try_extract_article(
    client: &reqwest::Client,
    url: &str,
    cascade: &[String],
    cleaner: &TextCleaner,
    timeout: Duration,
) -> Result<Option<ExtractedArticle>, BoxError> {
    let html = fetch_text(client, url, timeout).await?;
    Ok(extract_from_html(&html, cascade, cleaner))
}

/// Extract cleaned body text from an HTML document.
pub fn extract_from_html(
    html: &str,
    cascade: &[String],
    cleaner: &TextCleaner,
) -> Option<ExtractedArticle> {
    let mut document = Html::parse_document(html);
    let og_image = og_image(&document);
    let content = content_selectors(cascade);
    strip_noise(&mut document, &content);

    let region = find_content(&document, &content)?;
    let raw = visible_text(region);
    Some(ExtractedArticle {
        text: cleaner.clean(&raw),
        og_image,
    })
}

/// The source's cascade followed by the generic fallback list, parsed.
/// Invalid entries are logged and dropped.
fn content_selectors(cascade: &[String]) -> Vec<(&str, Selector)> {
    let configured = cascade.iter().map(String::as_str);
    let fallback = FALLBACK_SELECTORS.iter().copied();

    configured
        .chain(fallback)
        .filter_map(|raw| match Selector::parse(raw) {
            Ok(selector) => Some((raw, selector)),
            Err(e) => {
                warn!(selector = raw, error = %e, "Skipping invalid selector");
                None
            }
        })
        .collect()
}

/// Detach noise nodes from the tree.
///
/// Structural nodes always go. A widget match is kept when it is the page
/// frame (`html`/`body`) or wraps something a content selector matches.
/// Detached nodes stay in the arena, so later lookups must start from the
/// root element rather than `Html::select`.
fn strip_noise(document: &mut Html, content: &[(&str, Selector)]) {
    let root = document.root_element();
    let structural = root.select(&STRUCTURAL).map(|el| el.id());
    let widgets = root
        .select(&WIDGETS)
        .filter(|el| !is_page_frame(el) && !wraps_content(el, content))
        .map(|el| el.id());
    let ids: Vec<_> = structural.chain(widgets).collect();

    debug!(count = ids.len(), "Removing noise nodes");
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn is_page_frame(el: &ElementRef<'_>) -> bool {
    matches!(el.value().name(), "html" | "body")
}

fn wraps_content(el: &ElementRef<'_>, content: &[(&str, Selector)]) -> bool {
    content
        .iter()
        .any(|(_, selector)| selector.matches(el) || el.select(selector).next().is_some())
}

/// First match of the first selector that matches anything.
fn find_content<'a>(document: &'a Html, content: &[(&str, Selector)]) -> Option<ElementRef<'a>> {
    content.iter().find_map(|(raw, selector)| {
        let found = document.root_element().select(selector).next();
        if found.is_some() {
            debug!(selector = raw, "Content selector matched");
        }
        found
    })
}

/// Text of `region`, one line per non-blank text node.
fn visible_text(region: ElementRef<'_>) -> String {
    region
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .join("\n")
}

fn og_image(document: &Html) -> Option<String> {
    document
        .select(&OG_IMAGE)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}
