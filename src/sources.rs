//! Publisher registry.
//!
//! Each publisher is described by a [`SourceConfig`]: where its RSS feed
//! lives and which CSS selectors locate the article body on its pages.
//!
//! # Built-in Sources
//!
//! | Id | Publisher | Feed |
//! |----|-----------|------|
//! | `chosun` | 조선일보 | culture/life section RSS |
//! | `hani` | 한겨레 | culture RSS |
//! | `donga` | 동아일보 | book RSS |
//! | `khan` | 경향신문 | culture RSS |
//! | `yna` | 연합뉴스 | culture RSS |
//!
//! The list can be replaced wholesale from the YAML config file.

use serde::Deserialize;

/// One publisher definition. Never mutated after start-up.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    /// Unique key used in the output file.
    pub id: String,
    /// Human-readable publisher name, copied into every article.
    pub display_name: String,
    pub feed_url: String,
    /// Selectors tried in order; the first one that matches anything wins.
    /// A single entry may hold comma-separated alternatives.
    pub selector_cascade: Vec<String>,
}

impl SourceConfig {
    pub fn new(id: &str, display_name: &str, feed_url: &str, selector_cascade: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            feed_url: feed_url.to_string(),
            selector_cascade: selector_cascade.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The built-in publisher list, in crawl order.
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new(
            "chosun",
            "조선일보",
            "https://www.chosun.com/arc/outboundfeeds/rss/category/culture-life/?outputType=xml",
            &["section.article-body", ".article-body", "article#article-view-content-div"],
        ),
        SourceConfig::new(
            "hani",
            "한겨레",
            "https://www.hani.co.kr/rss/culture/",
            &[".article-text", "div.text", ".article-contents"],
        ),
        SourceConfig::new(
            "donga",
            "동아일보",
            "https://rss.donga.com/book.xml",
            &["section.news_view", ".news_view", "#article_txt"],
        ),
        SourceConfig::new(
            "khan",
            "경향신문",
            "https://www.khan.co.kr/rss/rssdata/culture_news.xml",
            &["#articleBody", ".art_body", "div.article_txt"],
        ),
        SourceConfig::new(
            "yna",
            "연합뉴스",
            "https://www.yna.co.kr/rss/culture.xml",
            &["article.story-news", ".story-news.article", "#articleWrap .article"],
        ),
    ]
}

/// Check that source ids are unique and every source has a feed URL.
///
/// Returns a description of the first problem found.
pub fn validate_sources(sources: &[SourceConfig]) -> Result<(), String> {
    let mut seen = std::collections::HashSet::new();
    for source in sources {
        if source.id.trim().is_empty() {
            return Err(format!("source with feed {} has an empty id", source.feed_url));
        }
        if !seen.insert(source.id.as_str()) {
            return Err(format!("duplicate source id: {}", source.id));
        }
        if url::Url::parse(&source.feed_url).is_err() {
            return Err(format!("source {} has an invalid feed url: {}", source.id, source.feed_url));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn test_default_sources_are_valid() {
        let sources = default_sources();
        assert!(!sources.is_empty());
        assert_eq!(validate_sources(&sources), Ok(()));
    }

    #[test]
    fn test_default_selectors_parse() {
        for source in default_sources() {
            assert!(!source.selector_cascade.is_empty(), "{} has no selectors", source.id);
            for selector in &source.selector_cascade {
                assert!(
                    Selector::parse(selector).is_ok(),
                    "{}: bad selector {selector}",
                    source.id
                );
            }
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let sources = vec![
            SourceConfig::new("a", "A", "https://a.example/rss", &["article"]),
            SourceConfig::new("a", "A2", "https://b.example/rss", &["article"]),
        ];
        assert!(validate_sources(&sources).unwrap_err().contains("duplicate"));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let sources = vec![SourceConfig::new("a", "A", "not a url", &["article"])];
        assert!(validate_sources(&sources).is_err());
    }

    #[test]
    fn test_source_config_from_yaml() {
        let yaml = r#"
id: test
display_name: 테스트
feed_url: https://example.com/rss
selector_cascade:
  - ".body"
  - "article, main"
"#;
        let source: SourceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(source.id, "test");
        assert_eq!(source.selector_cascade, vec![".body", "article, main"]);
    }
}
