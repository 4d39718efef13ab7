//! Data models for feed entries, articles and the aggregated result set.
//!
//! - [`FeedEntry`]: one item parsed out of a publisher's RSS feed
//! - [`Article`]: an accepted, extracted and cleaned article ready for output
//! - [`ResultSet`]: articles grouped by source id, in registry order

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

/// A single item from a publisher feed.
///
/// Lives only long enough to be filtered and, if accepted, extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    /// Headline as published in the feed.
    pub title: String,
    /// Absolute article URL.
    pub link: String,
    /// Publication date in the publisher's own offset. `None` is treated as today.
    pub published: Option<NaiveDate>,
    /// Image attached to the item (`media:content`, `media:thumbnail` or an image enclosure).
    pub media_url: Option<String>,
}

/// An accepted article as written to the output file.
///
/// `full_text` always holds at least the configured minimum number of
/// characters; `content` is its preview.
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct Article {
    /// Display name of the publisher.
    pub source: String,
    pub title: String,
    pub link: String,
    /// Publication date in `YYYY-MM-DD` form.
    pub date: String,
    /// Image URL, or an empty string when none was found.
    pub image: String,
    /// Preview: the first characters of `full_text` followed by `...`.
    pub content: String,
    /// Cleaned article body.
    pub full_text: String,
}

/// Articles keyed by source id.
///
/// Serializes as a JSON object whose keys keep insertion order, so the output
/// lists publishers in registry order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResultSet {
    entries: Vec<(String, Vec<Article>)>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source's articles. Empty lists are ignored so that only
    /// sources with at least one article show up as keys.
    pub fn insert(&mut self, source_id: impl Into<String>, articles: Vec<Article>) {
        if articles.is_empty() {
            return;
        }
        let source_id = source_id.into();
        match self.entries.iter_mut().find(|(id, _)| *id == source_id) {
            Some((_, existing)) => existing.extend(articles),
            None => self.entries.push((source_id, articles)),
        }
    }

    /// Source ids in insertion order.
    pub fn source_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of articles across all sources.
    pub fn article_count(&self) -> usize {
        self.entries.iter().map(|(_, articles)| articles.len()).sum()
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, articles) in &self.entries {
            map.serialize_entry(id, articles)?;
        }
        map.end()
    }
}
