//! Title and recency filter for feed entries.
//!
//! An entry is accepted when it is recent enough and its title looks like a
//! book or literature story. The title check runs in two stages and the
//! order matters: exclusion keywords are checked first and always win, then
//! at least one inclusion keyword must be present.
//!
//! Matching is plain substring search on the raw title. Korean has no case,
//! and tokenizing would miss compounds such as `장편소설`.

use crate::models::FeedEntry;
use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Keyword lists driving the title check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    /// A title must contain at least one of these.
    pub include: Vec<String>,
    /// A title containing any of these is rejected outright.
    pub exclude: Vec<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        let include = [
            "소설", "신간", "도서", "책을", "책이", "책은", "책 ", "문학", "작가", "시집",
            "시인", "에세이", "산문", "출간", "출판", "서평", "저자", "독서", "서점",
            "베스트셀러", "북클럽", "그림책", "동화", "평론", "번역가",
        ];
        let exclude = [
            "영화", "드라마", "예능", "연예", "아이돌", "날씨", "부고", "별세", "운세",
            "게임", "웹툰", "공연", "뮤지컬", "콘서트", "전시회",
        ];
        Self {
            include: include.iter().map(|s| s.to_string()).collect(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Outcome of evaluating one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    /// Published before the start of the recency window.
    TooOld,
    /// Title contains the given exclusion keyword.
    Excluded(String),
    /// Title contains none of the inclusion keywords.
    NoTopicMatch,
}

/// Decides whether a feed entry is worth extracting.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    rules: FilterRules,
    recency_days: i64,
}

impl RelevanceFilter {
    pub fn new(rules: FilterRules, recency_days: i64) -> Self {
        Self {
            rules,
            recency_days,
        }
    }

    /// First day of the window ending at `today`, inclusive.
    pub fn window_start(&self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(self.recency_days)
    }

    /// Evaluate an entry against the window ending at `today`.
    ///
    /// Entries without a publish date count as published today.
    #[instrument(level = "debug", skip_all, fields(title = %entry.title))]
    pub fn evaluate(&self, entry: &FeedEntry, today: NaiveDate) -> Verdict {
        let published = entry.published.unwrap_or(today);
        if published < self.window_start(today) {
            debug!(%published, "Entry outside recency window");
            return Verdict::TooOld;
        }
        self.check_title(&entry.title)
    }

    /// Title-only part of [`evaluate`](Self::evaluate).
    pub fn check_title(&self, title: &str) -> Verdict {
        if let Some(keyword) = self.rules.exclude.iter().find(|k| title.contains(k.as_str())) {
            return Verdict::Excluded(keyword.clone());
        }
        if self.rules.include.iter().any(|k| title.contains(k.as_str())) {
            Verdict::Accept
        } else {
            Verdict::NoTopicMatch
        }
    }
}
