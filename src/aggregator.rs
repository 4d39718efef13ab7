//! Crawl orchestration.
//!
//! The run is strictly sequential: one source at a time, one entry at a
//! time, one request in flight. Every per-unit failure (feed or article) has
//! already been turned into `None` by the scrapers, so the loop here only
//! decides what to keep.

use crate::cleaner::TextCleaner;
use crate::config::CrawlConfig;
use crate::filter::{RelevanceFilter, Verdict};
use crate::models::{Article, FeedEntry, ResultSet};
use crate::scrapers::{article, feed};
use crate::sources::SourceConfig;
use crate::utils::{preview, truncate_for_log};
use chrono::NaiveDate;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Counters for one source, logged when the source is done.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceStats {
    pub entries_seen: usize,
    pub accepted: usize,
    pub too_old: usize,
    pub excluded: usize,
    pub off_topic: usize,
    pub no_content: usize,
    pub too_short: usize,
}

/// Runs the fetch → filter → extract → clean pipeline over every source.
pub struct Aggregator<'a> {
    client: &'a reqwest::Client,
    config: &'a CrawlConfig,
    filter: RelevanceFilter,
    cleaner: TextCleaner,
}

impl<'a> Aggregator<'a> {
    pub fn new(client: &'a reqwest::Client, config: &'a CrawlConfig) -> Self {
        Self {
            client,
            config,
            filter: RelevanceFilter::new(config.filter.clone(), config.limits.recency_days),
            cleaner: TextCleaner::new(config.cleaner.clone()),
        }
    }

    /// Crawl all sources in registry order. `today` anchors the recency window.
    #[instrument(level = "info", skip(self), fields(sources = self.config.sources.len()))]
    pub async fn run(&self, today: NaiveDate) -> ResultSet {
        let mut results = ResultSet::new();

        for source in &self.config.sources {
            let (articles, stats) = self.crawl_source(source, today).await;
            info!(
                source = %source.id,
                seen = stats.entries_seen,
                accepted = stats.accepted,
                too_old = stats.too_old,
                excluded = stats.excluded,
                off_topic = stats.off_topic,
                no_content = stats.no_content,
                too_short = stats.too_short,
                "Finished source"
            );
            results.insert(source.id.clone(), articles);
            sleep(self.config.delays.source()).await;
        }

        info!(
            sources = results.source_ids().count(),
            articles = results.article_count(),
            "Crawl complete"
        );
        results
    }

    /// Crawl one source. A missing feed yields no articles.
    #[instrument(level = "info", skip_all, fields(source = %source.id))]
    pub async fn crawl_source(
        &self,
        source: &SourceConfig,
        today: NaiveDate,
    ) -> (Vec<Article>, SourceStats) {
        let mut stats = SourceStats::default();
        let mut articles = Vec::new();
        let cap = self.config.limits.max_per_source;

        let Some(entries) =
            feed::fetch_feed(self.client, &source.feed_url, self.config.http.feed_timeout()).await
        else {
            warn!(feed_url = %source.feed_url, "Skipping source without feed");
            return (articles, stats);
        };

        for entry in entries {
            if articles.len() >= cap {
                break;
            }
            stats.entries_seen += 1;

            match self.filter.evaluate(&entry, today) {
                Verdict::Accept => {}
                Verdict::TooOld => {
                    stats.too_old += 1;
                    continue;
                }
                Verdict::Excluded(keyword) => {
                    debug!(title = %entry.title, %keyword, "Excluded by keyword");
                    stats.excluded += 1;
                    continue;
                }
                Verdict::NoTopicMatch => {
                    stats.off_topic += 1;
                    continue;
                }
            }

            let extracted = article::extract_article(
                self.client,
                &entry.link,
                &source.selector_cascade,
                &self.cleaner,
                self.config.http.article_timeout(),
            )
            .await;

            match extracted {
                None => stats.no_content += 1,
                Some(page) => match self.build_article(source, &entry, page, today) {
                    Some(article) => {
                        info!(title = %article.title, link = %article.link, "Accepted article");
                        articles.push(article);
                        stats.accepted += 1;
                    }
                    None => stats.too_short += 1,
                },
            }
            sleep(self.config.delays.article()).await;
        }

        (articles, stats)
    }

    /// Assemble the output record, rejecting bodies under the minimum length.
    fn build_article(
        &self,
        source: &SourceConfig,
        entry: &FeedEntry,
        page: article::ExtractedArticle,
        today: NaiveDate,
    ) -> Option<Article> {
        let limits = &self.config.limits;
        let chars = page.text.chars().count();
        if chars < limits.min_text_chars {
            debug!(
                title = %entry.title,
                chars,
                text = %truncate_for_log(&page.text, 120),
                "Body too short"
            );
            return None;
        }

        Some(Article {
            source: source.display_name.clone(),
            title: entry.title.clone(),
            link: entry.link.clone(),
            date: entry.published.unwrap_or(today).to_string(),
            image: entry
                .media_url
                .clone()
                .or(page.og_image)
                .unwrap_or_default(),
            content: preview(&page.text, limits.preview_chars),
            full_text: page.text,
        })
    }
}
