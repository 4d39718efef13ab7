//! RSS feed fetching and parsing.
//!
//! Publisher feeds are RSS 2.0. Only the fields the crawler needs are read:
//! title, link, publication date and an attached image. Anything that goes
//! wrong (transport, status, XML, an empty channel) is reported as "no feed"
//! so the caller can move on to the next publisher.

use crate::models::FeedEntry;
use crate::scrapers::http::{BoxError, fetch_text};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use quick_xml::de::from_str;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "date", alias = "dc:date")]
    dc_date: Option<String>,
    #[serde(rename = "content", alias = "media:content", default)]
    media_content: Vec<MediaRef>,
    #[serde(rename = "thumbnail", alias = "media:thumbnail", default)]
    media_thumbnail: Vec<MediaRef>,
    #[serde(default)]
    enclosure: Vec<MediaRef>,
}

/// `media:content`, `media:thumbnail` and `enclosure` all carry the URL in
/// an attribute.
#[derive(Debug, Deserialize)]
struct MediaRef {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "@medium")]
    medium: Option<String>,
    #[serde(rename = "@type")]
    mime: Option<String>,
}

impl MediaRef {
    fn image_url(&self) -> Option<&str> {
        let is_image = self.medium.as_deref().is_none_or(|m| m == "image")
            && self.mime.as_deref().is_none_or(|t| t.starts_with("image"));
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| is_image && !u.is_empty())
    }
}

static HTML_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]*);").expect("entity regex"));

/// Trailing zone abbreviations that RFC 2822 parsing does not know.
static NAMED_ZONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s(KST|UTC)$").expect("zone regex"));

/// Fetch and parse one publisher feed.
///
/// Returns `None` on any failure or when the feed has no usable entries.
#[instrument(level = "info", skip(client, timeout))]
pub async fn fetch_feed(
    client: &reqwest::Client,
    feed_url: &str,
    timeout: Duration,
) -> Option<Vec<FeedEntry>> {
    match try_fetch_feed(client, feed_url, timeout).await {
        Ok(entries) if entries.is_empty() => {
            warn!(%feed_url, "Feed has no entries");
            None
        }
        Ok(entries) => {
            info!(count = entries.len(), %feed_url, "Parsed feed");
            Some(entries)
        }
        Err(e) => {
            error!(error = %e, %feed_url, "Feed fetch failed");
            None
        }
    }
}

async fn try_fetch_feed(
    client: &reqwest::Client,
    feed_url: &str,
    timeout: Duration,
) -> Result<Vec<FeedEntry>, BoxError> {
    let xml = fetch_text(client, feed_url, timeout).await?;
    parse_feed(&xml, feed_url)
}

/// Parse an RSS document. Relative item links are resolved against `feed_url`.
///
/// Items without a title or link are skipped.
pub fn parse_feed(xml: &str, feed_url: &str) -> Result<Vec<FeedEntry>, BoxError> {
    let base = Url::parse(feed_url)?;
    let xml = scrub_html_entities(xml.trim_start_matches('\u{feff}'));
    let rss: Rss = from_str(&xml)?;

    let mut entries = Vec::with_capacity(rss.channel.items.len());
    for item in rss.channel.items {
        let title = item.title.as_deref().map(str::trim).unwrap_or_default();
        let link = item.link.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() || link.is_empty() {
            debug!(?item.title, ?item.link, "Skipping item without title or link");
            continue;
        }
        let link = match base.join(link) {
            Ok(resolved) => resolved.to_string(),
            Err(e) => {
                debug!(%link, error = %e, "Skipping item with unresolvable link");
                continue;
            }
        };

        let published = item
            .pub_date
            .as_deref()
            .or(item.dc_date.as_deref())
            .and_then(parse_feed_date);

        let media_url = item
            .media_content
            .iter()
            .chain(&item.media_thumbnail)
            .chain(&item.enclosure)
            .find_map(MediaRef::image_url)
            .map(str::to_string);

        entries.push(FeedEntry {
            title: title.to_string(),
            link,
            published,
            media_url,
        });
    }
    Ok(entries)
}

/// Reduce a feed timestamp to a calendar date in the publisher's own offset.
///
/// Accepts RFC 2822, RFC 3339 and a few formats seen in Korean feeds.
pub fn parse_feed_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let normalized = NAMED_ZONE_RE.replace(s, |caps: &Captures| match &caps[1] {
        "KST" => " +0900",
        _ => " +0000",
    });
    let s: &str = &normalized;
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    let formats_with_tz = [
        "%a, %d %b %Y %H:%M:%S %z",
        "%a, %e %b %Y %H:%M:%S %z",
        "%Y-%m-%dT%H:%M:%S%z",
        "%Y-%m-%d %H:%M:%S %z",
    ];
    for fmt in &formats_with_tz {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.date_naive());
        }
    }

    let formats_naive = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y.%m.%d %H:%M"];
    for fmt in &formats_naive {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.date());
        }
    }

    ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Replace HTML named entities that XML does not define.
///
/// Feeds often embed `&nbsp;` or `&middot;` in titles, which makes a strict
/// XML parser reject the whole document.
fn scrub_html_entities(xml: &str) -> String {
    HTML_ENTITY_RE
        .replace_all(xml, |caps: &Captures| {
            let name = &caps[1];
            let replacement = match name {
                "amp" | "lt" | "gt" | "quot" | "apos" => return caps[0].to_string(),
                "nbsp" | "ensp" | "emsp" | "thinsp" => " ",
                "middot" => "·",
                "hellip" => "…",
                "ndash" => "–",
                "mdash" => "—",
                "lsquo" => "‘",
                "rsquo" => "’",
                "ldquo" => "“",
                "rdquo" => "”",
                "laquo" => "«",
                "raquo" => "»",
                "bull" => "•",
                "copy" => "©",
                _ => " ",
            };
            replacement.to_string()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpSettings;
    use crate::scrapers::http::build_client;
    use httpmock::prelude::*;

    const FEED_URL: &str = "https://news.example.com/rss/book.xml";

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>문화</title>
    <link>https://news.example.com/</link>
    <item>
      <title><![CDATA[신간 소설 추천]]></title>
      <link>https://news.example.com/book/1</link>
      <pubDate>Fri, 16 Oct 2026 09:30:00 +0900</pubDate>
      <media:content url="https://img.example.com/1.jpg" medium="image" />
    </item>
    <item>
      <title>시인의 산문&nbsp;모음</title>
      <link>/book/2</link>
      <dc:date>2026-10-15T23:10:00+09:00</dc:date>
      <enclosure url="https://img.example.com/2.png" type="image/png" length="0" />
    </item>
    <item>
      <title>날짜 없는 기사</title>
      <link>https://news.example.com/book/3</link>
      <pubDate>언젠가</pubDate>
    </item>
    <item>
      <title></title>
      <link>https://news.example.com/book/4</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_feed_items() {
        let entries = parse_feed(SAMPLE_FEED, FEED_URL).unwrap();
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].title, "신간 소설 추천");
        assert_eq!(entries[0].link, "https://news.example.com/book/1");
        assert_eq!(entries[0].published, NaiveDate::from_ymd_opt(2026, 10, 16));
        assert_eq!(entries[0].media_url.as_deref(), Some("https://img.example.com/1.jpg"));

        assert_eq!(entries[1].title, "시인의 산문 모음");
        assert_eq!(entries[1].link, "https://news.example.com/book/2");
        assert_eq!(entries[1].published, NaiveDate::from_ymd_opt(2026, 10, 15));
        assert_eq!(entries[1].media_url.as_deref(), Some("https://img.example.com/2.png"));

        assert_eq!(entries[2].published, None);
        assert_eq!(entries[2].media_url, None);
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        assert!(parse_feed("<html><body>not a feed</body></html>", FEED_URL).is_err());
        assert!(parse_feed("", FEED_URL).is_err());
    }

    #[test]
    fn test_parse_feed_date_formats() {
        let oct16 = NaiveDate::from_ymd_opt(2026, 10, 16);
        assert_eq!(parse_feed_date("Fri, 16 Oct 2026 09:30:00 +0900"), oct16);
        assert_eq!(parse_feed_date("Fri, 16 Oct 2026 09:30:00 GMT"), oct16);
        assert_eq!(parse_feed_date("2026-10-16T09:30:00+09:00"), oct16);
        assert_eq!(parse_feed_date("2026-10-16 09:30:00"), oct16);
        assert_eq!(parse_feed_date("2026-10-16"), oct16);
        assert_eq!(parse_feed_date("2026.10.16"), oct16);
        assert_eq!(parse_feed_date(""), None);
        assert_eq!(parse_feed_date("어제"), None);
    }

    #[test]
    fn test_parse_feed_date_named_zones() {
        assert_eq!(
            parse_feed_date("Fri, 09 Oct 2026 09:30:00 KST"),
            NaiveDate::from_ymd_opt(2026, 10, 9)
        );
        assert_eq!(
            parse_feed_date("Fri, 09 Oct 2026 23:30:00 UTC"),
            NaiveDate::from_ymd_opt(2026, 10, 9)
        );
        assert_eq!(
            parse_feed_date("2026-10-09 09:30:00 KST"),
            NaiveDate::from_ymd_opt(2026, 10, 9)
        );
    }

    #[test]
    fn test_parse_feed_interleaved_media_tags() {
        let xml = r#"<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/"><channel>
            <item>
              <title>작가 인터뷰</title>
              <link>https://news.example.com/book/10</link>
              <media:thumbnail url="https://img.example.com/t1.jpg" />
              <media:content url="https://img.example.com/c1.jpg" medium="image" />
              <media:thumbnail url="https://img.example.com/t2.jpg" />
            </item>
            <item>
              <title>시집 출간</title>
              <link>https://news.example.com/book/11</link>
            </item>
        </channel></rss>"#;
        let entries = parse_feed(xml, FEED_URL).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].media_url.as_deref(), Some("https://img.example.com/c1.jpg"));
        assert_eq!(entries[1].media_url, None);
    }

    #[test]
    fn test_parse_feed_channel_image_between_items() {
        let xml = r#"<rss version="2.0"><channel>
            <item><title>첫 기사</title><link>https://news.example.com/book/20</link></item>
            <image><url>https://news.example.com/logo.png</url><title>로고</title></image>
            <item><title>둘째 기사</title><link>https://news.example.com/book/21</link></item>
        </channel></rss>"#;
        let entries = parse_feed(xml, FEED_URL).unwrap();
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["첫 기사", "둘째 기사"]);
    }

    #[test]
    fn test_date_uses_publisher_offset() {
        // 00:30 in Seoul is still the previous day in UTC.
        assert_eq!(
            parse_feed_date("Sat, 17 Oct 2026 00:30:00 +0900"),
            NaiveDate::from_ymd_opt(2026, 10, 17)
        );
    }

    #[test]
    fn test_scrub_html_entities() {
        assert_eq!(scrub_html_entities("a&nbsp;b &amp; c&middot;d"), "a b &amp; c·d");
        assert_eq!(scrub_html_entities("&lt;tag&gt; &unknown;"), "&lt;tag&gt;  ");
    }

    #[tokio::test]
    async fn test_fetch_feed_ok() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/rss");
            then.status(200)
                .header("content-type", "application/rss+xml; charset=utf-8")
                .body(SAMPLE_FEED);
        });

        let client = build_client(&HttpSettings::default()).unwrap();
        let entries = fetch_feed(&client, &server.url("/rss"), Duration::from_secs(5)).await;
        mock.assert();
        assert_eq!(entries.map(|e| e.len()), Some(3));
    }

    #[tokio::test]
    async fn test_fetch_feed_server_error_is_no_feed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rss");
            then.status(500);
        });

        let client = build_client(&HttpSettings::default()).unwrap();
        assert!(fetch_feed(&client, &server.url("/rss"), Duration::from_secs(5)).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_feed_empty_channel_is_no_feed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rss");
            then.status(200)
                .body(r#"<rss version="2.0"><channel><title>empty</title></channel></rss>"#);
        });

        let client = build_client(&HttpSettings::default()).unwrap();
        assert!(fetch_feed(&client, &server.url("/rss"), Duration::from_secs(5)).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_feed_unreachable_is_no_feed() {
        let client = build_client(&HttpSettings::default()).unwrap();
        let entries = fetch_feed(&client, "http://127.0.0.1:9/rss", Duration::from_secs(2)).await;
        assert!(entries.is_none());
    }
}
