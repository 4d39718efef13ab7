//! Shared HTTP client and body decoding.
//!
//! Korean publishers still serve a mix of UTF-8 and EUC-KR, and not all of
//! them declare a charset. Bodies are therefore read as bytes and decoded
//! with the charset from `Content-Type` when present, falling back to byte
//! level detection.

use crate::config::HttpSettings;
use reqwest::header::{ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue, REFERER};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, instrument};

pub type BoxError = Box<dyn Error + Send + Sync>;

/// Build the client used for every feed and article request.
///
/// Carries a browser User-Agent plus `Accept-Language` and `Referer`
/// headers; several publishers serve an empty page to unknown clients.
pub fn build_client(settings: &HttpSettings) -> Result<reqwest::Client, BoxError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_str(&settings.accept_language)?);
    headers.insert(REFERER, HeaderValue::from_str(&settings.referer)?);

    let client = reqwest::Client::builder()
        .user_agent(&settings.user_agent)
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// GET `url` once and return the decoded body.
///
/// A non-success status is returned as an error.
#[instrument(level = "debug", skip(client))]
pub async fn fetch_text(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<String, BoxError> {
    let response = client.get(url).timeout(timeout).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("unexpected status {status} for {url}").into());
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.bytes().await?;
    debug!(bytes = body.len(), content_type = ?content_type, "Fetched body");

    Ok(decode_body(&body, content_type.as_deref()))
}

/// Decode body bytes using the declared charset, or a detected one.
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(encoding) = content_type
        .and_then(extract_charset)
        .and_then(|charset| encoding_rs::Encoding::for_label(charset.as_bytes()))
    {
        let (decoded, _, _) = encoding.decode(body);
        return decoded.into_owned();
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Pull the `charset=` parameter out of a `Content-Type` value.
fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .to_lowercase()
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("charset="))
        .map(|charset| charset.trim_matches('"').trim_matches('\'').to_string())
        .filter(|charset| !charset.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_extract_charset() {
        assert_eq!(extract_charset("text/html; charset=utf-8"), Some("utf-8".to_string()));
        assert_eq!(extract_charset("text/xml; charset=\"EUC-KR\""), Some("euc-kr".to_string()));
        assert_eq!(extract_charset("text/html"), None);
        assert_eq!(extract_charset("text/html; charset="), None);
    }

    #[test]
    fn test_decode_declared_euc_kr() {
        let (bytes, _, _) = encoding_rs::EUC_KR.encode("새로 나온 소설");
        let decoded = decode_body(&bytes, Some("text/html; charset=euc-kr"));
        assert_eq!(decoded, "새로 나온 소설");
    }

    #[test]
    fn test_decode_detects_undeclared_euc_kr() {
        let text = "올해 가을 가장 많이 팔린 책은 장편소설이었다. 서점가에서는 신간 문학 작품이 강세를 보였다.";
        let (bytes, _, _) = encoding_rs::EUC_KR.encode(text);
        assert_eq!(decode_body(&bytes, None), text);
        assert_eq!(decode_body(&bytes, Some("text/html")), text);
    }

    #[test]
    fn test_decode_utf8_without_header() {
        assert_eq!(decode_body("시집 출간".as_bytes(), None), "시집 출간");
    }

    #[tokio::test]
    async fn test_fetch_text_rejects_error_status() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/broken");
            then.status(500).body("oops");
        });

        let client = build_client(&HttpSettings::default()).unwrap();
        let result = fetch_text(&client, &server.url("/broken"), Duration::from_secs(5)).await;
        mock.assert();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_text_sends_browser_headers() {
        let settings = HttpSettings::default();
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/page")
                .header("accept-language", settings.accept_language.as_str())
                .header("referer", settings.referer.as_str())
                .header("user-agent", settings.user_agent.as_str());
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<p>안녕</p>");
        });

        let client = build_client(&settings).unwrap();
        let body = fetch_text(&client, &server.url("/page"), Duration::from_secs(5))
            .await
            .unwrap();
        mock.assert();
        assert_eq!(body, "<p>안녕</p>");
    }
}
