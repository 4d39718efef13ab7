//! Line-oriented cleanup of extracted article text.
//!
//! Even after noise nodes are removed from the page, newspaper article
//! bodies still carry stray UI strings: text-to-speech notices, "photo
//! enlarge" labels, ad markers, bylines and subscribe prompts. These show up
//! as whole lines in the extracted text and are dropped here.
//!
//! The cleaner is a pure function of its input and is idempotent: cleaning
//! already-cleaned text returns it unchanged.

use itertools::Itertools;
use serde::Deserialize;

/// Separator placed between surviving lines.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Phrase and allow-lists used by [`TextCleaner`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CleanerRules {
    /// A line containing any of these is dropped.
    pub noise_phrases: Vec<String>,
    /// Lines that are kept even though they are shorter than two characters.
    pub keep_short: Vec<String>,
}

impl Default for CleanerRules {
    fn default() -> Self {
        let noise_phrases = [
            // text-to-speech and audio player
            "오디오 기사",
            "기사를 읽어드립니다",
            "음성으로 듣기",
            "음성 재생",
            "AI 음성",
            "AI가 읽어주는",
            "Your browser does not support",
            // photo widgets
            "사진 확대",
            "사진확대",
            "확대보기",
            // UI labels
            "광고",
            "배너",
            "닫기",
            "ADVERTISEMENT",
            // bylines and calls to action
            "기자 구독",
            "기자의 다른 기사",
            "기자 프로필",
            "무단전재",
            "재배포 금지",
            "이메일",
            "구독하기",
            "구독 신청",
            "뉴스레터",
        ];
        let keep_short = ["책", "삶", "시", "꿈", "끝"];
        Self {
            noise_phrases: noise_phrases.iter().map(|s| s.to_string()).collect(),
            keep_short: keep_short.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Removes noise lines and normalizes paragraph spacing.
#[derive(Debug, Clone, Default)]
pub struct TextCleaner {
    rules: CleanerRules,
}

impl TextCleaner {
    pub fn new(rules: CleanerRules) -> Self {
        Self { rules }
    }

    /// Clean multi-line text.
    ///
    /// Each line is trimmed; empty lines, lines containing a noise phrase and
    /// lines under two characters (unless allow-listed) are dropped. The
    /// remaining lines are joined with a blank line between them.
    pub fn clean(&self, text: &str) -> String {
        text.lines()
            .map(str::trim)
            .filter(|line| self.keep_line(line))
            .join(PARAGRAPH_SEPARATOR)
    }

    fn keep_line(&self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }
        if self.rules.keep_short.iter().any(|k| k == line) {
            return true;
        }
        if self.rules.noise_phrases.iter().any(|p| line.contains(p.as_str())) {
            return false;
        }
        line.chars().count() >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(text: &str) -> String {
        TextCleaner::default().clean(text)
    }

    #[test]
    fn test_trims_and_joins_paragraphs() {
        let text = "  첫 문단입니다.  \n\n\n\t둘째 문단입니다.\r\n";
        assert_eq!(clean(text), "첫 문단입니다.\n\n둘째 문단입니다.");
    }

    #[test]
    fn test_drops_tts_notice() {
        let text = "본문 첫 줄입니다.\n오디오 기사를 읽어드립니다\n본문 둘째 줄입니다.";
        let cleaned = clean(text);
        assert!(!cleaned.contains("읽어드립니다"));
        assert_eq!(cleaned, "본문 첫 줄입니다.\n\n본문 둘째 줄입니다.");
    }

    #[test]
    fn test_drops_ui_labels_and_bylines() {
        let text = "사진 확대\n광고\n작가는 말했다.\n홍길동 기자 구독\n이메일 hong@example.com\n닫기";
        assert_eq!(clean(text), "작가는 말했다.");
    }

    #[test]
    fn test_short_lines() {
        let text = "가\n책\n.\n끝\n나다";
        assert_eq!(clean(text), "책\n\n끝\n\n나다");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("\n \n\t\n"), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "한 줄",
            "  앞뒤 공백  \n\n\n중간   공백은 유지\n",
            "시\n\n\n꿈\n가\n오디오 기사를 읽어드립니다\n본문",
            "\r\n\r\nWindows 줄바꿈\r\n다음 줄\r\n",
            "광고\n배너\n닫기\n사진 확대\n",
            "\u{3000}전각 공백\u{3000}\n\u{a0}nbsp\u{a0}",
        ];
        let cleaner = TextCleaner::default();
        for sample in samples {
            let once = cleaner.clean(sample);
            assert_eq!(cleaner.clean(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_custom_rules() {
        let cleaner = TextCleaner::new(CleanerRules {
            noise_phrases: vec!["Share".to_string()],
            keep_short: vec!["I".to_string()],
        });
        assert_eq!(cleaner.clean("Share this\nI\nA\nBody text"), "I\n\nBody text");
    }
}
