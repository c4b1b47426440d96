//! m3u8 manifest URL discovery over raw article markup.
//!
//! Players embed their manifest in many ways: a plain `<source src>`, a JSON
//! blob inside a `<script>`, a JS string literal. Rather than parse any of
//! those, the raw response text is scanned with a short list of patterns in
//! a fixed priority order. The first pattern that matches anywhere wins, and
//! within a pattern the earliest match in the document wins.

use once_cell::sync::Lazy;
use regex::Regex;

static BARE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s"'<>]+\.m3u8[^\s"'<>]*"#).unwrap()
});
static DOUBLE_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]*\.m3u8[^"]*)""#).unwrap());
static SINGLE_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"'([^']*\.m3u8[^']*)'"#).unwrap());

/// One way of spotting a manifest URL in markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestPattern {
    /// An absolute `http(s)` URL, ending at whitespace, a quote or an angle bracket.
    BareUrl,
    /// Any double-quoted string mentioning `.m3u8`.
    DoubleQuoted,
    /// Any single-quoted string mentioning `.m3u8`.
    SingleQuoted,
}

/// Evaluation order. Earlier entries shadow later ones entirely.
pub const PRIORITY: [ManifestPattern; 3] = [
    ManifestPattern::BareUrl,
    ManifestPattern::DoubleQuoted,
    ManifestPattern::SingleQuoted,
];

impl ManifestPattern {
    fn regex(self) -> &'static Regex {
        match self {
            ManifestPattern::BareUrl => &BARE_URL,
            ManifestPattern::DoubleQuoted => &DOUBLE_QUOTED,
            ManifestPattern::SingleQuoted => &SINGLE_QUOTED,
        }
    }

    /// First match of this pattern in `text`, preferring the capture group
    /// over the whole match when the pattern has one.
    pub fn find(self, text: &str) -> Option<String> {
        let caps = self.regex().captures(text)?;
        let m = caps.get(1).or_else(|| caps.get(0))?;
        Some(m.as_str().trim().to_string())
    }
}

/// Find the manifest URL in `text`, trying each pattern of [`PRIORITY`] in turn.
pub fn find_manifest_url(text: &str) -> Option<String> {
    find_manifest_match(text).map(|(_, url)| url)
}

/// Like [`find_manifest_url`] but also reports which pattern matched.
pub fn find_manifest_match(text: &str) -> Option<(ManifestPattern, String)> {
    PRIORITY
        .iter()
        .find_map(|pattern| pattern.find(text).map(|url| (*pattern, url)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_manifest_extension_yields_none() {
        let html = r#"<html><body>
            <video src="https://cdn.example.com/clip.mp4"></video>
            <script>var src = 'https://cdn.example.com/list.m3u';</script>
        </body></html>"#;
        assert_eq!(find_manifest_url(html), None);
        assert_eq!(find_manifest_url(""), None);
    }

    #[test]
    fn test_quoted_url_keeps_query_and_drops_quote() {
        let html = r#"<source src="https://cdn.example.com/a/b.m3u8?x=1" type="application/x-mpegURL">"#;
        assert_eq!(
            find_manifest_url(html).as_deref(),
            Some("https://cdn.example.com/a/b.m3u8?x=1")
        );
    }

    #[test]
    fn test_bare_url_beats_earlier_quoted_fragment() {
        let html = r#"<script>var p = "/relative/first.m3u8";</script>
            <p>https://cdn.example.com/second.m3u8</p>"#;
        assert_eq!(
            find_manifest_match(html),
            Some((
                ManifestPattern::BareUrl,
                "https://cdn.example.com/second.m3u8".to_string()
            ))
        );
    }

    #[test]
    fn test_first_bare_url_in_document_order_wins() {
        let html = "https://a.example.com/one.m3u8 https://b.example.com/two.m3u8";
        assert_eq!(
            find_manifest_url(html).as_deref(),
            Some("https://a.example.com/one.m3u8")
        );
    }

    #[test]
    fn test_double_quoted_before_single_quoted() {
        let html = r#"<script>a = '/single.m3u8'; b = "/double.m3u8";</script>"#;
        assert_eq!(
            find_manifest_match(html),
            Some((ManifestPattern::DoubleQuoted, "/double.m3u8".to_string()))
        );
    }

    #[test]
    fn test_single_quoted_fallback() {
        let html = "<script>player.load('//cdn.example.com/live.m3u8');</script>";
        assert_eq!(
            find_manifest_match(html),
            Some((
                ManifestPattern::SingleQuoted,
                "//cdn.example.com/live.m3u8".to_string()
            ))
        );
    }

    #[test]
    fn test_captured_value_is_trimmed() {
        let html = r#"data-src="  /streams/index.m3u8  ""#;
        assert_eq!(
            find_manifest_url(html).as_deref(),
            Some("/streams/index.m3u8")
        );
    }

    #[test]
    fn test_bare_url_stops_at_angle_bracket() {
        let html = "<a>https://cdn.example.com/x.m3u8</a>";
        assert_eq!(
            find_manifest_url(html).as_deref(),
            Some("https://cdn.example.com/x.m3u8")
        );
    }

    #[test]
    fn test_priority_order_is_fixed() {
        assert_eq!(
            PRIORITY,
            [
                ManifestPattern::BareUrl,
                ManifestPattern::DoubleQuoted,
                ManifestPattern::SingleQuoted
            ]
        );
    }
}
