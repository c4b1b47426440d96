//! Article link discovery on the rendered category page.
//!
//! Every `a[href]` is resolved against the category URL and kept only when it
//! points at another page of the same site that is not itself a listing:
//!
//! - same host as the category page (a leading `www.` is ignored)
//! - not the category page itself
//! - not a feed endpoint (`…/feed` or `…/feed/`)
//! - no `/category/` or `/tag/` segment in the path

use crate::models::LinkSet;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

fn site_host(url: &Url) -> Option<&str> {
    url.host_str().map(|h| h.strip_prefix("www.").unwrap_or(h))
}

fn is_feed_path(path: &str) -> bool {
    path.trim_end_matches('/').ends_with("/feed")
}

fn is_taxonomy_path(path: &str) -> bool {
    path.contains("/category/") || path.contains("/tag/")
}

/// Decide whether `href` is an article link relative to `origin`, returning
/// its absolute, fragment-free form when it is.
fn article_link(origin: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let mut resolved = origin.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    if site_host(&resolved) != site_host(origin) {
        return None;
    }
    resolved.set_fragment(None);
    if resolved == *origin {
        return None;
    }
    let path = resolved.path();
    if is_feed_path(path) || is_taxonomy_path(path) {
        return None;
    }
    Some(resolved.to_string())
}

/// Collect the article links in `html`, in document order, without duplicates.
#[instrument(level = "info", skip_all, fields(origin = %origin))]
pub fn discover_links(html: &str, origin: &Url) -> LinkSet {
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").unwrap();

    let links: LinkSet = document
        .select(&anchor_selector)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| article_link(origin, href))
        .collect();

    info!(count = links.len(), "Discovered article links");
    debug!(urls = ?links.iter().collect::<Vec<_>>(), "Article links");
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://fintech.example/category/market-movers/";

    fn origin() -> Url {
        Url::parse(ORIGIN).unwrap()
    }

    fn links(html: &str) -> Vec<String> {
        discover_links(html, &origin()).iter().map(str::to_string).collect()
    }

    #[test]
    fn test_filters_listing_pages() {
        let html = format!(
            r#"<a href="{ORIGIN}">Self</a>
            <a href="https://fintech.example/feed/">Feed</a>
            <a href="https://fintech.example/category/other/">Category</a>
            <a href="https://fintech.example/tag/stocks/">Tag</a>
            <a href="https://fintech.example/opening-bell-may-6/">Article</a>"#
        );
        assert_eq!(
            links(&html),
            vec!["https://fintech.example/opening-bell-may-6/"]
        );
    }

    #[test]
    fn test_feed_without_trailing_slash_is_filtered() {
        let html = r#"<a href="https://fintech.example/opening-bell/feed">Comments feed</a>"#;
        assert!(links(html).is_empty());
    }

    #[test]
    fn test_other_sites_are_dropped() {
        let html = r#"<a href="https://twitter.com/share">Share</a>
            <a href="https://www.fintech.example/video-one/">One</a>
            <a href="mailto:desk@fintech.example">Mail</a>"#;
        assert_eq!(links(html), vec!["https://www.fintech.example/video-one/"]);
    }

    #[test]
    fn test_relative_links_are_resolved() {
        let html = r#"<a href="/video-two/">Two</a>"#;
        assert_eq!(links(html), vec!["https://fintech.example/video-two/"]);
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let html = r#"<a href="https://fintech.example/b/">B</a>
            <a href="https://fintech.example/a/">A</a>
            <a href="https://fintech.example/b/">B again</a>
            <a href=" https://fintech.example/a/ ">A again</a>
            <a href="https://fintech.example/b/#comments">B comments</a>"#;
        assert_eq!(
            links(html),
            vec!["https://fintech.example/b/", "https://fintech.example/a/"]
        );
    }

    #[test]
    fn test_no_links_is_empty() {
        let links = discover_links("<html><body>Nothing</body></html>", &origin());
        assert!(links.is_empty());
    }

    #[test]
    fn test_generated_markup_never_yields_excluded_urls() {
        let paths = [
            "",
            "category/market-movers/",
            "feed/",
            "tag/ai/",
            "news/category/x",
            "story-1/",
            "story-1/feed/",
            "2025/05/06/story-2/",
            "story-1/",
        ];
        let mut html = String::new();
        for (i, a) in paths.iter().enumerate() {
            for b in paths.iter().skip(i) {
                html.push_str(&format!(
                    r#"<a href="https://fintech.example/{a}">x</a><a href="/{b}">y</a>"#
                ));
            }
        }

        let found = links(&html);
        let mut seen = std::collections::HashSet::new();
        for url in &found {
            assert_ne!(url, ORIGIN);
            assert!(!url.trim_end_matches('/').ends_with("/feed"), "{url}");
            assert!(!url.contains("/category/"), "{url}");
            assert!(!url.contains("/tag/"), "{url}");
            assert!(seen.insert(url.clone()), "duplicate {url}");
        }
        assert_eq!(
            found,
            vec![
                "https://fintech.example/",
                "https://fintech.example/story-1/",
                "https://fintech.example/2025/05/06/story-2/",
            ]
        );
    }
}
