//! URL detection in conversational text.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Scheme URLs (`http://`, `https://`, `ftp://`), `www.` hosts and bare
/// `host.tld/` paths. Group 1 is the delimiter that must precede a URL (start
/// of text, whitespace or an opening bracket/quote); group 2 is the URL.
/// Trailing punctuation is not part of a URL unless it closes a parenthesis
/// opened inside it.
const URL_PATTERN: &str = concat!(
    r#"(?i)(^|[\s`(\[{'"<\x{AB}\x{201C}\x{2018}])"#,
    r#"((?:(?:http|https|ftp)://|www\d{0,3}[.]|[a-z0-9.\-]+[.][a-z]{2,4}/)"#,
    r#"(?:[^\s()<>]+|\([^\s()<>]+\))+"#,
    r#"(?:\([^\s()<>]+\)|[^\s`!()\[\]{};:'".,<>?\x{AB}\x{BB}\x{201C}\x{201D}\x{2018}\x{2019}]))"#,
);

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(URL_PATTERN).expect("URL pattern compiles"));

/// A URL found in a text. `offset` and `length` count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlSpan {
    pub offset: usize,
    pub length: usize,
    pub text: String,
}

impl UrlSpan {
    /// Character offset one past the last character of the URL.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.offset && offset < self.end()
    }
}

/// Byte ranges of every URL in `text`, ascending and non-overlapping.
pub fn url_byte_ranges(text: &str) -> Vec<Range<usize>> {
    URL_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(2))
        .map(|m| m.range())
        .collect()
}

/// Every URL in `text`, in order of appearance.
pub fn find_urls(text: &str) -> Vec<UrlSpan> {
    let mut spans = Vec::new();
    let mut offset = 0;
    let mut last_byte = 0;
    for range in url_byte_ranges(text) {
        offset += text[last_byte..range.start].chars().count();
        let url = &text[range.clone()];
        let length = url.chars().count();
        spans.push(UrlSpan { offset, length, text: url.to_string() });
        offset += length;
        last_byte = range.end;
    }
    spans
}

/// URI to hand to the launcher: scheme-less URLs are assumed to be http.
pub fn launch_uri(url: &str) -> String {
    if url.contains(':') {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(text: &str) -> Vec<String> {
        find_urls(text).into_iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_scheme_url_with_filler() {
        let spans = find_urls("see https://gnome.org/news for details");
        assert_eq!(
            spans,
            vec![UrlSpan { offset: 4, length: 22, text: "https://gnome.org/news".into() }]
        );
    }

    #[test]
    fn test_trailing_punctuation_excluded() {
        assert_eq!(urls("Go to http://example.com/path."), vec!["http://example.com/path"]);
        assert_eq!(urls("(see http://a.org/x)"), vec!["http://a.org/x"]);
        assert_eq!(urls("ask www.gnome.org?"), vec!["www.gnome.org"]);
    }

    #[test]
    fn test_balanced_parenthesis_kept() {
        assert_eq!(
            urls("wiki http://en.wikipedia.org/wiki/Rust_(language) now"),
            vec!["http://en.wikipedia.org/wiki/Rust_(language)"]
        );
    }

    #[test]
    fn test_bare_host_needs_path() {
        assert_eq!(urls("example.com is down"), Vec::<String>::new());
        assert_eq!(urls("example.com/status is down"), vec!["example.com/status"]);
    }

    #[test]
    fn test_requires_delimiter_before_url() {
        assert!(find_urls("xhttp://example.com/").is_empty());
        assert_eq!(urls("\"http://example.com/\""), vec!["http://example.com/"]);
    }

    #[test]
    fn test_offsets_count_characters() {
        let spans = find_urls("héllo → www.gnome.org");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].offset, 8);
        assert_eq!(spans[0].length, 13);
    }

    #[test]
    fn test_spans_sorted_and_disjoint() {
        let text = "a http://one.org/ b www.two.net c three.io/xy (http://four.org/y) www5.five.com";
        let spans = find_urls(text);
        assert_eq!(spans.len(), 5);
        for pair in spans.windows(2) {
            assert!(pair[0].end() <= pair[1].offset);
        }
        let total = text.chars().count();
        assert!(spans.iter().all(|s| s.length > 0 && s.end() <= total));
    }

    #[test]
    fn test_launch_uri_adds_scheme() {
        assert_eq!(launch_uri("www.gnome.org"), "http://www.gnome.org");
        assert_eq!(launch_uri("ftp://ftp.gnome.org"), "ftp://ftp.gnome.org");
    }
}
