//! Word, hashtag and link counting.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Metrics;

/// `#` followed by at least one ASCII letter, digit or underscore. A bare
/// `#` is punctuation. The class is spelled out rather than using `(?i)`,
/// which in Unicode mode would also match signs like U+212A KELVIN.
static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[A-Za-z0-9_]+").expect("valid hashtag regex"));

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid link regex"));

/// Compute metrics for a piece of text.
pub fn analyze_text(text: &str) -> Metrics {
    Metrics {
        word_count: text.split_whitespace().count(),
        hashtag_count: HASHTAG.find_iter(text).count(),
        link_count: LINK.find_iter(text).count(),
    }
}
