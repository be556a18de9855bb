//! Rendering
//!
//! Turns raw user input into the storage-ready form handed to
//! [`PostStore::create`](crate::posts::PostStore::create), and stored
//! records into display-ready ones.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::posts::FeedEntry;

/// URL schemes that get linked
const LINK_SCHEMES: &[&str] = &["http://", "https://"];

/// Punctuation that ends a sentence rather than a URL
const LINK_TRAILING_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', ')', ']'];

// =============================================================================
// Content
// =============================================================================

/// HTML-escape `raw` and wrap bare http(s) URLs in anchors.
///
/// ```
/// use jot::render::prepare_content;
///
/// assert_eq!(
///     prepare_content("<b> see https://example.com."),
///     "&lt;b&gt; see <a href=\"https://example.com\">https://example.com</a>."
/// );
/// ```
#[must_use]
pub fn prepare_content(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());

    for piece in raw.split_inclusive(char::is_whitespace) {
        let word = piece.trim_end_matches(char::is_whitespace);
        let spacing = &piece[word.len()..];
        let link = word.trim_end_matches(LINK_TRAILING_PUNCTUATION);

        if is_link(link) {
            let href = escape_html(link);
            out.push_str("<a href=\"");
            out.push_str(&href);
            out.push_str("\">");
            out.push_str(&href);
            out.push_str("</a>");
            out.push_str(&escape_html(&word[link.len()..]));
        } else {
            out.push_str(&escape_html(word));
        }
        out.push_str(spacing);
    }

    out
}

fn is_link(word: &str) -> bool {
    LINK_SCHEMES
        .iter()
        .any(|scheme| word.len() > scheme.len() && word.starts_with(scheme))
}

/// Escape the five HTML-significant characters.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

// =============================================================================
// Dates
// =============================================================================

/// `MMM Do, YYYY` in UTC, e.g. `Oct 16th, 2026`.
///
/// Seconds beyond chrono's range render as the raw number.
#[must_use]
pub fn format_created(created_at: u64) -> String {
    let datetime = i64::try_from(created_at)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

    match datetime {
        Some(dt) => format!(
            "{} {}{}, {}",
            dt.format("%b"),
            dt.day(),
            ordinal_suffix(dt.day()),
            dt.year()
        ),
        None => created_at.to_string(),
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

// =============================================================================
// Display
// =============================================================================

/// A feed entry ready to show: date formatted, key kept for links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayPost {
    /// Physical key, usable with `show` and `delete`
    pub key: String,
    /// Author uid
    pub uid: String,
    /// Author display name
    pub author_name: String,
    /// Formatted creation date
    pub created: String,
    /// Storage-ready content
    pub content: String,
}

impl From<FeedEntry> for DisplayPost {
    fn from(entry: FeedEntry) -> Self {
        Self {
            created: format_created(entry.post.created_at),
            key: entry.key,
            uid: entry.post.uid,
            author_name: entry.post.author_name,
            content: entry.post.content,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
