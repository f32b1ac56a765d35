//! Parsing of GitHub `Link` response headers.
//!
//! ```text
//! <https://api.github.com/repositories/1/pulls?page=2>; rel="next", <https://api.github.com/repositories/1/pulls?page=4>; rel="last"
//! ```

use reqwest::header::{HeaderMap, LINK};

/// The URL of the `rel="next"` entry in the response's `Link` header.
///
/// Returns `None` when the header is missing or unreadable, and also when
/// it names zero or more than one next page.
pub fn next_link(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(LINK)?.to_str().ok()?;
    parse_next(value)
}

pub fn parse_next(header: &str) -> Option<String> {
    let mut next = header
        .split(',')
        .filter_map(parse_entry)
        .filter(|(_, rel)| *rel == "next")
        .map(|(url, _)| url);

    let first = next.next()?;
    if next.next().is_some() {
        return None;
    }
    Some(first.to_string())
}

/// Split `<url>; rel="x"` into `(url, x)`.
fn parse_entry(entry: &str) -> Option<(&str, &str)> {
    let mut parts = entry.split(';');
    let url = parts
        .next()?
        .trim()
        .strip_prefix('<')?
        .strip_suffix('>')?;

    let rel = parts.find_map(|param| {
        let (key, value) = param.split_once('=')?;
        (key.trim() == "rel").then(|| value.trim().trim_matches('"'))
    })?;

    Some((url, rel))
}
