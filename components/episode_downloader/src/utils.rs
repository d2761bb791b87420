// components/episode_downloader/src/utils.rs
use url::Url;

const ARCHIVE_PREFIX: &str = "roosterteeth";

/// Last non-empty path segment, e.g. `rvb-s1e1` for `/watch/rvb-s1e1/`.
pub fn slug_from_url(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

/// Internet Archive identifiers only allow ASCII letters, digits, `-`, `_` and `.`
pub fn archive_identifier(slug: &str) -> String {
    let cleaned: String = slug
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
            _ => '-',
        })
        .collect();

    format!("{ARCHIVE_PREFIX}-{cleaned}")
}
