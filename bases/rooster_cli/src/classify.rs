// bases/rooster_cli/src/classify.rs
//! Decide what kind of input the user handed us.

use crate::error::InputError;
use std::path::PathBuf;
use url::Url;

pub const HOST_MARKER: &str = "roosterteeth.com";
pub const LINK_FILE_SUFFIX: &str = ".txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Series,
    Episode,
}

/// Path segment that selects each route, checked in order.
const ROUTES: &[(&str, Route)] = &[("series", Route::Series), ("watch", Route::Episode)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    File(PathBuf),
    Series(Url),
    /// Kept as typed; the downloader gets the link verbatim
    Episode(String),
}

pub fn classify(input: &str) -> Result<Input, InputError> {
    if input.ends_with(LINK_FILE_SUFFIX) {
        return Ok(Input::File(PathBuf::from(input)));
    }

    let url = match Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => url,
        _ => {
            return Err(InputError::MalformedUrl {
                input: input.to_string(),
            })
        }
    };

    if url.host_str() != Some(HOST_MARKER) {
        return Err(InputError::UnsupportedUrl {
            input: input.to_string(),
        });
    }

    let segments: Vec<&str> = url.path_segments().map(Iterator::collect).unwrap_or_default();

    let route = ROUTES
        .iter()
        .find(|(segment, _)| segments.contains(segment))
        .map(|(_, route)| *route);

    match route {
        Some(Route::Series) => Ok(Input::Series(url)),
        Some(Route::Episode) => Ok(Input::Episode(input.to_string())),
        None => Err(InputError::UnsupportedUrl {
            input: input.to_string(),
        }),
    }
}
