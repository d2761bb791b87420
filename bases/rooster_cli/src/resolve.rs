// bases/rooster_cli/src/resolve.rs
//! Turn a classified input into the links to process.

use crate::classify::Input;
use crate::error::InputError;
use episode_downloader::EpisodeLinkSource;
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;

/// Links to process, fully materialized before the first download starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkQueue {
    links: Vec<String>,
}

impl WorkQueue {
    pub fn new(links: Vec<String>) -> Self {
        Self { links }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    /// Replace the order with a uniformly random permutation.
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.links.shuffle(rng);
    }
}

impl FromIterator<String> for WorkQueue {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for WorkQueue {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Queue(WorkQueue),
    /// A single episode goes straight to the dispatcher.
    Single(String),
}

/// Read one link per line, in file order. Blank lines are dropped.
pub fn read_link_file(path: &Path) -> Result<WorkQueue, InputError> {
    let contents =
        std::fs::read_to_string(path).map_err(|source| InputError::input_file(path, source))?;

    let total = contents.lines().count();
    let queue: WorkQueue = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if queue.len() < total {
        tracing::debug!(
            "Skipped {} blank lines in {}",
            total - queue.len(),
            path.display()
        );
    }

    Ok(queue)
}

pub async fn resolve(
    input: Input,
    source: &(dyn EpisodeLinkSource + Sync),
) -> Result<Resolved, InputError> {
    match input {
        Input::File(path) => read_link_file(&path).map(Resolved::Queue),
        Input::Series(url) => match source.get_episode_links(&url).await {
            Some(links) => Ok(Resolved::Queue(WorkQueue::new(links))),
            None => Err(InputError::SeriesResolution {
                input: url.to_string(),
            }),
        },
        Input::Episode(link) => Ok(Resolved::Single(link)),
    }
}
