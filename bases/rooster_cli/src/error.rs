//! Failures that end a run before or while building the work queue.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("invalid url: {input}")]
    MalformedUrl { input: String },

    #[error("unsupported RT URL {input}: only series and episode links are supported")]
    UnsupportedUrl { input: String },

    #[error("something went wrong with parsing {input}, try again or check your links")]
    SeriesResolution { input: String },

    #[error("failed to read link file {path}")]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InputError {
    pub fn input_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InputError::InputFile {
            path: path.into(),
            source,
        }
    }
}
