// bases/rooster_cli/src/config.rs
use crate::args::Args;
use episode_downloader::{Credentials, Mode, RunConfig};
use std::path::PathBuf;

/// Everything one invocation needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub run: RunConfig,
    pub log_dir: PathBuf,
    pub input: String,
    pub verbose: bool,
}

impl Config {
    /// Create configuration from CLI arguments
    pub fn from_args(args: Args) -> Self {
        let mode = if args.ia {
            Mode::Archive
        } else if args.archivist {
            Mode::Archivist
        } else {
            Mode::Show
        };

        let credentials = match (args.email, args.password) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            (None, None) => None,
            _ => {
                tracing::warn!("Both --email and --password are needed to log in; continuing anonymously");
                None
            }
        };

        let run = RunConfig {
            credentials,
            concurrent_fragments: args.concurrent_fragments,
            fragment_retries: args.fragment_retries,
            fragment_abort: args.fragment_abort,
            mode,
            fast_check: args.fast_check,
            use_aria: args.use_aria,
            ignore_existing: args.ignore_existing,
            keep_after_upload: args.keep_uploads,
            update_metadata: args.update_meta,
            randomize: args.random,
            output_dir: args.output_dir,
        };

        Self {
            run,
            log_dir: args.log_dir,
            input: args.input,
            verbose: args.verbose,
        }
    }
}
