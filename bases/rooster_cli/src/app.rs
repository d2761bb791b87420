// bases/rooster_cli/src/app.rs
use crate::batch::{self, BatchReport, ItemDispatcher, RunContext};
use crate::classify::{classify, Input};
use crate::config::Config;
use crate::error::InputError;
use crate::output::OutputHandler;
use crate::resolve::{resolve, Resolved};
use color_eyre::Result;
use episode_downloader::{
    CompletionLedger, EpisodeDownloader, EpisodeLinkSource, Mode, LEDGER_FILE_NAME,
};

pub struct App {
    config: Config,
    output: OutputHandler,
}

impl App {
    pub fn new(config: Config) -> Self {
        let output = OutputHandler::new(config.verbose);
        Self { config, output }
    }

    pub async fn run(&self) -> Result<()> {
        tracing::info!(
            "Starting run: mode={} input={}",
            self.config.run.mode,
            self.config.input
        );

        if self.config.run.mode == Mode::Archive {
            self.output.print_archive_beta_notice();
        }

        let ledger = CompletionLedger::load(self.config.log_dir.join(LEDGER_FILE_NAME));
        tracing::debug!("Ledger {} holds {} slugs", ledger.path().display(), ledger.len());
        self.output.print_ledger_loaded(ledger.len());

        let input = classify(&self.config.input).inspect_err(|error| tracing::warn!("{error}"))?;

        let downloader = EpisodeDownloader::new(&self.config.run)
            .await
            .inspect_err(|error| tracing::error!("{error}"))?;

        let mut ctx = RunContext {
            config: self.config.run.clone(),
            ledger,
        };

        let report = execute(input, &mut ctx, &downloader, &downloader, &self.output).await?;
        self.output.print_summary(&report);

        Ok(())
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        self.output.print_error(error);
    }
}

/// Resolve `input` and run everything it points at.
///
/// Only resolution can fail; per-item failures end up in the report.
pub async fn execute(
    input: Input,
    ctx: &mut RunContext,
    source: &(dyn EpisodeLinkSource + Sync),
    dispatcher: &(dyn ItemDispatcher + Sync),
    output: &OutputHandler,
) -> Result<BatchReport, InputError> {
    let resolved = resolve(input, source)
        .await
        .inspect_err(|error| tracing::error!("{error}"))?;

    let report = match resolved {
        Resolved::Queue(queue) => batch::run(queue, ctx, dispatcher, output).await,
        Resolved::Single(link) => batch::run_single(&link, ctx, dispatcher, output).await,
    };

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::stub::RecordingDispatcher;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use episode_downloader::RunConfig;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;
    use url::Url;

    struct FixedSource(Option<Vec<String>>);

    #[async_trait]
    impl EpisodeLinkSource for FixedSource {
        async fn get_episode_links(&self, _series_url: &Url) -> Option<Vec<String>> {
            self.0.clone()
        }
    }

    fn context(dir: &TempDir) -> RunContext {
        RunContext {
            config: RunConfig::default(),
            ledger: CompletionLedger::load(dir.path().join(LEDGER_FILE_NAME)),
        }
    }

    #[tokio::test]
    async fn unresolved_series_never_dispatches() {
        let dir = TempDir::new().unwrap();
        let mut ctx = context(&dir);
        let dispatcher = RecordingDispatcher::default();
        let input = classify("https://roosterteeth.com/series/foo").unwrap();

        let result = execute(
            input,
            &mut ctx,
            &FixedSource(None),
            &dispatcher,
            &OutputHandler::new(false),
        )
        .await;

        assert_matches!(result, Err(InputError::SeriesResolution { .. }));
        assert!(dispatcher.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn episode_url_dispatches_exactly_once() {
        let dir = TempDir::new().unwrap();
        let mut ctx = context(&dir);
        ctx.config.randomize = true;
        let dispatcher = RecordingDispatcher::default();
        let input = classify("https://roosterteeth.com/watch/foo-ep1").unwrap();

        let report = execute(
            input,
            &mut ctx,
            &FixedSource(None),
            &dispatcher,
            &OutputHandler::new(false),
        )
        .await
        .unwrap();

        assert_eq!(
            *dispatcher.calls.lock().unwrap(),
            vec!["https://roosterteeth.com/watch/foo-ep1".to_string()]
        );
        assert_eq!(report.total, 1);
    }

    #[tokio::test]
    async fn episode_url_is_dispatched_as_typed() {
        let dir = TempDir::new().unwrap();
        let mut ctx = context(&dir);
        let dispatcher = RecordingDispatcher::default();
        let input = classify("https://RoosterTeeth.com/watch/Foo-Ep1").unwrap();

        execute(
            input,
            &mut ctx,
            &FixedSource(None),
            &dispatcher,
            &OutputHandler::new(false),
        )
        .await
        .unwrap();

        assert_eq!(
            *dispatcher.calls.lock().unwrap(),
            vec!["https://RoosterTeeth.com/watch/Foo-Ep1".to_string()]
        );
    }

    #[tokio::test]
    async fn link_file_runs_past_a_broken_link() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("links.txt");
        fs::write(
            &path,
            "https://roosterteeth.com/watch/a\nhttps://roosterteeth.com/watch/b\nhttps://roosterteeth.com/watch/c\n",
        )
        .unwrap();

        let mut ctx = context(&dir);
        let dispatcher = RecordingDispatcher {
            failing: HashSet::from(["https://roosterteeth.com/watch/b".to_string()]),
            ..RecordingDispatcher::default()
        };
        let input = classify(path.to_str().unwrap()).unwrap();

        let report = execute(
            input,
            &mut ctx,
            &FixedSource(None),
            &dispatcher,
            &OutputHandler::new(false),
        )
        .await
        .unwrap();

        assert_eq!(dispatcher.calls.lock().unwrap().len(), 3);
        assert_eq!(report.completed, 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].position, 2);
    }

    #[tokio::test]
    async fn series_links_are_dispatched_in_order() {
        let dir = TempDir::new().unwrap();
        let mut ctx = context(&dir);
        let dispatcher = RecordingDispatcher::default();
        let links = vec![
            "https://roosterteeth.com/watch/s1e1".to_string(),
            "https://roosterteeth.com/watch/s1e2".to_string(),
        ];
        let input = classify("https://roosterteeth.com/series/foo").unwrap();

        execute(
            input,
            &mut ctx,
            &FixedSource(Some(links.clone())),
            &dispatcher,
            &OutputHandler::new(false),
        )
        .await
        .unwrap();

        assert_eq!(*dispatcher.calls.lock().unwrap(), links);
    }

    #[tokio::test]
    async fn unreadable_link_file_is_terminal() {
        let dir = TempDir::new().unwrap();
        let mut ctx = context(&dir);
        let dispatcher = RecordingDispatcher::default();
        let input = Input::File(dir.path().join("missing.txt"));

        let result = execute(
            input,
            &mut ctx,
            &FixedSource(None),
            &dispatcher,
            &OutputHandler::new(false),
        )
        .await;

        assert_matches!(result, Err(InputError::InputFile { .. }));
        assert!(dispatcher.calls.lock().unwrap().is_empty());
    }
}
