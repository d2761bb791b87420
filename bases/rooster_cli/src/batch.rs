// bases/rooster_cli/src/batch.rs
//! Sequential processing of the work queue.
//!
//! Items run strictly one after another. A failing item is reported and
//! logged, then the loop moves on: nothing below this layer can end a batch,
//! and nothing here retries.

use crate::output::OutputHandler;
use crate::resolve::WorkQueue;
use async_trait::async_trait;
use episode_downloader::{CompletionLedger, EpisodeDownloader, ItemOutcome, RunConfig};

/// Process-wide state for one invocation.
pub struct RunContext {
    pub config: RunConfig,
    pub ledger: CompletionLedger,
}

/// Processes a single link.
#[async_trait]
pub trait ItemDispatcher {
    async fn dispatch(
        &self,
        config: &RunConfig,
        link: &str,
        ledger: &mut CompletionLedger,
    ) -> ItemOutcome;
}

#[async_trait]
impl ItemDispatcher for EpisodeDownloader {
    async fn dispatch(
        &self,
        config: &RunConfig,
        link: &str,
        ledger: &mut CompletionLedger,
    ) -> ItemOutcome {
        self.process_one(config, link, ledger).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// 1-based position in the processed order
    pub position: usize,
    pub link: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: Vec<ItemFailure>,
}

impl BatchReport {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    fn record(&mut self, position: usize, link: &str, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Completed { .. } | ItemOutcome::MetadataUpdated { .. } => {
                self.completed += 1
            }
            ItemOutcome::Skipped { .. } => self.skipped += 1,
            ItemOutcome::Failed { reason } => self.failed.push(ItemFailure {
                position,
                link: link.to_string(),
                reason,
            }),
        }
    }
}

/// Shuffle the queue when asked to. Kept apart from the loop so the RNG
/// never lives across an await point.
pub fn prepare<R: rand::Rng + ?Sized>(
    mut queue: WorkQueue,
    randomize: bool,
    rng: &mut R,
    output: &OutputHandler,
) -> WorkQueue {
    output.print_links_found(queue.len());
    tracing::info!("Found {} links", queue.len());

    if randomize {
        output.print_shuffling(queue.len());
        tracing::info!("Shuffling {} links", queue.len());
        queue.shuffle_with(rng);
        tracing::debug!("Shuffled order: {:?}", queue.links());
    }

    if queue.is_empty() {
        tracing::warn!("Nothing to process");
    }

    queue
}

pub async fn run(
    queue: WorkQueue,
    ctx: &mut RunContext,
    dispatcher: &(dyn ItemDispatcher + Sync),
    output: &OutputHandler,
) -> BatchReport {
    let queue = prepare(queue, ctx.config.randomize, &mut rand::thread_rng(), output);
    run_queue(queue, ctx, dispatcher, output).await
}

/// Dispatch every link in order, collecting per-item outcomes.
pub async fn run_queue(
    queue: WorkQueue,
    ctx: &mut RunContext,
    dispatcher: &(dyn ItemDispatcher + Sync),
    output: &OutputHandler,
) -> BatchReport {
    let total = queue.len();
    let mut report = BatchReport::new(total);

    for (index, link) in queue.into_iter().enumerate() {
        let position = index + 1;
        output.print_item_start(position, total, &link);
        tracing::info!("Processing link {position} of {total}: {link}");

        let outcome = dispatcher.dispatch(&ctx.config, &link, &mut ctx.ledger).await;
        report_outcome(position, &link, &outcome, output);
        report.record(position, &link, outcome);
    }

    tracing::info!(
        "Batch finished: {} completed, {} skipped, {} failed of {}",
        report.completed,
        report.skipped,
        report.failed.len(),
        report.total
    );
    report
}

/// A lone episode link: one dispatch, no queue and no shuffling.
pub async fn run_single(
    link: &str,
    ctx: &mut RunContext,
    dispatcher: &(dyn ItemDispatcher + Sync),
    output: &OutputHandler,
) -> BatchReport {
    let mut report = BatchReport::new(1);

    output.print_item_start(1, 1, link);
    tracing::info!("Processing {link}");

    let outcome = dispatcher.dispatch(&ctx.config, link, &mut ctx.ledger).await;
    report_outcome(1, link, &outcome, output);
    report.record(1, link, outcome);
    report
}

fn report_outcome(position: usize, link: &str, outcome: &ItemOutcome, output: &OutputHandler) {
    match outcome {
        ItemOutcome::Failed { reason } => {
            output.print_item_failed(position, link, reason);
            tracing::error!("{reason} - Error occurred while processing link {position}: {link}");
        }
        other => output.print_item_outcome(other),
    }
}
