// bases/rooster_cli/src/output.rs
use crate::batch::BatchReport;
use episode_downloader::ItemOutcome;

pub struct OutputHandler {
    verbose: bool,
}

impl OutputHandler {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn print_ledger_loaded(&self, count: usize) {
        println!("Loaded {} previously downloaded slugs...", count);
    }

    pub fn print_archive_beta_notice(&self) {
        println!("Upload to IA is in beta, please report any errors you run into.");
    }

    pub fn print_links_found(&self, count: usize) {
        println!("Found {} links.", count);
    }

    pub fn print_shuffling(&self, count: usize) {
        println!("Shuffling the list of {} links.", count);
    }

    pub fn print_item_start(&self, position: usize, total: usize, link: &str) {
        println!("Downloading link {} of {}: {}", position, total, link.trim());
    }

    pub fn print_item_outcome(&self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Completed { slug } => println!("Finished: {}", slug),
            ItemOutcome::MetadataUpdated { slug } => println!("Updated metadata: {}", slug),
            ItemOutcome::Skipped { slug, reason } => println!("Skipping {} ({})", slug, reason),
            ItemOutcome::Failed { reason } => eprintln!("Failed: {}", reason),
        }
    }

    pub fn print_item_failed(&self, position: usize, link: &str, reason: &str) {
        eprintln!(
            "{} Error occurred while processing link {}: {}",
            reason,
            position,
            link.trim()
        );
    }

    pub fn print_summary(&self, report: &BatchReport) {
        println!(
            "Done: {} downloaded, {} skipped, {} failed out of {}.",
            report.completed,
            report.skipped,
            report.failed.len(),
            report.total
        );

        if self.verbose {
            for failure in &report.failed {
                println!("  #{} {}: {}", failure.position, failure.link, failure.reason);
            }
        }
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        eprintln!("Error: {}", error);

        if self.verbose {
            eprintln!("\nError details:");
            error.chain().skip(1).for_each(|cause| {
                eprintln!("  caused by: {}", cause);
            });
        }
    }
}
