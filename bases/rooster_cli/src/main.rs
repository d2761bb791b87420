// bases/rooster_cli/src/main.rs
mod app;
mod args;
mod batch;
mod classify;
mod config;
mod error;
mod logging;
mod output;
mod resolve;

use clap::Parser;
use color_eyre::Result;
use args::Args;
use app::App;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    logging::init(&args.log_dir)?;

    let app = App::new(Config::from_args(args));

    if let Err(error) = app.run().await {
        app.print_error(&error);
        std::process::exit(1);
    }
    Ok(())
}
