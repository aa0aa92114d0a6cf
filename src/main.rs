//! `sitesearch` command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;

use sitesearch::config::load_config;
use sitesearch::config::schema::{ProgressMode, SiteSearchConfig};
use sitesearch::error::Result;
use sitesearch::observability::init_logging;
use sitesearch::queue::jobs::ReindexElementsJob;
use sitesearch::queue::JobQueue;
use sitesearch::search::ConsoleSink;
use sitesearch::store::ContentStore;

#[derive(Debug, Parser)]
#[command(name = "sitesearch", version, about = "Rebuild the site search index")]
struct Cli {
    /// Config file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Content database, overrides the configured path.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Debug-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Drop and rebuild the whole search index.
    Rebuild {
        /// Hide progress output; errors are still printed.
        #[arg(short, long)]
        quiet: bool,

        /// `counted` or `streaming`.
        #[arg(long, value_parser = parse_progress_mode)]
        progress: Option<ProgressMode>,
    },
    /// Print search index statistics.
    Stats,
}

fn parse_progress_mode(s: &str) -> std::result::Result<ProgressMode, String> {
    ProgressMode::from_str_loose(s).ok_or_else(|| format!("unknown progress mode: {s}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config: SiteSearchConfig = load_config(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database.path = db;
    }
    let store = ContentStore::open(&config.database.path)?;

    match cli.command {
        Command::Rebuild { quiet, progress } => {
            if let Some(mode) = progress {
                config.reindex.progress_mode = mode;
            }
            let console = ConsoleSink::new(quiet || config.console.quiet);
            let queue = JobQueue::new();
            let job = ReindexElementsJob::new(&store)
                .with_messages(&console)
                .with_config(config.reindex.clone());
            let outcome = queue.run(&job);
            console.finish();
            outcome?;

            let stats = store.index_stats()?;
            println!(
                "{} indexed {} element(s) across {} element/site pair(s)",
                style("done:").green().bold(),
                stats.elements,
                stats.element_sites
            );
        }
        Command::Stats => {
            let stats = store.index_stats()?;
            println!("{}", stats.to_json_pretty()?);
        }
    }
    Ok(())
}
