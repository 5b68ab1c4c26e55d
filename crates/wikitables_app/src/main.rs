mod jobs;
mod logging;
mod runner;

use std::path::PathBuf;

use clap::Parser;
use wikitables_core::default_plan;
use wikitables_engine::ScrapeSettings;

#[derive(Parser, Debug)]
#[clap(author, version)]
#[clap(about = "Drive a batch of Wikipedia table scrapes and consolidate the output")]
struct Cli {
    /// Consolidated output directory; wiped and recreated at the start of the run.
    #[clap(long, default_value = "output")]
    output_root: PathBuf,

    /// Where the collaborator stages per-job directories.
    #[clap(long, default_value = "outputTables")]
    staging_root: PathBuf,

    /// External table-scraping executable.
    #[clap(long, default_value = "wikitablescrape")]
    scraper: PathBuf,

    /// RON file with the jobs to run instead of the built-in five articles.
    #[clap(long)]
    jobs: Option<PathBuf>,

    /// Also write a log file (./wikitables.log) next to the terminal output.
    #[clap(long)]
    log_file: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(if cli.log_file {
        logging::LogDestination::Both
    } else {
        logging::LogDestination::Terminal
    });

    let plan = match &cli.jobs {
        Some(path) => jobs::load_plan(path)?,
        None => default_plan(),
    };

    let options = runner::RunOptions {
        scrape: ScrapeSettings {
            command: cli.scraper,
            extra_args: Vec::new(),
            staging_root: cli.staging_root,
        },
        output_root: cli.output_root,
    };

    let report = runner::execute(&plan, options)?;
    let summary = report.summary();
    if summary.completed != summary.total {
        anyhow::bail!(
            "{} of {} jobs did not complete",
            summary.total - summary.completed,
            summary.total
        );
    }
    Ok(())
}
