//! `site-scrape`: downloads listed images, page images or help articles
//! described by a RON run manifest.

mod console;
mod manifest_file;
mod run;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use engine_logging::{engine_info, LogDestination};
use log::LevelFilter;
use scrape_engine::{ensure_output_dir, Pipeline, ReqwestFetcher};

use crate::run::Flow;

const LOG_FILE: &str = "./scrape.log";

#[derive(Parser, Debug)]
#[command(author, version, about = "Download site images and help articles listed in a RON manifest", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Where log records go
    #[arg(long, value_enum, default_value_t = LogTarget::File, global = true)]
    log: LogTarget,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download listed image URLs, one directory per category
    Images(RunArgs),
    /// Scan pages for images, download them and write a JSON manifest
    Pages(RunArgs),
    /// Save help articles as Markdown, one directory per category
    Articles(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// RON run manifest
    #[arg(short, long)]
    manifest: PathBuf,

    /// Output root
    #[arg(short, long, default_value = "output")]
    output: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    engine_logging::initialize(cli.log.into(), level, Path::new(LOG_FILE));

    let (flow, args) = match cli.command {
        Command::Images(args) => (Flow::Images, args),
        Command::Pages(args) => (Flow::Pages, args),
        Command::Articles(args) => (Flow::Articles, args),
    };

    let manifest = manifest_file::load(&args.manifest)?;
    ensure_output_dir(&args.output)
        .with_context(|| format!("preparing output directory {}", args.output.display()))?;

    let fetcher = ReqwestFetcher::new(manifest.fetch_settings()).context("building http client")?;
    let mut pipeline = Pipeline::new(Arc::new(fetcher), manifest.pipeline_settings());
    if flow == Flow::Articles {
        pipeline = pipeline.with_extractor(manifest.extractor()?);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;

    engine_info!("Starting {} run from {:?}", flow, args.manifest);
    console::banner(flow.title(), manifest.item_count(flow));
    let started = Instant::now();
    let report = runtime.block_on(run::execute(
        flow,
        &pipeline,
        &manifest,
        &args.output,
        &console::ConsoleSink,
    ))?;
    console::print_summary(&report, &args.output, started.elapsed());
    engine_info!("Finished {} run in {:?}", flow, started.elapsed());
    Ok(())
}
