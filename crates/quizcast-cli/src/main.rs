mod commands;
mod menu;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use colored::Colorize;
use quizcast::{discover_config, BatchScheduler};

/// Render quiz videos and track which ones are done.
///
/// Without a mode flag the interactive menu starts.
#[derive(Parser, Debug)]
#[command(name = "quizcast", version, about)]
#[command(group(ArgGroup::new("mode").args(["one", "all", "summary", "reset", "check"])))]
struct Args {
    /// Render one randomly selected unfinished quiz
    #[arg(short = '1', long)]
    one: bool,

    /// Render all unfinished quizzes
    #[arg(short, long)]
    all: bool,

    /// Show the progress summary
    #[arg(short, long)]
    summary: bool,

    /// Reset stuck `in_progress` renders to pending
    #[arg(short, long)]
    reset: bool,

    /// Check templates, records, bundles and rendered videos
    #[arg(short, long)]
    check: bool,

    /// Render this quiz instead of a random one (with --one)
    #[arg(long, value_name = "NAME", requires = "one")]
    job: Option<String>,

    /// Skip the confirmation before a batch
    #[arg(short, long)]
    yes: bool,

    /// Config file (defaults: $QUIZCAST_CONFIG, ./quizcast.json, user config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    quizcast::logging::init_logging(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("{} {:#}", "Fatal error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config =
        discover_config(args.config.as_deref()).context("Failed to load configuration")?;
    let scheduler = BatchScheduler::from_config(&config);

    println!("\n{}\n", "🚀 quizcast render orchestrator".bold());

    if args.check {
        return commands::check(&config);
    }

    if args.one || args.all || args.summary || args.reset {
        commands::summary(&scheduler)?;
    }

    if args.one {
        commands::render_one(&scheduler, args.job.as_deref()).await
    } else if args.all {
        commands::render_all(&scheduler, args.yes).await
    } else if args.summary {
        Ok(())
    } else if args.reset {
        commands::reset(&scheduler)
    } else {
        menu::run(&config, &scheduler).await
    }
}
