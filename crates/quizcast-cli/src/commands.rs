//! Operations shared by the one-shot flags and the interactive menu.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use quizcast::report::ProgressSummary;
use quizcast::{BatchOutcome, BatchScheduler, Config, SystemReport};

use crate::output::{self, ConsoleBatchProgress};

pub fn summary(scheduler: &BatchScheduler) -> Result<()> {
    let summary = ProgressSummary::compute(scheduler.catalog(), scheduler.store())
        .context("Failed to compute progress summary")?;
    output::print_summary(&summary);
    Ok(())
}

pub async fn render_one(scheduler: &BatchScheduler, job: Option<&str>) -> Result<()> {
    let report = match job {
        Some(identity) => {
            println!("\n🎯 Rendering: {}", identity.cyan());
            scheduler.run_job(identity).await?
        }
        None => match scheduler.run_one().await? {
            Some(report) => report,
            None => {
                println!("\n{}", "🎉 All quizzes have been rendered!".green().bold());
                return Ok(());
            }
        },
    };

    output::print_job_report(&report);
    Ok(())
}

pub async fn render_all(scheduler: &BatchScheduler, assume_yes: bool) -> Result<()> {
    let confirm = |pending: usize| {
        println!("\n📋 Found {} quiz(zes) to render", pending);
        assume_yes || confirm_batch(pending)
    };

    match scheduler.run_batch(confirm, &ConsoleBatchProgress).await? {
        BatchOutcome::Cancelled { .. } => println!("{}", "❌ Cancelled.".red()),
        BatchOutcome::Completed(tally) if tally.total == 0 => {
            println!("\n{}", "🎉 All quizzes have been rendered!".green().bold());
        }
        BatchOutcome::Completed(tally) => output::print_batch_tally(&tally),
    }
    Ok(())
}

fn confirm_batch(pending: usize) -> bool {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Proceed with rendering all {} quizzes?", pending))
        .default(false)
        .interact()
        .unwrap_or_else(|e| {
            log::warn!("Confirmation prompt failed: {}", e);
            false
        })
}

pub fn reset(scheduler: &BatchScheduler) -> Result<()> {
    let reset = scheduler
        .reset_stuck()
        .context("Failed to reset stuck renders")?;
    output::print_reset(&reset);
    Ok(())
}

pub fn check(config: &Config) -> Result<()> {
    output::print_system_report(&SystemReport::collect(config));
    Ok(())
}
