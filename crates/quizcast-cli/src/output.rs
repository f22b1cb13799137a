//! Terminal rendering of reports and batch progress.

use colored::Colorize;
use quizcast::worker::{BatchEvent, BatchProgress};
use quizcast::{BatchTally, JobReport, ProgressSummary, SystemReport};

const RULE_WIDTH: usize = 60;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn print_summary(summary: &ProgressSummary) {
    println!();
    println!("{}", rule());
    println!("{}", "📊 RENDER PROGRESS".bold());
    println!("{}", rule());
    println!("Total quizzes:  {}", summary.total);
    println!("{} {}", "✅ Completed:  ".green(), summary.completed);
    println!("{} {}", "⏳ In progress:".yellow(), summary.in_progress);
    println!("{} {}", "❌ Failed:     ".red(), summary.failed);
    println!("{} {}", "⏸  Pending:    ".cyan(), summary.pending);
    println!("{}", rule());
    println!();
}

pub fn print_job_report(report: &JobReport) {
    let template = report.template_id.as_deref().unwrap_or("-");
    match &report.error {
        None => println!(
            "{} {} ({}) -> {}",
            "✅ Rendered".green().bold(),
            report.job_id,
            template,
            report.output_path.display()
        ),
        Some(error) => println!(
            "{} {}: {}",
            "❌ Failed".red().bold(),
            report.job_id,
            error
        ),
    }
}

pub fn print_batch_tally(tally: &BatchTally) {
    println!();
    println!("{}", rule());
    println!("{}", "📊 BATCH RENDER COMPLETE".bold());
    println!("{}", rule());
    println!("{} {}", "✅ Successful:".green(), tally.succeeded);
    println!("{} {}", "❌ Failed:    ".red(), tally.failed);
    println!("📁 Total processed: {}", tally.processed());
    println!("{}", rule());
    println!();
}

pub fn print_reset(reset: &[String]) {
    if reset.is_empty() {
        println!("{}", "No stuck renders found.".green());
        return;
    }
    for identity in reset {
        println!("🔄 Reset: {}", identity);
    }
    println!(
        "{}",
        format!("Reset {} stuck renders to pending.", reset.len()).yellow()
    );
}

pub fn print_system_report(report: &SystemReport) {
    let unavailable = "unavailable".red();

    println!();
    println!("{}", "🔍 SYSTEM CHECK".bold());
    println!("{}", rule());

    println!("{}", "Templates:".bold());
    for template in &report.templates {
        println!("  {} {}: {}", template.id.cyan(), template.name, template.description);
    }

    match &report.records {
        Some(records) => {
            println!("{} {}", "Quiz records:".bold(), records.count);
            for identity in &records.sample {
                println!("  - {}", identity);
            }
            if records.count > records.sample.len() {
                println!("  ... and {} more", records.count - records.sample.len());
            }
        }
        None => println!("{} {}", "Quiz records:".bold(), unavailable),
    }

    match report.bundles {
        Some(count) => println!("{} {}", "Asset bundles:".bold(), count),
        None => println!("{} {}", "Asset bundles:".bold(), unavailable),
    }

    match report.rendered_videos {
        Some(count) => println!("{} {}", "Rendered videos:".bold(), count),
        None => println!("{} {}", "Rendered videos:".bold(), unavailable),
    }

    match &report.summary {
        Some(summary) => print_summary(summary),
        None => println!("{} {}", "Progress:".bold(), unavailable),
    }
}

/// Prints batch progress the way the menu does, one line per event.
pub struct ConsoleBatchProgress;

impl BatchProgress for ConsoleBatchProgress {
    fn report(&self, event: BatchEvent<'_>) {
        match event {
            BatchEvent::Started { total, groups } => {
                println!(
                    "\n⚡ Rendering {} quizzes in {} group(s)\n",
                    total.to_string().bold(),
                    groups
                );
            }
            BatchEvent::GroupStarted {
                index,
                groups,
                jobs,
            } => {
                for job in jobs {
                    println!("[group {}/{}] Starting: {}", index + 1, groups, job.id.cyan());
                }
            }
            BatchEvent::JobFinished { report } => print_job_report(report),
            BatchEvent::GroupFinished { tally, .. } => {
                println!(
                    "\n📊 Progress: {}/{} processed ({} successful, {} failed)",
                    tally.processed(),
                    tally.total,
                    tally.succeeded,
                    tally.failed
                );
            }
        }
    }
}
