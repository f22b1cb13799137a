//! Interactive mode, used when no mode flag is given.

use anyhow::Result;
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use quizcast::{BatchScheduler, Config};

use crate::commands;

/// Actions offered by the menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    RenderOne,
    RenderAll,
    Summary,
    Reset,
    Check,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 6] = [
        MenuAction::RenderOne,
        MenuAction::RenderAll,
        MenuAction::Summary,
        MenuAction::Reset,
        MenuAction::Check,
        MenuAction::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::RenderOne => "🎲 Render one random quiz",
            MenuAction::RenderAll => "🎬 Render all unrendered quizzes",
            MenuAction::Summary => "📊 Show progress summary",
            MenuAction::Reset => "🔄 Reset stuck renders",
            MenuAction::Check => "🔍 System check",
            MenuAction::Exit => "👋 Exit",
        }
    }

    /// Parses a 1-based menu number as typed at the prompt.
    pub fn from_choice(input: &str) -> Option<Self> {
        let number: usize = input.trim().parse().ok()?;
        Self::ALL.get(number.checked_sub(1)?).copied()
    }
}

fn print_menu() {
    println!();
    for (number, action) in MenuAction::ALL.iter().enumerate() {
        println!("  {}. {}", number + 1, action.label());
    }
    println!();
}

pub async fn run(config: &Config, scheduler: &BatchScheduler) -> Result<()> {
    commands::summary(scheduler)?;

    let theme = ColorfulTheme::default();
    let prompt = format!("Choose an option (1-{})", MenuAction::ALL.len());

    loop {
        print_menu();
        let line: String = Input::with_theme(&theme)
            .with_prompt(&prompt)
            .allow_empty(true)
            .interact_text()?;

        let Some(action) = MenuAction::from_choice(&line) else {
            println!("{}", "Invalid option, try again.".yellow());
            continue;
        };

        // Per-operation errors are shown and the menu keeps going
        let result = match action {
            MenuAction::RenderOne => commands::render_one(scheduler, None).await,
            MenuAction::RenderAll => commands::render_all(scheduler, false).await,
            MenuAction::Summary => commands::summary(scheduler),
            MenuAction::Reset => commands::reset(scheduler),
            MenuAction::Check => commands::check(config),
            MenuAction::Exit => {
                println!("\n{}\n", "👋 Goodbye!".bold());
                return Ok(());
            }
        };

        if let Err(e) = result {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
        }
    }
}
