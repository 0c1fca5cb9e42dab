//! Interactive selection shell and shared terminal output

mod shell;

pub use shell::{Shell, ShellCommand, ShellFlow};

use colored::Colorize;

use crate::estimate::Difficulty;
use crate::prompts::{ComposedPrompt, TemplateSet};

/// Print token, difficulty and skip information to stderr
pub fn print_stats(prompt: &ComposedPrompt) {
    let difficulty = match prompt.estimate.difficulty {
        Difficulty::Easy => prompt.estimate.difficulty.name().green(),
        Difficulty::Moderate => prompt.estimate.difficulty.name().yellow(),
        Difficulty::Hard => prompt.estimate.difficulty.name().red(),
    };
    eprintln!("{}", prompt.estimate.to_string().dimmed());
    eprintln!(
        "Difficulty: {} {}",
        difficulty.bold(),
        format!("({})", prompt.estimate.difficulty.hint()).dimmed()
    );
    eprintln!("Files included: {}", prompt.included.len());
    for path in &prompt.skipped {
        eprintln!("{} Skipped unreadable file: {}", "!".yellow(), path);
    }
}

/// Print the available task types and presets
pub fn print_templates(templates: &TemplateSet) {
    println!("{}", "Task types:".bright_cyan());
    for template in templates.task_types() {
        println!("  {:14} {}", template.name.yellow(), first_line(&template.body).dimmed());
    }
    println!("{}", "Presets:".bright_cyan());
    for preset in templates.presets() {
        println!("  {:14} {}", preset.name.yellow(), first_line(&preset.body).dimmed());
    }
}

fn first_line(body: &str) -> &str {
    body.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_skips_blank_lines() {
        assert_eq!(first_line("\n\n  Review this code.\nMore"), "Review this code.");
        assert_eq!(first_line(""), "");
    }
}
