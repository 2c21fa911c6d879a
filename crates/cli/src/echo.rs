use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "PagePulse".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Diagnose landing-page conversion blockers\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print a section divider for the report
pub fn print_section(title: &str) {
    println!("\n{}", "─".repeat(60).dimmed());
    println!("{}", title.bold().cyan());
    println!("{}", "─".repeat(60).dimmed());
}

/// Render a 0-100 score as a ten-segment bar
pub fn score_bar(score: u8) -> String {
    let filled = (usize::from(score) + 5) / 10;
    format!("{}{}", "█".repeat(filled.min(10)), "░".repeat(10 - filled.min(10)))
}

/// Format a score with range-based coloring
pub fn format_score(score: u8) -> String {
    let text = format!("{:>3}", score);
    if score >= 80 {
        text.bright_green().to_string()
    } else if score >= 60 {
        text.bright_yellow().to_string()
    } else {
        text.bright_red().to_string()
    }
}
