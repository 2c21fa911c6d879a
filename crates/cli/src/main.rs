use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;

use pagepulse_core::{
    AppConfig, DiagnosisResult, Document, Impact, build_snapshot, extract_content, fetch_url, request_diagnosis,
    validate_response, validate_url,
};

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Diagnose the conversion blockers of a landing page
#[derive(Parser, Debug)]
#[command(name = "pagepulse")]
#[command(author = "PagePulse Contributors")]
#[command(version = VERSION)]
#[command(about = "Diagnose landing-page conversion blockers", long_about = None)]
struct Args {
    /// URL of the page to diagnose (http or https)
    #[arg(value_name = "URL")]
    url: String,

    /// Print the raw diagnosis JSON instead of the report
    #[arg(long)]
    json: bool,

    /// Page fetch timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Model identifier override
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Output language for the diagnosis (e.g. ja, en)
    #[arg(long, value_name = "LANG")]
    language: Option<String>,

    /// Show per-stage progress on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        echo::print_banner();
    }

    let mut config = AppConfig::from_env().context("configuration error (is PAGEPULSE_API_KEY set?)")?;
    if let Some(timeout) = args.timeout {
        config.fetch.timeout = timeout;
    }
    if let Some(model) = args.model {
        config.model.model = model;
    }
    if let Some(language) = args.language {
        config.model.language = language;
    }

    let url = validate_url(&args.url).context("invalid URL")?;

    if args.verbose {
        echo::print_step(1, 4, &format!("Fetching {}", url.as_str().bright_white().underline()));
    }
    let html = fetch_url(&url, &config.fetch).await.context("failed to fetch page")?;

    if args.verbose {
        echo::print_step(2, 4, "Extracting main content");
    }
    let doc = Document::parse_with_url(&html, url.clone());
    let content = extract_content(&doc, &config.extract).context("failed to extract content")?;
    let snapshot = build_snapshot(&doc);

    if args.verbose {
        eprintln!(
            "  {} {} chars via {}",
            "Content:".dimmed(),
            content.text.chars().count().to_string().bright_white(),
            content.strategy.bright_white()
        );
        echo::print_step(3, 4, &format!("Requesting diagnosis from {}", config.model.model.bright_white()));
    }

    let reply = request_diagnosis(&config.model, &url, &content, &snapshot)
        .await
        .context("model request failed")?;

    if args.verbose {
        echo::print_step(4, 4, "Validating model output");
    }
    let mut diagnosis = validate_response(&reply).context("model output rejected")?;
    diagnosis.snapshot = snapshot;

    if args.verbose {
        echo::print_success("Diagnosis complete");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&diagnosis)?);
    } else {
        print_report(&diagnosis);
    }

    Ok(())
}

fn print_report(diagnosis: &DiagnosisResult) {
    println!(
        "\n{}  {} {}",
        echo::format_score(diagnosis.score).bold(),
        echo::score_bar(diagnosis.score).dimmed(),
        diagnosis.summary.bold()
    );

    echo::print_section("Score breakdown");
    let rows = [
        ("First impression", diagnosis.breakdown.first_impression),
        ("Value clarity", diagnosis.breakdown.value_clarity),
        ("CTA strength", diagnosis.breakdown.cta_strength),
        ("Trust signals", diagnosis.breakdown.trust_signals),
        ("Friction", diagnosis.breakdown.friction),
    ];
    for (label, score) in rows {
        println!(
            "  {:<18} {} {}",
            label.dimmed(),
            echo::score_bar(score),
            echo::format_score(score)
        );
    }

    echo::print_section("Top issues");
    for issue in &diagnosis.top_issues {
        let impact = match issue.impact {
            Impact::High => "HIGH".bright_red().to_string(),
            Impact::Medium => "MEDIUM".bright_yellow().to_string(),
            Impact::Low => "LOW".bright_green().to_string(),
        };
        println!("  [{}] {}", impact, issue.title.bold());
        println!("         {}", issue.reason.dimmed());
    }

    echo::print_section("Quick wins");
    for (index, win) in diagnosis.quick_wins.iter().enumerate() {
        println!("  {}. {}", index + 1, win.action.bold());
        println!("     {}", win.how_to.dimmed());
        if let Some(copy) = &win.example_copy {
            println!("     {} {}", "e.g.".dimmed(), copy.bright_white());
        }
    }

    echo::print_section("Priority plan");
    for (index, step) in diagnosis.priority_plan.iter().enumerate() {
        println!("  {}. {}", index + 1, step);
    }

    if !diagnosis.checklist.is_empty() {
        echo::print_section("Checklist");
        for item in &diagnosis.checklist {
            let mark = if item.passed { "✓".green().to_string() } else { "✗".red().to_string() };
            match &item.note {
                Some(note) => println!("  {} {} {}", mark, item.item, format!("({})", note).dimmed()),
                None => println!("  {} {}", mark, item.item),
            }
        }
    }

    echo::print_section("Evidence (server snapshot)");
    let snapshot = &diagnosis.snapshot;
    if let Some(title) = &snapshot.title {
        println!("  {} {}", "Title:".dimmed(), title);
    }
    if let Some(heading) = &snapshot.heading {
        println!("  {} {}", "Heading:".dimmed(), heading);
    }
    println!(
        "  {} {} links, {} buttons",
        "Elements:".dimmed(),
        snapshot.link_count,
        snapshot.button_count
    );
    if !snapshot.cta_candidates.is_empty() {
        println!("  {} {}", "CTAs:".dimmed(), snapshot.cta_candidates.join(" / "));
    }
    println!();
}
