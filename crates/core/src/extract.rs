//! Main-content extraction.
//!
//! The extractor reduces raw markup to one cleaned text string by running an
//! ordered list of strategies with first-success semantics:
//!
//! 1. [`readable_block`] — scores candidate containers the way a
//!    readability algorithm does (tag kind, class/id hints, text density,
//!    link density) and takes the best block above a threshold;
//! 2. [`region_fallback`] — drops obviously non-content subtrees and takes
//!    the first present of `main`, `article`, `[role="main"]`, or `body`.
//!
//! Whitespace normalization is applied uniformly to whichever candidate
//! wins. A winner shorter than [`ExtractConfig::min_chars`] is not a winner:
//! the next strategy runs, and if none reaches the threshold the extractor
//! signals [`PagePulseError::InsufficientContent`] so callers never feed
//! thin content to the model stage. Extraction is a pure function of the
//! markup; identical input yields identical output.

use regex::Regex;

use crate::parse::{Document, Element};
use crate::{PagePulseError, Result};

/// Appended when the source text exceeds [`ExtractConfig::max_chars`].
pub const TRUNCATION_MARKER: &str = " …[truncated]";

/// Configuration for content extraction.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Minimum usable text length in characters.
    pub min_chars: usize,
    /// Maximum text length in characters; longer text is truncated.
    pub max_chars: usize,
    /// Minimum block score for the readable-block strategy.
    pub min_score: f64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { min_chars: 200, max_chars: 12_000, min_score: 20.0 }
    }
}

/// The result of content extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    /// Cleaned, whitespace-collapsed text.
    pub text: String,
    /// Name of the strategy that produced the text.
    pub strategy: &'static str,
    /// Whether the text was cut at the length cap.
    pub truncated: bool,
}

type Strategy = fn(&Document, &ExtractConfig) -> Option<String>;

/// Extraction strategies in priority order, applied first-success.
const STRATEGIES: &[(&str, Strategy)] = &[("readable-block", readable_block), ("region-fallback", region_fallback)];

/// Extracts the main content of a document.
///
/// Tries each strategy in order and accepts the first whose normalized text
/// reaches the minimum length. See the module docs for the cascade.
///
/// # Errors
///
/// [`PagePulseError::InsufficientContent`] when no strategy produces enough
/// text; `length` reports the best attempt.
pub fn extract_content(doc: &Document, config: &ExtractConfig) -> Result<ExtractedContent> {
    let mut best_length = 0usize;

    for (name, strategy) in STRATEGIES.iter().copied() {
        let Some(raw) = strategy(doc, config) else { continue };
        let text = normalize_whitespace(&raw);
        let length = text.chars().count();

        if length >= config.min_chars {
            let (text, truncated) = truncate(text, config.max_chars);
            return Ok(ExtractedContent { text, strategy: name, truncated });
        }
        best_length = best_length.max(length);
    }

    Err(PagePulseError::InsufficientContent { length: best_length, minimum: config.min_chars })
}

/// Collapses runs of whitespace to single spaces and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    let ws = Regex::new(r"\s+").unwrap();
    ws.replace_all(text, " ").trim().to_string()
}

fn truncate(text: String, max_chars: usize) -> (String, bool) {
    if text.chars().count() <= max_chars {
        return (text, false);
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str(TRUNCATION_MARKER);
    (cut, true)
}

/// Tags considered as potential main-content containers.
const CANDIDATE_TAGS: &[&str] = &["article", "main", "section", "div", "td", "blockquote"];

/// Class/id substrings suggesting a container holds the page's content.
const POSITIVE_HINTS: &str = r"(?i)(article|body|content|entry|main|page|post|text|story|hero|product|lp)";

/// Class/id substrings suggesting a container is chrome, not content.
const NEGATIVE_HINTS: &str =
    r"(?i)(banner|breadcrumb|combx|comment|cookie|foot|header|legal|menu|modal|nav|pager|popup|promo|related|share|sidebar|social|sponsor|widget)";

/// Structured readable-block heuristic.
///
/// Scores every candidate container and returns the non-content-filtered
/// text of the best one, provided it clears `config.min_score`. Scoring is a
/// condensed readability formula: a base score per tag kind, a strong
/// class/id adjustment, a density bonus for long comma-rich prose, and a
/// multiplicative link-density penalty that demotes link farms.
fn readable_block(doc: &Document, config: &ExtractConfig) -> Option<String> {
    let positive = Regex::new(POSITIVE_HINTS).unwrap();
    let negative = Regex::new(NEGATIVE_HINTS).unwrap();

    let mut best: Option<(f64, String)> = None;

    for tag in CANDIDATE_TAGS {
        for element in doc.select(tag).ok()? {
            let text = element.content_text();
            let length = text.chars().count();
            if length < config.min_chars / 4 {
                continue;
            }

            let score = block_score(&element, &text, &positive, &negative);
            if best.as_ref().map(|(s, _)| score > *s).unwrap_or(true) {
                best = Some((score, text));
            }
        }
    }

    match best {
        Some((score, text)) if score >= config.min_score => Some(text),
        _ => None,
    }
}

fn block_score(element: &Element<'_>, text: &str, positive: &Regex, negative: &Regex) -> f64 {
    let base = match element.tag_name().as_str() {
        "article" | "main" => 10.0,
        "section" => 8.0,
        "div" => 5.0,
        "td" | "blockquote" => 3.0,
        _ => 0.0,
    };

    let hint = hint_weight(element, positive, negative);

    // Long comma-rich text reads as prose; both scores are capped so one
    // giant wall of text cannot dominate the class/id signal.
    let char_score = ((text.chars().count() / 100) as f64).min(3.0);
    let comma_score = ((text.matches(',').count() + text.matches('、').count()) as f64).min(3.0);

    let raw = base + hint + char_score + comma_score;
    raw * (1.0 - link_density(element, text))
}

fn hint_weight(element: &Element<'_>, positive: &Regex, negative: &Regex) -> f64 {
    for attr in ["id", "class"] {
        if let Some(value) = element.attr(attr) {
            if positive.is_match(value) {
                return 25.0;
            }
            if negative.is_match(value) {
                return -25.0;
            }
        }
    }
    0.0
}

/// Ratio of link text to total text, 0.0 (no links) to 1.0 (all links).
fn link_density(element: &Element<'_>, text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let linked: usize = element
        .select("a")
        .unwrap_or_default()
        .iter()
        .map(|a| a.text().chars().count())
        .sum();
    (linked as f64 / total as f64).min(1.0)
}

/// Selector chain tried by the fallback, most specific first.
const FALLBACK_REGIONS: &[&str] = &["main", "article", "[role=\"main\"]", "body"];

/// Fallback region extraction.
///
/// Picks the first present region from [`FALLBACK_REGIONS`] that yields any
/// non-content-filtered text. The filtering (scripts, styles, navigation,
/// headers, footers) happens in [`Element::content_text`].
fn region_fallback(doc: &Document, _config: &ExtractConfig) -> Option<String> {
    for selector in FALLBACK_REGIONS {
        let Ok(regions) = doc.select(selector) else { continue };
        if let Some(region) = regions.first() {
            let text = region.content_text();
            if !text.trim().is_empty() {
                return Some(text);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROSE: &str = "We help small teams launch landing pages that convert, with clear copy, fast load \
                         times, and honest pricing. Start a free trial today, invite your team, and publish \
                         your first page in minutes, not weeks. No credit card required for the trial period.";

    fn article_page() -> String {
        format!(
            r#"<html><body>
                <nav class="menu"><a href="/a">A</a><a href="/b">B</a><a href="/c">C</a></nav>
                <article class="post-content"><h2>Why teams choose us</h2><p>{p}</p><p>{p}</p></article>
                <footer>Copyright</footer>
            </body></html>"#,
            p = PROSE
        )
    }

    #[test]
    fn test_readable_block_wins_on_article_page() {
        let doc = Document::parse(&article_page());
        let extracted = extract_content(&doc, &ExtractConfig::default()).unwrap();

        assert_eq!(extracted.strategy, "readable-block");
        assert!(extracted.text.contains("Why teams choose us"));
        assert!(!extracted.text.contains("Copyright"));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let html = article_page();
        let config = ExtractConfig::default();

        let first = extract_content(&Document::parse(&html), &config).unwrap();
        let second = extract_content(&Document::parse(&html), &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_region_fallback_on_unhinted_markup() {
        // Plain <p> under body: no scored container reaches the threshold,
        // so the body region supplies the text.
        let html = format!("<html><body><p>{p}</p><p>{p}</p></body></html>", p = PROSE);
        let doc = Document::parse(&html);

        let extracted = extract_content(&doc, &ExtractConfig::default()).unwrap();
        assert_eq!(extracted.strategy, "region-fallback");
        assert!(extracted.text.contains("free trial"));
    }

    #[test]
    fn test_insufficient_content() {
        let doc = Document::parse("<html><body><main><p>Buy now.</p></main></body></html>");
        let result = extract_content(&doc, &ExtractConfig::default());

        match result {
            Err(PagePulseError::InsufficientContent { length, minimum }) => {
                assert!(length < minimum);
                assert_eq!(minimum, 200);
            }
            other => panic!("expected InsufficientContent, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_document_reports_zero_length() {
        let doc = Document::parse("<html><body></body></html>");
        let result = extract_content(&doc, &ExtractConfig::default());
        assert!(matches!(
            result,
            Err(PagePulseError::InsufficientContent { length: 0, .. })
        ));
    }

    #[test]
    fn test_truncation_at_cap() {
        let long = "word ".repeat(2_000);
        let html = format!("<html><body><main><p>{}</p></main></body></html>", long);
        let config = ExtractConfig { max_chars: 500, ..Default::default() };

        let extracted = extract_content(&Document::parse(&html), &config).unwrap();
        assert!(extracted.truncated);
        assert!(extracted.text.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            extracted.text.chars().count(),
            500 + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_no_truncation_below_cap() {
        let doc = Document::parse(&article_page());
        let extracted = extract_content(&doc, &ExtractConfig::default()).unwrap();
        assert!(!extracted.truncated);
        assert!(!extracted.text.contains("[truncated]"));
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b   c  "), "a b c");
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace("\n\n\n"), "");
    }

    #[test]
    fn test_link_farm_scores_below_prose() {
        let html = format!(
            r#"<html><body>
                <div class="content"><a href="/1">One</a> <a href="/2">Two</a> <a href="/3">Three</a></div>
                <article><p>{}</p></article>
            </body></html>"#,
            PROSE
        );
        let doc = Document::parse(&html);
        let extracted = extract_content(&doc, &ExtractConfig::default()).unwrap();
        assert!(extracted.text.contains("free trial"));
        assert!(!extracted.text.contains("Three"));
    }
}
