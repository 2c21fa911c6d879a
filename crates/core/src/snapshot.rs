//! Page snapshot: the server-derived structural facts about a page.
//!
//! The snapshot grounds the model's diagnosis in evidence the server
//! computed itself — title, main heading, meta description, call-to-action
//! candidates, and link/button counts. A snapshot is built once per request
//! from the parsed markup and is authoritative: whatever snapshot-shaped
//! data the model echoes back is discarded in favor of this one.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::parse::Document;

/// Maximum number of CTA candidates kept.
const MAX_CTA_CANDIDATES: usize = 8;

/// Maximum visible-text length for a CTA candidate, in characters.
const MAX_CTA_CHARS: usize = 40;

/// Action-intent keywords, Japanese first, English equivalents after.
///
/// A candidate's visible text must match somewhere to count as a CTA. This
/// is a best-effort signal, not ground truth: a matching label may still be
/// decorative, and a real CTA with an unusual label will be missed.
const CTA_KEYWORDS: &str = r"(?i)(購入|申し?込|問い?合わせ|お問合せ|資料請求|無料|登録|予約|見積|ダウンロード|カート|注文|相談|体験|試し|今すぐ|限定|buy|shop|order|purchase|sign\s?up|join|start|get|try|demo|trial|download|register|subscribe|contact|book|reserve|quote|cart|free|now)";

/// Structural facts about a page, derived once per request.
///
/// Serialized into the model prompt as grounding evidence and returned to
/// the caller inside the diagnosis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Page title (title tag, else og:title).
    pub title: Option<String>,
    /// First h1 text (else first h2).
    pub heading: Option<String>,
    /// Meta description (name, else og:description).
    pub meta_description: Option<String>,
    /// Deduplicated CTA label candidates, first-seen order, at most 8.
    pub cta_candidates: Vec<String>,
    /// Number of anchor elements on the page.
    pub link_count: usize,
    /// Number of button-like elements on the page.
    pub button_count: usize,
}

/// Builds the snapshot for a parsed document.
pub fn build_snapshot(doc: &Document) -> PageSnapshot {
    PageSnapshot {
        title: doc.title().or_else(|| doc.meta_content("og:title")),
        heading: first_heading(doc),
        meta_description: doc
            .meta_content("description")
            .or_else(|| doc.meta_content("og:description")),
        cta_candidates: cta_candidates(doc),
        link_count: count(doc, "a"),
        button_count: count(doc, "button, input[type=\"submit\"], input[type=\"button\"], [role=\"button\"]"),
    }
}

fn first_heading(doc: &Document) -> Option<String> {
    for tag in ["h1", "h2"] {
        if let Ok(headings) = doc.select(tag)
            && let Some(first) = headings.first()
        {
            let text = crate::extract::normalize_whitespace(&first.text());
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Collects CTA label candidates from anchor/button-like elements.
///
/// Keeps visible text that is non-empty, at most 40 characters, and matches
/// the curated keyword pattern. Exact-text duplicates collapse to the first
/// occurrence and the result is capped at 8 entries, preserving document
/// order.
fn cta_candidates(doc: &Document) -> Vec<String> {
    let keywords = Regex::new(CTA_KEYWORDS).unwrap();

    let Ok(elements) = doc.select("a, button, input[type=\"submit\"], input[type=\"button\"], [role=\"button\"]")
    else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for element in elements {
        // Submit/button inputs carry their label in the value attribute.
        let raw = if element.tag_name() == "input" {
            element.attr("value").unwrap_or_default().to_string()
        } else {
            element.text()
        };

        let text = crate::extract::normalize_whitespace(&raw);
        if text.is_empty() || text.chars().count() > MAX_CTA_CHARS || !keywords.is_match(&text) {
            continue;
        }
        if seen.insert(text.clone()) {
            candidates.push(text);
            if candidates.len() == MAX_CTA_CANDIDATES {
                break;
            }
        }
    }

    candidates
}

fn count(doc: &Document, selector: &str) -> usize {
    doc.select(selector).map(|els| els.len()).unwrap_or(0)
}
