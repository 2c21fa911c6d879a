//! The diagnosis pipeline.
//!
//! One strictly sequential pass per request, no shared state, no retries:
//!
//! ```text
//! validate URL → fetch page → parse → extract content → build snapshot
//!              → request diagnosis → validate model output → attach snapshot
//! ```
//!
//! Both suspending stages (the page fetch and the model call) are bounded by
//! their own timeouts; expiry cancels the underlying request. Every failure
//! is terminal for the request and maps to one [`crate::PagePulseError`]
//! variant.

use url::Url;

use crate::config::AppConfig;
use crate::diagnosis::{DiagnosisResult, request_diagnosis};
use crate::extract::{extract_content, ExtractedContent};
use crate::fetch::{fetch_url, validate_url};
use crate::parse::Document;
use crate::snapshot::{build_snapshot, PageSnapshot};
use crate::validate::validate_response;
use crate::Result;

/// Runs the full pipeline for one URL.
///
/// The returned diagnosis always carries the server-computed snapshot;
/// whatever snapshot-shaped data the model produced is discarded during
/// validation.
pub async fn diagnose_url(config: &AppConfig, raw_url: &str) -> Result<DiagnosisResult> {
    let url = validate_url(raw_url)?;

    let html = fetch_url(&url, &config.fetch).await?;

    // The parse/extract/snapshot stage uses `scraper`, whose `Document` is
    // not `Send`. Confine it to this synchronous helper so the non-`Send`
    // tree never lives across an `.await`, keeping the returned future `Send`
    // (required by the axum handler).
    let (content, snapshot) = parse_and_extract(&html, &url, config)?;

    let reply = request_diagnosis(&config.model, &url, &content, &snapshot).await?;

    let mut diagnosis = validate_response(&reply)?;
    diagnosis.snapshot = snapshot;
    Ok(diagnosis)
}

/// Parses the HTML and derives the content and snapshot.
///
/// Kept synchronous and separate so the non-`Send` [`Document`] is fully
/// dropped before any `.await` in [`diagnose_url`].
fn parse_and_extract(html: &str, url: &Url, config: &AppConfig) -> Result<(ExtractedContent, PageSnapshot)> {
    let doc = Document::parse_with_url(html, url.clone());
    let content = extract_content(&doc, &config.extract)?;
    let snapshot = build_snapshot(&doc);
    Ok((content, snapshot))
}
