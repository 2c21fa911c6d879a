//! Error types for the diagnosis pipeline.
//!
//! This module defines the main error type [`PagePulseError`] covering every
//! stage of the pipeline: URL validation, page fetching, content extraction,
//! the model call, and model-output validation. Each variant maps to exactly
//! one user-visible failure class; callers translate variants to HTTP status
//! codes without inspecting messages.

use thiserror::Error;

/// Main error type for the diagnosis pipeline.
///
/// The pipeline is all-or-nothing per request: every stage fails fast and no
/// stage attempts local recovery or retries, so each variant is terminal.
///
/// # Example
///
/// ```rust
/// use pagepulse_core::{PagePulseError, validate_url};
///
/// match validate_url("ftp://example.com") {
///     Err(PagePulseError::InvalidUrl(msg)) => println!("rejected: {}", msg),
///     other => panic!("expected InvalidUrl, got {:?}", other),
/// }
/// ```
#[derive(Error, Debug)]
pub enum PagePulseError {
    /// The supplied URL is empty, malformed, or not HTTP(S).
    ///
    /// Raised before any network activity occurs.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The page fetch exceeded its time budget.
    ///
    /// The in-flight request is cancelled when the budget expires.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The page could not be reached at the transport level.
    ///
    /// Covers DNS failures, refused connections, and TLS errors.
    #[error("Page unreachable: {0}")]
    Unreachable(String),

    /// The page responded with a non-success HTTP status.
    #[error("Page returned HTTP status {status}")]
    UpstreamStatus { status: u16 },

    /// The page body exceeds the configured size cap.
    ///
    /// Raised from the declared `Content-Length` when one is present,
    /// otherwise after the body has been fully read.
    #[error("Page too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    /// HTML could not be parsed or a CSS selector was invalid.
    #[error("Failed to parse HTML: {0}")]
    HtmlParse(String),

    /// Extraction produced less text than the minimum usable threshold.
    ///
    /// The pipeline never contacts the model on thin content.
    #[error("Not enough readable content ({length} chars, minimum {minimum})")]
    InsufficientContent { length: usize, minimum: usize },

    /// A required configuration value is absent from the environment.
    ///
    /// Detected once at startup, never at request time.
    #[error("Missing configuration: {0}")]
    ConfigMissing(String),

    /// The model service call itself failed (network, auth, quota, status).
    #[error("Model request failed: {0}")]
    ModelRequest(String),

    /// The model's reply was not a single JSON value.
    #[error("Model returned invalid JSON: {0}")]
    MalformedModelOutput(String),

    /// The model's JSON does not satisfy the diagnosis contract.
    ///
    /// Missing fields, wrong types, or broken arity (exactly 3 top issues,
    /// exactly 5 quick wins) all land here; there is no partial recovery.
    #[error("Model output violates the diagnosis schema: {0}")]
    SchemaViolation(String),
}

/// Result type alias for PagePulseError.
pub type Result<T> = std::result::Result<T, PagePulseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_display() {
        let err = PagePulseError::InvalidUrl("no scheme".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_timeout_display() {
        let err = PagePulseError::Timeout { timeout: 10 };
        assert!(err.to_string().contains("10"));
    }

    #[test]
    fn test_too_large_display() {
        let err = PagePulseError::TooLarge { size: 2_000_000, limit: 1_500_000 };
        assert!(err.to_string().contains("2000000"));
        assert!(err.to_string().contains("1500000"));
    }

    #[test]
    fn test_insufficient_content_display() {
        let err = PagePulseError::InsufficientContent { length: 50, minimum: 200 };
        assert!(err.to_string().contains("50"));
        assert!(err.to_string().contains("200"));
    }
}
