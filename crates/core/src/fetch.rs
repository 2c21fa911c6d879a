//! Page fetching with bounded time and size.
//!
//! This module provides [`validate_url`] (rejects anything that is not an
//! absolute HTTP(S) URL before the network is touched) and [`fetch_url`],
//! which performs a single redirect-following GET under a timeout and a
//! payload cap. Exactly one outbound call per invocation; there is no retry
//! policy anywhere in the pipeline.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::{PagePulseError, Result};

/// HTTP client configuration for fetching pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Maximum accepted payload size in bytes.
    pub max_bytes: u64,
    /// User-Agent string sent with the request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 10,
            max_bytes: 1_500_000,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Validates that `raw` is an absolute HTTP or HTTPS URL.
///
/// Anything else — empty input, malformed syntax, other schemes — is
/// [`PagePulseError::InvalidUrl`]. No side effects, no network.
pub fn validate_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PagePulseError::InvalidUrl("URL is empty".to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| PagePulseError::InvalidUrl(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(PagePulseError::InvalidUrl(format!(
            "unsupported scheme \"{}\" (only http and https)",
            other
        ))),
    }
}

/// Fetches a page body as text.
///
/// Follows redirects and sends a browser-like User-Agent. The call is
/// bounded two ways:
///
/// - exceeding `config.timeout` cancels the in-flight request and yields
///   [`PagePulseError::Timeout`], distinct from [`PagePulseError::Unreachable`]
///   (DNS failure, refused connection, TLS error);
/// - a declared `Content-Length` above `config.max_bytes` aborts with
///   [`PagePulseError::TooLarge`] before the body is read; without a declared
///   length the same cap is enforced on the fully-read body.
///
/// A non-success status is surfaced as [`PagePulseError::UpstreamStatus`]
/// carrying the numeric code.
pub async fn fetch_url(url: &Url, config: &FetchConfig) -> Result<String> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(|e| PagePulseError::Unreachable(e.to_string()))?;

    let response = client
        .get(url.clone())
        .header("User-Agent", &config.user_agent)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header("Accept-Language", "ja,en-US;q=0.9,en;q=0.8")
        .send()
        .await
        .map_err(|e| classify_transport_error(e, config.timeout))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PagePulseError::UpstreamStatus { status: status.as_u16() });
    }

    if let Some(declared) = response.content_length()
        && declared > config.max_bytes
    {
        return Err(PagePulseError::TooLarge { size: declared, limit: config.max_bytes });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| classify_transport_error(e, config.timeout))?;

    if body.len() as u64 > config.max_bytes {
        return Err(PagePulseError::TooLarge { size: body.len() as u64, limit: config.max_bytes });
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}

fn classify_transport_error(e: reqwest::Error, timeout: u64) -> PagePulseError {
    if e.is_timeout() {
        PagePulseError::Timeout { timeout }
    } else {
        PagePulseError::Unreachable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 10);
        assert_eq!(config.max_bytes, 1_500_000);
        assert!(config.user_agent.contains("Mozilla"));
    }

    #[rstest]
    #[case("https://example.com")]
    #[case("http://example.com/path?q=1")]
    #[case("  https://example.com/trimmed  ")]
    fn test_validate_url_accepts_http_https(#[case] input: &str) {
        assert!(validate_url(input).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("not a url")]
    #[case("example.com")]
    #[case("ftp://example.com")]
    #[case("file:///etc/passwd")]
    #[case("javascript:alert(1)")]
    fn test_validate_url_rejects_everything_else(#[case] input: &str) {
        assert!(matches!(validate_url(input), Err(PagePulseError::InvalidUrl(_))));
    }

    #[test]
    fn test_validate_url_keeps_components() {
        let url = validate_url("https://shop.example.co.jp/lp?utm=x#hero").unwrap();
        assert_eq!(url.host_str(), Some("shop.example.co.jp"));
        assert_eq!(url.path(), "/lp");
    }

    #[test]
    fn test_fetch_unreachable_host() {
        let url = validate_url("http://localhost:1").unwrap();
        let config = FetchConfig::default();
        let result = std::thread::spawn(move || {
            tokio::runtime::Runtime::new()
                .unwrap()
                .block_on(fetch_url(&url, &config))
        })
        .join()
        .unwrap();

        assert!(matches!(result, Err(PagePulseError::Unreachable(_))));
    }
}
