//! HTML parsing and DOM querying.
//!
//! Wraps `scraper` behind the [`Document`] and [`Element`] types used by the
//! extraction and snapshot stages. Parsing never fails on malformed markup
//! (the underlying parser is error-recovering); only invalid CSS selectors
//! surface errors.

use scraper::{Html, Selector};
use url::Url;

use crate::{PagePulseError, Result};

/// Elements whose text is never page content.
///
/// Text nodes under any of these are skipped by [`Element::content_text`].
const NON_CONTENT_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside", "form", "iframe", "svg",
];

/// A parsed HTML document, optionally tied to its originating URL.
///
/// # Example
///
/// ```rust
/// use pagepulse_core::Document;
///
/// let html = "<html><head><title>Pricing</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html);
/// assert_eq!(doc.title(), Some("Pricing".to_string()));
/// ```
pub struct Document {
    html: Html,
    base_url: Option<Url>,
}

impl Document {
    /// Parses HTML from a string.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html), base_url: None }
    }

    /// Parses HTML and records the URL it was fetched from.
    pub fn parse_with_url(html: &str, base_url: Url) -> Self {
        Self { html: Html::parse_document(html), base_url: Some(base_url) }
    }

    /// The URL this document was fetched from, if known.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`PagePulseError::HtmlParse`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel =
            Selector::parse(selector).map_err(|e| PagePulseError::HtmlParse(format!("invalid selector: {}", e)))?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Content of the `<title>` element, trimmed, if present and non-empty.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        let text: String = self.html.select(&selector).next()?.text().collect();
        let text = text.trim();
        if text.is_empty() { None } else { Some(text.to_string()) }
    }

    /// Content of a `<meta>` tag looked up by `name`, then by `property`.
    ///
    /// The `property` fallback covers Open Graph tags (`og:title`,
    /// `og:description`), which use `property` instead of `name`.
    pub fn meta_content(&self, attr: &str) -> Option<String> {
        for key in ["name", "property"] {
            let selector = format!("meta[{}=\"{}\"]", key, attr);
            if let Ok(elements) = self.select(&selector)
                && let Some(el) = elements.first()
                && let Some(content) = el.attr("content")
            {
                let content = content.trim();
                if !content.is_empty() {
                    return Some(content.to_string());
                }
            }
        }
        None
    }
}

/// A single element in the document tree.
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// All text under this element, scripts and styles included.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Text under this element with non-content subtrees skipped.
    ///
    /// Walks descendants and drops text nodes that sit under any tag in
    /// [`NON_CONTENT_TAGS`], so a `<nav>` buried inside `<main>` contributes
    /// nothing. Adjacent text nodes are joined with a space; callers
    /// normalize whitespace afterwards.
    pub fn content_text(&self) -> String {
        let mut out = String::new();
        for node in self.element.descendants() {
            let Some(text) = node.value().as_text() else { continue };
            let skipped = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .map(|e| NON_CONTENT_TAGS.contains(&e.name()))
                    .unwrap_or(false)
            });
            if !skipped {
                out.push_str(&text.text);
                out.push(' ');
            }
        }
        out
    }

    /// The value of an attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    /// Lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Selects descendant elements using a CSS selector.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel =
            Selector::parse(selector).map_err(|e| PagePulseError::HtmlParse(format!("invalid selector: {}", e)))?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <title>Landing Page</title>
            <meta name="description" content="A page description.">
            <meta property="og:title" content="OG Landing Page">
        </head>
        <body>
            <nav><a href="/pricing">Pricing</a></nav>
            <main>
                <h1>Grow faster</h1>
                <p class="lead">We help teams ship.</p>
                <script>var tracked = true;</script>
            </main>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_title() {
        let doc = Document::parse(SAMPLE_HTML);
        assert_eq!(doc.title(), Some("Landing Page".to_string()));
    }

    #[test]
    fn test_meta_content_by_name_and_property() {
        let doc = Document::parse(SAMPLE_HTML);
        assert_eq!(doc.meta_content("description"), Some("A page description.".to_string()));
        assert_eq!(doc.meta_content("og:title"), Some("OG Landing Page".to_string()));
        assert_eq!(doc.meta_content("missing"), None);
    }

    #[test]
    fn test_select_and_attrs() {
        let doc = Document::parse(SAMPLE_HTML);
        let links = doc.select("nav a").unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].attr("href"), Some("/pricing"));
        assert_eq!(links[0].text(), "Pricing");
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML);
        assert!(matches!(doc.select("[[bad"), Err(PagePulseError::HtmlParse(_))));
    }

    #[test]
    fn test_content_text_skips_scripts_and_nav() {
        let doc = Document::parse(SAMPLE_HTML);
        let body = doc.select("body").unwrap().into_iter().next().unwrap();
        let text = body.content_text();
        assert!(text.contains("Grow faster"));
        assert!(text.contains("We help teams ship."));
        assert!(!text.contains("tracked"));
        assert!(!text.contains("Pricing"));
    }

    #[test]
    fn test_parse_with_url_keeps_base() {
        let url = Url::parse("https://example.com/lp").unwrap();
        let doc = Document::parse_with_url(SAMPLE_HTML, url);
        assert_eq!(doc.base_url().unwrap().host_str(), Some("example.com"));
    }

    #[test]
    fn test_parse_never_fails_on_malformed_markup() {
        let doc = Document::parse("<div><p>unclosed");
        let divs = doc.select("div").unwrap();
        assert_eq!(divs.len(), 1);
    }
}
