use std::fmt;
use regex::{Regex, Captures};
use once_cell::sync::Lazy;
use log::debug;

use crate::errors::MarkupError;

// @module: Markup document processing and manipulation

// @const: <img> tag regex
static IMG_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<img\b[^>]*>").unwrap()
});

// @const: alt attribute regex (single or double quoted)
static ALT_ATTR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)\balt\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

// @const: src attribute regex (single or double quoted)
static SRC_ATTR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)\bsrc\s*=\s*(?:"[^"]*"|'[^']*')"#).unwrap()
});

// @const: markdown code fence wrapper around model output
static CODE_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A\s*```(?:html)?\s*\n(.*?)\n?```\s*\z").unwrap()
});

/// The HTML fragment produced by the text-generation service.
///
/// A transient value with no identity beyond a single pipeline run. It is
/// transformed three times: fence stripping on construction, alt-text
/// extraction, and src-attribute rewriting.
#[derive(Debug, Clone)]
pub struct MarkupDocument {
    // @field: Current HTML text
    html: String,
}

impl MarkupDocument {
    /// Wrap an already-clean HTML fragment
    pub fn new(html: impl Into<String>) -> Self {
        MarkupDocument { html: html.into() }
    }

    /// Build a document from raw model output.
    ///
    /// Models routinely wrap the fragment in a ```html fence even when asked
    /// not to; the fence is stripped here so downstream steps see plain HTML.
    pub fn from_generated(raw: &str) -> Self {
        let html = match CODE_FENCE_REGEX.captures(raw) {
            Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(raw),
            None => raw,
        };
        MarkupDocument {
            html: html.trim().to_string(),
        }
    }

    /// Current HTML text
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Whether the document contains no markup at all
    pub fn is_empty(&self) -> bool {
        self.html.trim().is_empty()
    }

    /// Number of `<img>` tags in the document
    pub fn image_count(&self) -> usize {
        IMG_TAG_REGEX.find_iter(&self.html).count()
    }

    /// Placeholder descriptions, i.e. the alt text of every `<img>` tag in
    /// document order. Tags without an alt attribute contribute an empty
    /// description so positions stay aligned with `apply_image_sources`.
    pub fn image_descriptions(&self) -> Vec<String> {
        IMG_TAG_REGEX
            .find_iter(&self.html)
            .map(|tag| {
                ALT_ATTR_REGEX
                    .captures(tag.as_str())
                    .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
                    .map(|m| decode_entities(m.as_str()))
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Rewrite `src` attributes to point at downloaded image files.
    ///
    /// `sources` must carry one entry per `<img>` tag, in document order.
    /// `None` entries leave their tag untouched (the image failed to
    /// generate and the page degrades gracefully). An empty slice is a no-op.
    /// Any other length difference is a hard error: positional pairing with
    /// mismatched counts would silently attach images to the wrong
    /// placeholders.
    pub fn apply_image_sources(&mut self, sources: &[Option<String>]) -> Result<(), MarkupError> {
        if sources.is_empty() {
            return Ok(());
        }

        let expected = self.image_count();
        if sources.len() != expected {
            return Err(MarkupError::PlaceholderMismatch {
                expected,
                actual: sources.len(),
            });
        }

        let mut index = 0;
        let rewritten = IMG_TAG_REGEX.replace_all(&self.html, |caps: &Captures| {
            let tag = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let replacement = match &sources[index] {
                Some(path) => rewrite_src(tag, path),
                None => tag.to_string(),
            };
            index += 1;
            replacement
        });

        self.html = rewritten.into_owned();
        debug!("Rewrote image sources for {} tag(s)", expected);
        Ok(())
    }
}

impl fmt::Display for MarkupDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.html)
    }
}

/// Set or insert the src attribute on a single `<img>` tag
fn rewrite_src(tag: &str, path: &str) -> String {
    let attr = format!("src=\"{}\"", path);
    if SRC_ATTR_REGEX.is_match(tag) {
        SRC_ATTR_REGEX.replace(tag, attr.as_str()).into_owned()
    } else {
        // No src attribute yet, insert one right after the tag name
        let mut out = String::with_capacity(tag.len() + attr.len() + 1);
        out.push_str("<img ");
        out.push_str(&attr);
        out.push_str(&tag[4..]);
        out
    }
}

/// Decode the handful of entities that matter in attribute values
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// An HTML page template with a designated content container.
///
/// The generated fragment is merged into the element carrying the configured
/// id; the insertion happens exactly once.
#[derive(Debug, Clone)]
pub struct PageTemplate {
    // @field: Template HTML text
    template: String,
}

impl PageTemplate {
    /// Fallback page template used when no template file is configured
    pub const DEFAULT: &'static str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Generated article</title>
</head>
<body>
<main id="content"></main>
</body>
</html>
"#;

    /// Create a template from HTML text
    pub fn new(template: impl Into<String>) -> Self {
        PageTemplate { template: template.into() }
    }

    /// Merge a fragment into the container with the given element id.
    ///
    /// Only the first matching container is filled; the fragment appears in
    /// the output exactly once.
    pub fn render(&self, fragment: &str, container_id: &str) -> Result<String, MarkupError> {
        // Opening tag of the container element, matched by its id attribute
        let pattern = format!(
            r#"(?is)<([a-z][a-z0-9]*)\b[^>]*\bid\s*=\s*["']{}["'][^>]*>"#,
            regex::escape(container_id)
        );
        let container_regex = Regex::new(&pattern)
            .map_err(|_| MarkupError::MissingContainer(container_id.to_string()))?;

        let caps = container_regex
            .captures(&self.template)
            .ok_or_else(|| MarkupError::MissingContainer(container_id.to_string()))?;

        let insert_at = caps.get(0).map(|m| m.end()).unwrap_or(0);

        let mut page = String::with_capacity(self.template.len() + fragment.len() + 1);
        page.push_str(&self.template[..insert_at]);
        page.push('\n');
        page.push_str(fragment);
        page.push_str(&self.template[insert_at..]);
        Ok(page)
    }
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAGMENT: &str = concat!(
        "<h1>Coastal Walks</h1>\n",
        "<p>Intro paragraph.</p>\n",
        "<img alt=\"a lighthouse at dawn\">\n",
        "<p>Middle paragraph.</p>\n",
        "<img src=\"placeholder.png\" alt=\"waves on a rocky shore\">\n"
    );

    #[test]
    fn test_fromGenerated_withCodeFence_stripsFence() {
        let raw = "```html\n<p>Hello</p>\n```";
        let doc = MarkupDocument::from_generated(raw);
        assert_eq!(doc.html(), "<p>Hello</p>");
    }

    #[test]
    fn test_fromGenerated_withBareFence_stripsFence() {
        let raw = "```\n<p>Hello</p>\n```\n";
        let doc = MarkupDocument::from_generated(raw);
        assert_eq!(doc.html(), "<p>Hello</p>");
    }

    #[test]
    fn test_fromGenerated_withPlainHtml_keepsContent() {
        let doc = MarkupDocument::from_generated("  <p>Hello</p>\n");
        assert_eq!(doc.html(), "<p>Hello</p>");
    }

    #[test]
    fn test_imageDescriptions_returnsAltTextInDocumentOrder() {
        let doc = MarkupDocument::new(FRAGMENT);
        assert_eq!(
            doc.image_descriptions(),
            vec![
                "a lighthouse at dawn".to_string(),
                "waves on a rocky shore".to_string()
            ]
        );
    }

    #[test]
    fn test_imageDescriptions_withSingleQuotesAndEntities_decodes() {
        let doc = MarkupDocument::new("<img alt='Tom &amp; Jerry&#39;s picnic'>");
        assert_eq!(doc.image_descriptions(), vec!["Tom & Jerry's picnic".to_string()]);
    }

    #[test]
    fn test_imageDescriptions_withMissingAlt_keepsPosition() {
        let doc = MarkupDocument::new("<img src=\"x.png\"><img alt=\"second\">");
        assert_eq!(doc.image_descriptions(), vec![String::new(), "second".to_string()]);
    }

    #[test]
    fn test_applyImageSources_withEmptyList_isNoOp() {
        let mut doc = MarkupDocument::new(FRAGMENT);
        doc.apply_image_sources(&[]).unwrap();
        assert_eq!(doc.html(), FRAGMENT);
    }

    #[test]
    fn test_applyImageSources_withMatchingCounts_rewritesPositionally() {
        let mut doc = MarkupDocument::new(FRAGMENT);
        doc.apply_image_sources(&[
            Some("images/a-lighthouse-at-dawn-1.png".to_string()),
            Some("images/waves-on-a-rocky-shore-2.png".to_string()),
        ])
        .unwrap();

        let html = doc.html();
        let first = html.find("a-lighthouse-at-dawn-1.png").unwrap();
        let second = html.find("waves-on-a-rocky-shore-2.png").unwrap();
        assert!(first < second);
        // The pre-existing placeholder src is gone
        assert!(!html.contains("placeholder.png"));
    }

    #[test]
    fn test_applyImageSources_withNoneEntry_leavesTagUntouched() {
        let mut doc = MarkupDocument::new(FRAGMENT);
        doc.apply_image_sources(&[
            None,
            Some("images/waves-on-a-rocky-shore-2.png".to_string()),
        ])
        .unwrap();

        let html = doc.html();
        assert!(html.contains("<img alt=\"a lighthouse at dawn\">"));
        assert!(html.contains("waves-on-a-rocky-shore-2.png"));
    }

    #[test]
    fn test_applyImageSources_withCountMismatch_returnsError() {
        let mut doc = MarkupDocument::new(FRAGMENT);
        let err = doc
            .apply_image_sources(&[Some("only-one.png".to_string())])
            .unwrap_err();

        match err {
            MarkupError::PlaceholderMismatch { expected, actual } => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected error: {}", other),
        }
        // The document is left unmodified on error
        assert_eq!(doc.html(), FRAGMENT);
    }

    #[test]
    fn test_applyImageSources_insertsSrcWhenAbsent() {
        let mut doc = MarkupDocument::new("<img alt=\"a red kite\">");
        doc.apply_image_sources(&[Some("kite.png".to_string())]).unwrap();
        assert!(doc.html().contains("src=\"kite.png\""));
        assert!(doc.html().contains("alt=\"a red kite\""));
    }

    #[test]
    fn test_render_placesFragmentInsideContainerExactlyOnce() {
        let template = PageTemplate::default();
        let page = template.render("<p>Body</p>", "content").unwrap();

        assert_eq!(page.matches("<p>Body</p>").count(), 1);
        let container = page.find("<main id=\"content\">").unwrap();
        let fragment = page.find("<p>Body</p>").unwrap();
        let close = page.find("</main>").unwrap();
        assert!(container < fragment && fragment < close);
    }

    #[test]
    fn test_render_withMissingContainer_returnsError() {
        let template = PageTemplate::new("<html><body><div id=\"other\"></div></body></html>");
        let err = template.render("<p>Body</p>", "content").unwrap_err();
        match err {
            MarkupError::MissingContainer(id) => assert_eq!(id, "content"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_render_fillsOnlyFirstMatchingContainer() {
        let template = PageTemplate::new(
            "<div id=\"content\"></div><div id=\"content\"></div>",
        );
        let page = template.render("<p>X</p>", "content").unwrap();
        assert_eq!(page.matches("<p>X</p>").count(), 1);
    }

    #[test]
    fn test_imageCount_countsTags() {
        let doc = MarkupDocument::new(FRAGMENT);
        assert_eq!(doc.image_count(), 2);
    }
}
