use std::sync::LazyLock;

use regex::Regex;

pub const UNTITLED: &str = "Untitled";
pub const DEFAULT_BODY_CLASS: &str = "article_body";

static H1_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>([^<]+)</h1>").expect("h1 regex"));

static ARTICLE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<article[^>]*>(.*?)</article>").expect("article regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDocument {
    pub title: String,
    /// Raw HTML; may be empty and is not guaranteed to be well formed.
    pub body_fragment: String,
}

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str) -> ArticleDocument;
}

/// Pattern-based article extractor:
/// - title is the first `<h1>` text, else [`UNTITLED`]
/// - body is the marker `<div>` that closes right before `</article>`
/// - otherwise the first `<article>` span
/// - otherwise empty.
#[derive(Debug, Clone)]
pub struct MarkerExtractor {
    body: Regex,
}

impl MarkerExtractor {
    /// `body_class` is matched as a substring of the div's class attribute.
    pub fn new(body_class: &str) -> Result<Self, regex::Error> {
        let pattern = format!(
            r#"(?is)<div[^>]*class="[^"]*{}[^"]*"[^>]*>(.*?)</div>\s*</div>\s*</article>"#,
            regex::escape(body_class)
        );
        Ok(Self {
            body: Regex::new(&pattern)?,
        })
    }
}

impl Default for MarkerExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_BODY_CLASS).expect("default body class is a literal")
    }
}

impl Extractor for MarkerExtractor {
    fn extract(&self, html: &str) -> ArticleDocument {
        let title = H1_TEXT
            .captures(html)
            .map(|caps| caps[1].trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        let body_fragment = self
            .body
            .captures(html)
            .or_else(|| ARTICLE_SPAN.captures(html))
            .map(|caps| caps[1].to_string())
            .unwrap_or_default();

        ArticleDocument {
            title,
            body_fragment,
        }
    }
}
