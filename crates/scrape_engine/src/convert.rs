//! HTML fragment to Markdown by ordered regex substitution.
//!
//! Each rule runs once over the whole text, in table order. Inline rules only
//! match tags whose content has no further markup (`[^<]*`), so nested
//! structures come out partly converted and then flattened by the final tag
//! strip. Output never contains a tag.

use std::sync::LazyLock;

use regex::Regex;

pub trait Converter: Send + Sync {
    fn to_markdown(&self, html: &str) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RegexMarkdownConverter;

impl Converter for RegexMarkdownConverter {
    fn to_markdown(&self, html: &str) -> String {
        to_markdown(html)
    }
}

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

/// Opening tag `name` with optional attributes, not matching longer names
/// (`<b>` must not match `<br>` or `<body>`).
fn open(name: &str) -> String {
    format!(r"<(?:{name})(?:\s[^>]*)?>")
}

fn rule(pattern: &str, replacement: &'static str) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("markdown rule regex"),
        replacement,
    }
}

fn inline(name: &str, replacement: &'static str) -> Rule {
    rule(
        &format!(r"(?i){}([^<]*)</(?:{name})\s*>", open(name)),
        replacement,
    )
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(r"(?is)<script(?:\s[^>]*)?>.*?</script\s*>", ""),
        rule(r"(?is)<style(?:\s[^>]*)?>.*?</style\s*>", ""),
        inline("h1", "\n# ${1}\n\n"),
        inline("h2", "\n## ${1}\n\n"),
        inline("h3", "\n### ${1}\n\n"),
        inline("h4", "\n#### ${1}\n\n"),
        inline("p", "${1}\n\n"),
        rule(
            r#"(?i)<a\s[^>]*href="([^"]*)"[^>]*>([^<]*)</a\s*>"#,
            "[${2}](${1})",
        ),
        inline("strong|b", "**${1}**"),
        inline("em|i", "*${1}*"),
        inline("li", "- ${1}\n"),
        rule(&format!("(?i){}", open("ul|ol")), ""),
        rule(r"(?i)</(?:ul|ol)\s*>", "\n"),
        inline("code", "`${1}`"),
        inline("pre", "```\n${1}\n```"),
        rule(r"(?i)<br\s*/?>", "\n"),
        rule(r"<[^>]+>", ""),
        rule(r"\n{3,}", "\n\n"),
        rule(r" {2,}", " "),
    ]
});

/// Converts an article body fragment to Markdown. Pure and deterministic.
pub fn to_markdown(html: &str) -> String {
    let mut text = html.to_string();
    for rule in RULES.iter() {
        text = rule
            .pattern
            .replace_all(&text, rule.replacement)
            .into_owned();
    }
    text.trim().to_string()
}
