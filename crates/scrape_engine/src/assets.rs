//! Asset URL discovery by pattern scanning over raw page text.
//!
//! No DOM is built: every rule is a regex over the whole document and a URL
//! may be reported by several rules. Results are deduplicated on the resolved
//! URL.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

/// URL prefixes of asset CDNs; any literal occurrence in the page is taken as-is.
pub const CDN_URL_PREFIXES: &[&str] = &[
    "https://cdn.sanity.io/images/",
    "https://downloads.intercomcdn.com/",
    "https://files.buildwithfern.com/",
];

/// Host fragments that are trusted to serve images regardless of path.
const IMAGE_HOST_MARKERS: &[&str] = &["cdn.sanity.io", "intercomcdn"];

static IMG_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["']"#).expect("img regex"));

static SRCSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)srcset=["']([^"']+)["']"#).expect("srcset regex"));

/// Quote around a CSS `url()` value, literal or entity-escaped as it appears
/// inside a quoted `style` attribute.
const CSS_QUOTE: &str = r#"(?:&quot;|&#0*39;|&#x0*27;|["'])"#;

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"(?i)url\(\s*{CSS_QUOTE}?([^)"']+?){CSS_QUOTE}?\s*\)"#))
        .expect("css url regex")
});

static CDN_URL: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = CDN_URL_PREFIXES
        .iter()
        .map(|prefix| regex::escape(prefix))
        .collect::<Vec<_>>()
        .join("|");
    // A match ends at quotes, markup, whitespace or a closing paren.
    Regex::new(&format!(r#"(?:{alternatives})[^"'<>\s)]+"#)).expect("cdn regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// The value as it appeared in the page.
    pub source_url: String,
    pub resolved_url: String,
}

/// All candidate asset URLs on the page, resolved against `base_url`.
///
/// Unfiltered: combine with [`is_image_url`] to keep likely images only.
pub fn extract_asset_urls(html: &str, base_url: &str) -> BTreeSet<String> {
    extract_asset_references(html, base_url)
        .into_iter()
        .map(|r| r.resolved_url)
        .collect()
}

/// Like [`extract_asset_urls`] but keeps the raw value each URL came from.
/// Sorted by resolved URL; the first raw spelling seen wins.
pub fn extract_asset_references(html: &str, base_url: &str) -> Vec<AssetReference> {
    let base = Url::parse(base_url).ok();
    let mut seen = BTreeSet::new();
    let mut refs = Vec::new();
    let mut push = |raw: &str, resolved: Option<String>| {
        if let Some(resolved) = resolved {
            if seen.insert(resolved.clone()) {
                refs.push(AssetReference {
                    source_url: raw.to_string(),
                    resolved_url: resolved,
                });
            }
        }
    };

    for caps in IMG_SRC.captures_iter(html) {
        let raw = &caps[1];
        push(raw, resolve_url(raw, base.as_ref()));
    }

    for caps in SRCSET.captures_iter(html) {
        for raw in srcset_candidates(&caps[1]) {
            push(raw, resolve_url(raw, base.as_ref()));
        }
    }

    for caps in CSS_URL.captures_iter(html) {
        let raw = caps[1].trim();
        push(raw, resolve_url(raw, base.as_ref()));
    }

    for m in CDN_URL.find_iter(html) {
        push(m.as_str(), Some(unescape_entities(m.as_str())));
    }

    refs.sort_by(|a, b| a.resolved_url.cmp(&b.resolved_url));
    refs
}

/// Leading URL token of every comma-separated srcset entry; width and density
/// descriptors are dropped.
fn srcset_candidates(srcset: &str) -> impl Iterator<Item = &str> {
    srcset
        .split(',')
        .filter_map(|entry| entry.split_whitespace().next())
}

/// Heuristic allow-list: known image extension, "image" in the path, or a
/// trusted asset CDN. Nothing is fetched to check.
pub fn is_image_url(url: &str) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_ascii_lowercase(),
        Err(_) => url
            .split(&['?', '#'][..])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase(),
    };
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
        || path.contains("image")
        || IMAGE_HOST_MARKERS.iter().any(|marker| url.contains(marker))
}

/// Normalizes a raw reference:
/// - `//host/x` becomes `https://host/x`
/// - `/x` and scheme-less relative paths are joined onto `base`
/// - absolute URLs pass through unchanged
///
/// Fragments, `data:` and `javascript:` references resolve to nothing, as do
/// relative references when no base is known.
pub fn resolve_url(reference: &str, base: Option<&Url>) -> Option<String> {
    let trimmed = unescape_entities(reference.trim());
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("data:") || lower.starts_with("javascript:") {
        return None;
    }
    if let Some(rest) = trimmed.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(trimmed);
    }
    base.and_then(|base| base.join(&trimmed).ok())
        .map(String::from)
}

/// Decodes the entities that show up in attribute-embedded URLs. `&amp;` goes
/// last so `&amp;quot;` stays `&quot;`.
fn unescape_entities(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://frame.io/x").unwrap()
    }

    #[test]
    fn protocol_relative_is_promoted_to_https() {
        assert_eq!(
            resolve_url("//cdn.example.com/a.png", Some(&base())).as_deref(),
            Some("https://cdn.example.com/a.png")
        );
    }

    #[test]
    fn root_relative_uses_base_origin() {
        assert_eq!(
            resolve_url("/a.png", Some(&base())).as_deref(),
            Some("https://frame.io/a.png")
        );
    }

    #[test]
    fn plain_relative_joins_base_directory() {
        let base = Url::parse("https://frame.io/features/review").unwrap();
        assert_eq!(
            resolve_url("img/hero.jpg", Some(&base)).as_deref(),
            Some("https://frame.io/features/img/hero.jpg")
        );
    }

    #[test]
    fn unusable_references_are_dropped() {
        assert_eq!(resolve_url("  ", Some(&base())), None);
        assert_eq!(resolve_url("#top", Some(&base())), None);
        assert_eq!(resolve_url("data:image/png;base64,AAAA", Some(&base())), None);
        assert_eq!(resolve_url("relative.png", None), None);
    }

    #[test]
    fn srcset_descriptors_are_ignored() {
        let found: Vec<_> = srcset_candidates("/a.png 1x, /b.png 2x,, /c.png 640w").collect();
        assert_eq!(found, vec!["/a.png", "/b.png", "/c.png"]);
    }
}
