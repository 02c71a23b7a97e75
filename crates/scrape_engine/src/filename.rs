use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

/// Upper bound for an asset filename, extension included.
pub const MAX_ASSET_NAME_LEN: usize = 80;
/// Upper bound for the slug part of an article filename.
pub const MAX_SLUG_LEN: usize = 60;
pub const DEFAULT_EXTENSION: &str = ".png";

const KNOWN_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("non-word regex"));
static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("separator regex"));

/// How two artifacts with the same base name are kept apart on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disambiguator {
    None,
    /// `NNN_` prefix, zero padded to three digits.
    Sequence(usize),
    /// `_xxxxxxxx` suffix before the extension, from the source URL.
    UrlHash,
}

/// Filesystem-safe name from a URL or bare filename.
///
/// Keeps only the last path segment without query or fragment, maps every
/// char outside `[A-Za-z0-9_.-]` to `_`, bounds the length while keeping a
/// known image extension, and appends `.png` when none is present.
/// Applying it to its own output changes nothing.
pub fn sanitize(url_or_name: &str) -> String {
    let without_query = url_or_name
        .split(&['?', '#'][..])
        .next()
        .unwrap_or_default();
    let segment = without_query.rsplit('/').next().unwrap_or_default();
    let safe = replace_unsafe(segment);

    let (stem, ext) = match known_extension(&safe) {
        Some(ext) => (&safe[..safe.len() - ext.len()], &safe[safe.len() - ext.len()..]),
        None => (safe.as_str(), DEFAULT_EXTENSION),
    };
    let mut stem = stem.to_string();
    if stem.is_empty() {
        stem = "image".to_string();
    }
    stem.truncate(MAX_ASSET_NAME_LEN - ext.len());
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    format!("{stem}{ext}")
}

/// [`sanitize`] plus collision avoidance.
pub fn asset_filename(url: &str, disambiguator: Disambiguator) -> String {
    let name = sanitize(url);
    match disambiguator {
        Disambiguator::None => name,
        Disambiguator::Sequence(n) => {
            let prefix = format!("{n:03}_");
            let (stem, ext) = split_extension(&name);
            let keep = stem.len().min(MAX_ASSET_NAME_LEN.saturating_sub(ext.len() + prefix.len()));
            format!("{prefix}{}{ext}", &stem[..keep])
        }
        Disambiguator::UrlHash => {
            let hash = short_hash(url);
            let (stem, ext) = split_extension(&name);
            let keep = stem.len().min(MAX_ASSET_NAME_LEN - ext.len() - hash.len() - 1);
            format!("{}_{hash}{ext}", &stem[..keep])
        }
    }
}

/// Splits a sanitized name into stem and recognized extension. The stem is
/// ASCII, so any byte index is a char boundary.
fn split_extension(name: &str) -> (&str, &str) {
    let ext_len = known_extension(name).map_or(0, str::len);
    name.split_at(name.len() - ext_len)
}

/// Lowercase hyphenated slug of a title, restricted to the safe char set.
pub fn slugify(title: &str) -> String {
    let cleaned = NON_WORD.replace_all(title, "");
    let hyphenated = SEPARATOR_RUN.replace_all(cleaned.trim(), "-");
    let mut slug = replace_unsafe(&hyphenated.to_lowercase());
    slug.truncate(MAX_SLUG_LEN);
    slug
}

/// `{numeric id}_{slug}.md`, where the id is the slug's leading token.
pub fn article_filename(slug: &str, title: &str) -> String {
    let id = replace_unsafe(slug.split('-').next().unwrap_or_default());
    let title_slug = slugify(title);
    match (id.is_empty(), title_slug.is_empty()) {
        (false, false) => format!("{id}_{title_slug}.md"),
        (false, true) => format!("{id}.md"),
        (true, false) => format!("{title_slug}.md"),
        (true, true) => "untitled.md".to_string(),
    }
}

fn replace_unsafe(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn known_extension(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    KNOWN_EXTENSIONS
        .iter()
        .copied()
        .find(|ext| lower.len() > ext.len() && lower.ends_with(ext))
}

fn is_reserved_windows_name(stem: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(stem))
}

/// First 4 bytes of SHA-256 as hex. 32 bits: collisions are unlikely at
/// scraping volumes but not impossible.
fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
