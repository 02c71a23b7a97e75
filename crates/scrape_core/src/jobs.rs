use url::Url;

/// One image to download directly; `sequence` is its position inside the category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    pub category: String,
    pub sequence: usize,
    pub url: String,
}

/// One page to scan for images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageJob {
    pub category: String,
    pub url: String,
    pub name: String,
}

/// One help article, addressed by its slug under the article base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleJob {
    pub category: String,
    pub slug: String,
    pub title: String,
}

/// Flattens `(category, urls)` groups into jobs, numbering from zero per category.
pub fn plan_image_jobs<'a, I>(groups: I) -> Vec<ImageJob>
where
    I: IntoIterator<Item = (&'a str, &'a [String])>,
{
    let mut jobs = Vec::new();
    for (category, urls) in groups {
        for (sequence, url) in urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()).enumerate() {
            jobs.push(ImageJob {
                category: category.to_string(),
                sequence,
                url: url.to_string(),
            });
        }
    }
    jobs
}

pub fn plan_page_jobs<'a, I>(groups: I) -> Vec<PageJob>
where
    I: IntoIterator<Item = (&'a str, &'a [(String, String)])>,
{
    groups
        .into_iter()
        .flat_map(|(category, pages)| {
            pages.iter().map(move |(url, name)| PageJob {
                category: category.to_string(),
                url: url.trim().to_string(),
                name: name.trim().to_string(),
            })
        })
        .filter(|job| !job.url.is_empty())
        .collect()
}

pub fn plan_article_jobs<'a, I>(groups: I) -> Vec<ArticleJob>
where
    I: IntoIterator<Item = (&'a str, &'a [(String, String)])>,
{
    groups
        .into_iter()
        .flat_map(|(category, entries)| {
            entries.iter().map(move |(slug, title)| ArticleJob {
                category: category.to_string(),
                slug: slug.trim().trim_matches('/').to_string(),
                title: title.trim().to_string(),
            })
        })
        .filter(|job| !job.slug.is_empty())
        .collect()
}

/// Builds the article URL for `slug`. The base is treated as a directory even
/// when it lacks a trailing slash.
pub fn article_url(base: &str, slug: &str) -> Result<String, url::ParseError> {
    let base = base.trim();
    let base = if base.ends_with('/') {
        Url::parse(base)?
    } else {
        Url::parse(&format!("{base}/"))?
    };
    Ok(base.join(slug.trim_start_matches('/'))?.to_string())
}
