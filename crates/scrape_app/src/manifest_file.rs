//! RON run manifest: what to fetch, grouped by output category, plus optional
//! overrides of the engine defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use engine_logging::engine_info;
use scrape_engine::{
    FetchSettings, MarkerExtractor, PipelineSettings, DEFAULT_BODY_CLASS,
    DEFAULT_MANIFEST_FILENAME,
};
use serde::Deserialize;

use crate::run::Flow;

pub const DEFAULT_ARTICLE_BASE_URL: &str = "https://help.frame.io/en/articles/";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunManifest {
    pub user_agent: Option<String>,
    /// Applies to both page and asset requests.
    pub timeout_secs: Option<u64>,
    pub article_delay_ms: Option<u64>,
    pub article_base_url: Option<String>,
    pub body_class: Option<String>,
    pub attribution: Option<String>,
    pub manifest_filename: Option<String>,

    pub images: Vec<ImageGroup>,
    pub pages: Vec<PageGroup>,
    pub articles: Vec<ArticleGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageGroup {
    pub category: String,
    pub urls: Vec<String>,
}

/// `(page url, page name)` pairs.
#[derive(Debug, Clone, Deserialize)]
pub struct PageGroup {
    pub category: String,
    pub pages: Vec<(String, String)>,
}

/// `(slug, title)` pairs.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleGroup {
    pub category: String,
    pub entries: Vec<(String, String)>,
}

pub fn load(path: &Path) -> anyhow::Result<RunManifest> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading run manifest {}", path.display()))?;
    let manifest = parse(&text).with_context(|| format!("in run manifest {}", path.display()))?;
    engine_info!(
        "Loaded run manifest {:?}: {} image groups, {} page groups, {} article groups",
        path,
        manifest.images.len(),
        manifest.pages.len(),
        manifest.articles.len()
    );
    Ok(manifest)
}

pub fn parse(text: &str) -> anyhow::Result<RunManifest> {
    let manifest: RunManifest = ron::from_str(text).context("invalid RON")?;
    manifest.validate()?;
    Ok(manifest)
}

impl RunManifest {
    /// Categories become directory names under the output root.
    fn validate(&self) -> anyhow::Result<()> {
        let categories = self
            .images
            .iter()
            .map(|g| &g.category)
            .chain(self.pages.iter().map(|g| &g.category))
            .chain(self.articles.iter().map(|g| &g.category));
        for category in categories {
            if category.trim().is_empty() {
                bail!("category names must not be empty");
            }
            if category.contains(&['/', '\\'][..]) || category == "." || category == ".." {
                bail!("category {category:?} is not a plain directory name");
            }
        }
        Ok(())
    }

    pub fn item_count(&self, flow: Flow) -> usize {
        match flow {
            Flow::Images => self.images.iter().map(|g| g.urls.len()).sum(),
            Flow::Pages => self.pages.iter().map(|g| g.pages.len()).sum(),
            Flow::Articles => self.articles.iter().map(|g| g.entries.len()).sum(),
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        let mut settings = FetchSettings::default();
        if let Some(user_agent) = &self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(secs) = self.timeout_secs {
            settings.asset_timeout = Duration::from_secs(secs);
            settings.page_timeout = Duration::from_secs(secs);
        }
        settings
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        let mut settings = PipelineSettings::default();
        if let Some(ms) = self.article_delay_ms {
            settings.article_delay = Duration::from_millis(ms);
        }
        if let Some(attribution) = &self.attribution {
            settings.attribution = attribution.clone();
        }
        settings
    }

    pub fn extractor(&self) -> anyhow::Result<MarkerExtractor> {
        let class = self.body_class.as_deref().unwrap_or(DEFAULT_BODY_CLASS);
        MarkerExtractor::new(class).with_context(|| format!("body class {class:?}"))
    }

    pub fn article_base_url(&self) -> &str {
        self.article_base_url
            .as_deref()
            .unwrap_or(DEFAULT_ARTICLE_BASE_URL)
    }

    pub fn manifest_filename(&self) -> &str {
        self.manifest_filename
            .as_deref()
            .unwrap_or(DEFAULT_MANIFEST_FILENAME)
    }
}
