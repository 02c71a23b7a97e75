//! Sequential scrape pipeline: fetch, extract, convert, name, write.
//!
//! One item is fully processed before the next starts. Every per-item error is
//! caught here, logged and returned as [`ItemOutcome::Failed`]; nothing short
//! of a panic stops a run.

use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::assets::{extract_asset_references, is_image_url};
use crate::convert::{Converter, RegexMarkdownConverter};
use crate::decode::decode_page;
use crate::document::{MarkdownDocument, DEFAULT_ATTRIBUTION};
use crate::extract::{Extractor, MarkerExtractor, UNTITLED};
use crate::fetch::{Fetcher, RequestKind};
use crate::filename::{asset_filename, Disambiguator};
use crate::manifest::ManifestEntry;
use crate::persist::{FileWriter, PersistError, WriteOutcome};
use crate::{EngineEvent, FetchError, ItemOutcome, ItemReport};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Sink for callers that only want the returned reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: EngineEvent) {}
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Pause after every article fetch.
    pub article_delay: Duration,
    /// Footer line of saved articles.
    pub attribution: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            article_delay: Duration::from_millis(200),
            attribution: DEFAULT_ATTRIBUTION.to_string(),
        }
    }
}

/// Result of scanning one page for images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub page: String,
    pub url: String,
    /// Set when the page itself could not be fetched; `items` is then empty.
    pub page_error: Option<String>,
    /// Image URLs kept after filtering.
    pub found: usize,
    pub items: Vec<ItemReport>,
    /// Artifacts now on disk for this page, written or already present.
    pub manifest_entries: Vec<ManifestEntry>,
}

#[derive(Debug, thiserror::Error)]
enum ItemError {
    #[error("{0}")]
    Fetch(#[from] FetchError),
    #[error("save failed: {0}")]
    Persist(#[from] PersistError),
}

pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    extractor: Box<dyn Extractor>,
    converter: Box<dyn Converter>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: PipelineSettings) -> Self {
        Self {
            fetcher,
            extractor: Box::new(MarkerExtractor::default()),
            converter: Box::new(RegexMarkdownConverter),
            settings,
        }
    }

    pub fn with_extractor(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn with_converter(mut self, converter: impl Converter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    /// Downloads one listed image as `NNN_<name>` into the writer's directory.
    pub async fn download_image(
        &self,
        url: &str,
        sequence: usize,
        writer: &FileWriter,
        sink: &dyn ProgressSink,
    ) -> ItemReport {
        let filename = asset_filename(url, Disambiguator::Sequence(sequence));
        let outcome = self.fetch_and_store(url, &filename, writer).await;
        finish(sink, url, outcome)
    }

    /// Fetches a page, collects the image URLs it references and downloads each
    /// as `<stem>_<hash><ext>`.
    pub async fn scrape_page(
        &self,
        page_url: &str,
        page_name: &str,
        writer: &FileWriter,
        sink: &dyn ProgressSink,
    ) -> PageReport {
        let mut report = PageReport {
            page: page_name.to_string(),
            url: page_url.to_string(),
            page_error: None,
            found: 0,
            items: Vec::new(),
            manifest_entries: Vec::new(),
        };

        let page = match self.fetcher.fetch(page_url, RequestKind::Page).await {
            Ok(page) => page,
            Err(err) => {
                engine_warn!("Page {} ({}) failed: {}", page_name, page_url, err);
                report.page_error = Some(err.to_string());
                return report;
            }
        };
        let decoded = decode_page(&page.bytes, page.metadata.content_type.as_deref());
        if decoded.lossy {
            engine_debug!("Page {} had undecodable bytes ({})", page_name, decoded.encoding_label);
        }

        let image_urls: Vec<String> =
            extract_asset_references(&decoded.html, &page.metadata.final_url)
                .into_iter()
                .map(|r| r.resolved_url)
                .filter(|url| is_image_url(url))
                .collect();
        report.found = image_urls.len();
        engine_info!("Page {}: {} images", page_name, report.found);
        sink.emit(EngineEvent::PageScanned {
            page: page_name.to_string(),
            found: report.found,
        });

        for image_url in image_urls {
            let filename = asset_filename(&image_url, Disambiguator::UrlHash);
            let outcome = self.fetch_and_store(&image_url, &filename, writer).await;
            if outcome.is_success() {
                report.manifest_entries.push(ManifestEntry {
                    url: image_url.clone(),
                    filename,
                    page: page_name.to_string(),
                });
            }
            report.items.push(finish(sink, &image_url, outcome));
        }
        report
    }

    /// Fetches a help article and saves it as Markdown under `filename`.
    /// An existing file short-circuits before any network traffic.
    pub async fn save_article(
        &self,
        url: &str,
        category: &str,
        filename: &str,
        writer: &FileWriter,
        sink: &dyn ProgressSink,
    ) -> ItemReport {
        if let Some(path) = writer.existing(filename) {
            return finish(sink, url, ItemOutcome::Skipped(path));
        }

        let fetched = self.fetcher.fetch(url, RequestKind::Page).await;
        tokio::time::sleep(self.settings.article_delay).await;

        let outcome = match fetched {
            Ok(page) => {
                let decoded = decode_page(&page.bytes, page.metadata.content_type.as_deref());
                let markdown = self.render_article(&decoded.html, url, category);
                store(writer, filename, markdown.as_bytes())
            }
            Err(err) => Err(err.into()),
        };
        finish(sink, url, into_outcome(outcome))
    }

    fn render_article(&self, html: &str, url: &str, category: &str) -> String {
        let article = self.extractor.extract(html);
        if article.title == UNTITLED {
            engine_debug!("No title heading found in {}", url);
        }
        if article.body_fragment.is_empty() {
            engine_debug!("No article body found in {}", url);
        }

        let document =
            MarkdownDocument::new(&article.title, url, category, &self.settings.attribution);
        let body = self.converter.to_markdown(&article.body_fragment);
        document.with_body(body).render()
    }

    async fn fetch_and_store(&self, url: &str, filename: &str, writer: &FileWriter) -> ItemOutcome {
        if let Some(path) = writer.existing(filename) {
            return ItemOutcome::Skipped(path);
        }
        let result = match self.fetcher.fetch(url, RequestKind::Asset).await {
            Ok(output) => store(writer, filename, &output.bytes),
            Err(err) => Err(err.into()),
        };
        into_outcome(result)
    }
}

fn store(writer: &FileWriter, filename: &str, content: &[u8]) -> Result<WriteOutcome, ItemError> {
    Ok(writer.write_new(filename, content)?)
}

fn into_outcome(result: Result<WriteOutcome, ItemError>) -> ItemOutcome {
    match result {
        Ok(WriteOutcome::Written(path)) => ItemOutcome::Saved(path),
        Ok(WriteOutcome::AlreadyExists(path)) => ItemOutcome::Skipped(path),
        Err(err) => ItemOutcome::Failed(err.to_string()),
    }
}

fn finish(sink: &dyn ProgressSink, url: &str, outcome: ItemOutcome) -> ItemReport {
    match &outcome {
        ItemOutcome::Saved(path) => engine_info!("Saved {} -> {:?}", url, path),
        ItemOutcome::Skipped(path) => engine_debug!("Exists {:?}, skipping {}", path, url),
        ItemOutcome::Failed(reason) => engine_warn!("Failed {}: {}", url, reason),
    }
    let report = ItemReport {
        url: url.to_string(),
        outcome,
    };
    sink.emit(EngineEvent::ItemFinished(report.clone()));
    report
}
