//! Drives one flow over the run manifest and folds every item into a
//! [`RunReport`].

use std::fmt;
use std::path::Path;

use anyhow::Context;
use engine_logging::{engine_info, engine_warn};
use scrape_core::{
    article_url, plan_article_jobs, plan_image_jobs, plan_page_jobs, ItemResult, RunReport,
};
use scrape_engine::{
    article_filename, write_manifest, FileWriter, ItemOutcome, ManifestEntry, Pipeline,
    ProgressSink,
};

use crate::console;
use crate::manifest_file::RunManifest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Images,
    Pages,
    Articles,
}

impl Flow {
    pub fn title(self) -> &'static str {
        match self {
            Flow::Images => "Image Downloader",
            Flow::Pages => "Page Image Scraper",
            Flow::Articles => "Help Article Downloader",
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Flow::Images => "images",
            Flow::Pages => "pages",
            Flow::Articles => "articles",
        };
        f.write_str(name)
    }
}

/// Runs `flow` to completion. Item failures land in the report; only a
/// failure to write the page manifest is returned as an error.
pub async fn execute(
    flow: Flow,
    pipeline: &Pipeline,
    manifest: &RunManifest,
    output: &Path,
    sink: &dyn ProgressSink,
) -> anyhow::Result<RunReport> {
    match flow {
        Flow::Images => Ok(run_images(pipeline, manifest, output, sink).await),
        Flow::Articles => Ok(run_articles(pipeline, manifest, output, sink).await),
        Flow::Pages => {
            let (report, entries) = run_pages(pipeline, manifest, output, sink).await;
            let path = write_manifest(output, manifest.manifest_filename(), &entries)
                .context("writing page manifest")?;
            engine_info!("Wrote {} manifest entries to {:?}", entries.len(), path);
            println!("\nManifest saved to: {}", path.display());
            Ok(report)
        }
    }
}

pub async fn run_images(
    pipeline: &Pipeline,
    manifest: &RunManifest,
    output: &Path,
    sink: &dyn ProgressSink,
) -> RunReport {
    let mut report = RunReport::new();
    for group in &manifest.images {
        let jobs = plan_image_jobs([(group.category.as_str(), group.urls.as_slice())]);
        report.begin_category(&group.category);
        console::section(&group.category, jobs.len());

        let writer = FileWriter::new(output.join(&group.category));
        for job in jobs {
            let item = pipeline
                .download_image(&job.url, job.sequence, &writer, sink)
                .await;
            report.record(&job.category, &job.url, map_outcome(&item.outcome));
        }
    }
    report
}

/// Returns the report and the listing of every image now on disk, with
/// filenames relative to `output`.
pub async fn run_pages(
    pipeline: &Pipeline,
    manifest: &RunManifest,
    output: &Path,
    sink: &dyn ProgressSink,
) -> (RunReport, Vec<ManifestEntry>) {
    let mut report = RunReport::new();
    let mut entries = Vec::new();
    for group in &manifest.pages {
        let jobs = plan_page_jobs([(group.category.as_str(), group.pages.as_slice())]);
        report.begin_category(&group.category);
        console::section(&group.category, jobs.len());

        let writer = FileWriter::new(output.join(&group.category));
        for job in jobs {
            let page = pipeline
                .scrape_page(&job.url, &job.name, &writer, sink)
                .await;
            if let Some(reason) = page.page_error {
                println!("  ✗ {}: {}", job.url, reason);
                report.record(&job.category, &job.url, ItemResult::Failed { reason });
                continue;
            }
            for item in &page.items {
                report.record(&job.category, &item.url, map_outcome(&item.outcome));
            }
            entries.extend(page.manifest_entries.into_iter().map(|entry| ManifestEntry {
                filename: format!("{}/{}", job.category, entry.filename),
                ..entry
            }));
        }
    }
    (report, entries)
}

pub async fn run_articles(
    pipeline: &Pipeline,
    manifest: &RunManifest,
    output: &Path,
    sink: &dyn ProgressSink,
) -> RunReport {
    let mut report = RunReport::new();
    for group in &manifest.articles {
        let jobs = plan_article_jobs([(group.category.as_str(), group.entries.as_slice())]);
        report.begin_category(&group.category);
        console::section(&group.category, jobs.len());

        let writer = FileWriter::new(output.join(&group.category));
        for job in jobs {
            let url = match article_url(manifest.article_base_url(), &job.slug) {
                Ok(url) => url,
                Err(err) => {
                    engine_warn!("Cannot build article url for {}: {}", job.slug, err);
                    let reason = format!("invalid article url: {err}");
                    report.record(&job.category, &job.title, ItemResult::Failed { reason });
                    continue;
                }
            };
            let filename = article_filename(&job.slug, &job.title);
            let item = pipeline
                .save_article(&url, &job.category, &filename, &writer, sink)
                .await;
            let label = if job.title.is_empty() { &url } else { &job.title };
            report.record(&job.category, label, map_outcome(&item.outcome));
        }
    }
    report
}

fn map_outcome(outcome: &ItemOutcome) -> ItemResult {
    match outcome {
        ItemOutcome::Saved(_) => ItemResult::Saved,
        ItemOutcome::Skipped(_) => ItemResult::Skipped,
        ItemOutcome::Failed(reason) => ItemResult::Failed {
            reason: reason.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use scrape_engine::{FetchSettings, NullSink, PipelineSettings, ReqwestFetcher};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::manifest_file::{ArticleGroup, ImageGroup, PageGroup};

    fn pipeline() -> Pipeline {
        pipeline_with(FetchSettings::default())
    }

    fn pipeline_with(settings: FetchSettings) -> Pipeline {
        let fetcher = ReqwestFetcher::new(settings).unwrap();
        Pipeline::new(
            Arc::new(fetcher),
            PipelineSettings {
                article_delay: Duration::ZERO,
                ..PipelineSettings::default()
            },
        )
    }

    async fn serve(server: &MockServer, at: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn image_failures_are_counted_once() {
        let server = MockServer::start().await;
        serve(&server, "/a.png", 200, "A").await;
        serve(&server, "/b.png", 404, "").await;

        let manifest = RunManifest {
            images: vec![ImageGroup {
                category: "main".into(),
                urls: vec![
                    format!("{}/a.png", server.uri()),
                    format!("{}/b.png", server.uri()),
                ],
            }],
            ..RunManifest::default()
        };
        let temp = TempDir::new().unwrap();

        let report = run_images(&pipeline(), &manifest, temp.path(), &NullSink).await;

        let totals = report.totals();
        assert_eq!((totals.attempted, totals.saved, totals.failed), (2, 1, 1));
        assert!(temp.path().join("main").join("000_a.png").is_file());
        assert!(!temp.path().join("main").join("001_b.png").exists());
    }

    #[tokio::test]
    async fn timed_out_image_is_one_failure_and_the_run_goes_on() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;
        serve(&server, "/next.png", 200, "N").await;

        let manifest = RunManifest {
            images: vec![ImageGroup {
                category: "main".into(),
                urls: vec![
                    format!("{}/slow.png", server.uri()),
                    format!("{}/next.png", server.uri()),
                ],
            }],
            ..RunManifest::default()
        };
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline_with(FetchSettings {
            asset_timeout: Duration::from_millis(100),
            ..FetchSettings::default()
        });

        let report = run_images(&pipeline, &manifest, temp.path(), &NullSink).await;

        let totals = report.totals();
        assert_eq!((totals.attempted, totals.saved, totals.failed), (2, 1, 1));
        assert!(report.failures()[0].reason.contains("timeout"), "{:?}", report.failures());
        assert!(!temp.path().join("main").join("000_slow.png").exists());
        assert!(temp.path().join("main").join("001_next.png").is_file());
    }

    #[tokio::test]
    async fn unwritable_category_fails_its_items_only() {
        let server = MockServer::start().await;
        serve(&server, "/a.png", 200, "A").await;

        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("blocked"), "not a directory").unwrap();
        let url = format!("{}/a.png", server.uri());
        let manifest = RunManifest {
            images: vec![
                ImageGroup {
                    category: "blocked".into(),
                    urls: vec![url.clone()],
                },
                ImageGroup {
                    category: "open".into(),
                    urls: vec![url],
                },
            ],
            ..RunManifest::default()
        };

        let report = run_images(&pipeline(), &manifest, temp.path(), &NullSink).await;

        let blocked = &report.categories()[0];
        assert_eq!((blocked.attempted, blocked.failed), (1, 1));
        assert!(report.failures()[0].reason.contains("save failed"));
        let open = &report.categories()[1];
        assert_eq!((open.attempted, open.saved), (1, 1));
        assert!(temp.path().join("open").join("000_a.png").is_file());
    }

    #[tokio::test]
    async fn page_manifest_paths_are_relative_to_output() {
        let server = MockServer::start().await;
        serve(&server, "/home", 200, r#"<img src="/shot.png">"#).await;
        serve(&server, "/shot.png", 200, "PNG").await;
        serve(&server, "/down", 503, "").await;

        let manifest = RunManifest {
            pages: vec![PageGroup {
                category: "main".into(),
                pages: vec![
                    (format!("{}/home", server.uri()), "home".into()),
                    (format!("{}/down", server.uri()), "down".into()),
                ],
            }],
            ..RunManifest::default()
        };
        let temp = TempDir::new().unwrap();

        let report = execute(Flow::Pages, &pipeline(), &manifest, temp.path(), &NullSink)
            .await
            .unwrap();

        assert_eq!(report.totals().saved, 1);
        assert_eq!(report.failures().len(), 1);
        let listing = std::fs::read_to_string(temp.path().join("manifest.json")).unwrap();
        let entries: Vec<ManifestEntry> = serde_json::from_str(&listing).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].filename.starts_with("main/shot_"));
        assert!(temp.path().join(&entries[0].filename).is_file());
    }

    #[tokio::test]
    async fn articles_are_named_from_slug_and_title() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/en/articles/9090632-welcome-to-frame-io",
            200,
            "<h1>Welcome</h1><article><p>Hi</p></article>",
        )
        .await;

        let manifest = RunManifest {
            article_base_url: Some(format!("{}/en/articles", server.uri())),
            articles: vec![ArticleGroup {
                category: "getting-started".into(),
                entries: vec![(
                    "9090632-welcome-to-frame-io".into(),
                    "Welcome to Frame.io!".into(),
                )],
            }],
            ..RunManifest::default()
        };
        let temp = TempDir::new().unwrap();

        let report = run_articles(&pipeline(), &manifest, temp.path(), &NullSink).await;

        assert_eq!(report.totals().saved, 1);
        let saved = temp
            .path()
            .join("getting-started")
            .join("9090632_welcome-to-frameio.md");
        let markdown = std::fs::read_to_string(saved).unwrap();
        assert!(markdown.starts_with("# Welcome\n"));
        assert!(markdown.contains("> Category: getting-started"));
    }

    #[test]
    fn skipped_counts_as_success() {
        let skipped = map_outcome(&ItemOutcome::Skipped("x".into()));
        assert_eq!(skipped, ItemResult::Skipped);
    }
}
