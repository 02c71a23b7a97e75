//! Scrape engine: fetching, pattern-based extraction, Markdown conversion and
//! write-once persistence, driven one item at a time by [`Pipeline`].
mod assets;
mod convert;
mod decode;
mod document;
mod extract;
mod fetch;
mod filename;
mod manifest;
mod persist;
mod pipeline;
mod types;

pub use assets::{
    extract_asset_references, extract_asset_urls, is_image_url, resolve_url, AssetReference,
    CDN_URL_PREFIXES, IMAGE_EXTENSIONS,
};
pub use convert::{to_markdown, Converter, RegexMarkdownConverter};
pub use decode::{decode_page, DecodedPage};
pub use document::{MarkdownDocument, DEFAULT_ATTRIBUTION};
pub use extract::{ArticleDocument, Extractor, MarkerExtractor, DEFAULT_BODY_CLASS, UNTITLED};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, RequestKind, DEFAULT_USER_AGENT};
pub use filename::{article_filename, asset_filename, sanitize, slugify, Disambiguator};
pub use manifest::{write_manifest, ManifestEntry, ManifestError, DEFAULT_MANIFEST_FILENAME};
pub use persist::{ensure_output_dir, AtomicFileWriter, FileWriter, PersistError, WriteOutcome};
pub use pipeline::{NullSink, PageReport, Pipeline, PipelineSettings, ProgressSink};
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, ItemOutcome, ItemReport,
};
