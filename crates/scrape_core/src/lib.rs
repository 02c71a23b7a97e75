//! Scrape core: pure job planning and run bookkeeping, no IO.
mod jobs;
mod report;

pub use jobs::{
    article_url, plan_article_jobs, plan_image_jobs, plan_page_jobs, ArticleJob, ImageJob,
    PageJob,
};
pub use report::{CategoryTally, FailedItem, ItemResult, RunReport};
