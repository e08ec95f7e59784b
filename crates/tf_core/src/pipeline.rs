//! Fetch, extract, analyze, persist.
//!
//! Fetch and extraction failures end the run with `success = false`. An
//! unavailable analysis still yields `success = true` with `analysis` left
//! empty. Only successful runs are written to the cache.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::freshness::{CacheDecision, FreshnessPolicy};
use crate::models::TextAnalyzer;
use crate::scraping::{ArticleExtractor, PageFetcher};
use crate::storage::ResultCache;
use crate::types::{format_timestamp, AnalysisRequest, AnalysisResult, CacheEntry, TextAnalysis};

pub const DOWNLOAD_FAILED: &str = "Failed to download webpage";
pub const EXTRACTION_FAILED: &str = "Failed to extract article content";
pub const ANALYSIS_UNAVAILABLE: &str = "AI analysis not available - check API keys";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Extracting,
    Analyzing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetching => "fetching",
            Stage::Extracting => "extracting",
            Stage::Analyzing => "analyzing",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

pub struct Pipeline {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn ArticleExtractor>,
    analyzer: Arc<dyn TextAnalyzer>,
    cache: Option<Arc<dyn ResultCache>>,
    freshness: FreshnessPolicy,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn ArticleExtractor>,
        analyzer: Arc<dyn TextAnalyzer>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            analyzer,
            cache: None,
            freshness: FreshnessPolicy::default(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_freshness(mut self, freshness: FreshnessPolicy) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn analyzer_name(&self) -> &str {
        self.analyzer.name()
    }

    /// Serve from cache when fresh, otherwise run the stages and persist a success.
    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult {
        self.analyze_at(request, Utc::now()).await
    }

    pub async fn analyze_at(&self, request: &AnalysisRequest, now: DateTime<Utc>) -> AnalysisResult {
        let Some(cache) = &self.cache else {
            return self.run(request).await;
        };

        match self.lookup(cache.as_ref(), &request.url, now).await {
            CacheDecision::Fresh(result) => {
                info!("📦 Serving cached analysis for {}", request.url);
                return result;
            }
            CacheDecision::Stale => info!("♻️ Cached analysis for {} is stale, recomputing", request.url),
            CacheDecision::Miss => info!("🔎 No cached analysis for {}", request.url),
        }

        let mut result = self.run(request).await;
        if result.success {
            self.persist(cache.as_ref(), &mut result, now).await;
        }
        result
    }

    /// One uncached pass through the stages. Never panics outward.
    pub async fn run(&self, request: &AnalysisRequest) -> AnalysisResult {
        match AssertUnwindSafe(self.run_stages(request)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("Pipeline for {} aborted: {}", request.url, message);
                AnalysisResult::failed(&request.url, message)
            }
        }
    }

    async fn run_stages(&self, request: &AnalysisRequest) -> AnalysisResult {
        let url = request.url.as_str();
        let mut result = AnalysisResult::new(url);

        enter(Stage::Fetching, url);
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Error downloading {}: {}", url, e);
                result.error = Some(DOWNLOAD_FAILED.to_string());
                return result;
            }
        };

        enter(Stage::Extracting, url);
        let text = match self.extractor.extract(&html) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("No article content found in {}", url);
                result.error = Some(EXTRACTION_FAILED.to_string());
                return result;
            }
            Err(e) => {
                warn!("Error extracting article content from {}: {}", url, e);
                result.error = Some(EXTRACTION_FAILED.to_string());
                return result;
            }
        };

        if request.verbose {
            result.extracted_text = Some(text.clone());
        }

        enter(Stage::Analyzing, url);
        match self.analyzer.analyze(&text).await.and_then(TextAnalysis::validate) {
            Ok(analysis) => result.analysis = Some(analysis),
            Err(e) => {
                warn!("Analysis with {} unavailable for {}: {}", self.analyzer.name(), url, e);
                result.error = Some(ANALYSIS_UNAVAILABLE.to_string());
            }
        }
        result.success = true;

        enter(Stage::Done, url);
        result
    }

    async fn lookup(&self, cache: &dyn ResultCache, url: &str, now: DateTime<Utc>) -> CacheDecision {
        match cache.get(url).await {
            Ok(entry) => self.freshness.evaluate(entry, now),
            Err(e) => {
                warn!("Error reading cached analysis for {}: {}", url, e);
                CacheDecision::Miss
            }
        }
    }

    async fn persist(&self, cache: &dyn ResultCache, result: &mut AnalysisResult, now: DateTime<Utc>) {
        let updated = format_timestamp(now);
        result.updated = Some(updated.clone());

        let entry = match CacheEntry::from_result(result, &updated) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Could not serialize analysis for {}: {}", result.url, e);
                return;
            }
        };
        match cache.put(&entry).await {
            Ok(()) => debug!("Cached analysis for {}", result.url),
            Err(e) => warn!("Error saving analysis for {}: {}", result.url, e),
        }
    }
}

fn enter(stage: Stage, url: &str) {
    debug!(%stage, url, "pipeline stage");
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "pipeline panicked".to_string()
    }
}
