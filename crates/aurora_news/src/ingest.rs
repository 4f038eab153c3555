use aurora_core::constants::{
    DEFAULT_CATEGORY, DEFAULT_COUNTRY, DEFAULT_LANGUAGE, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH,
    MAX_URL_LENGTH,
};
use aurora_core::{Article, ArticleStore, InsertOutcome, RefreshFilter, Result, Summarizer};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub saved: usize,
    pub duplicates: usize,
    pub errors: usize,
}

/// Validate, dedup, enrich, summarize and store a batch of fetched articles.
pub struct IngestionPipeline {
    store: Arc<dyn ArticleStore>,
    summarizer: Arc<dyn Summarizer>,
}

fn too_long(value: &str, max: usize) -> bool {
    value.chars().count() > max
}

/// Why an article cannot be stored, if it cannot.
pub fn validate(article: &Article) -> std::result::Result<(), String> {
    if article.title.trim().is_empty() {
        return Err("missing title".to_string());
    }
    if article.url.trim().is_empty() {
        return Err("missing url".to_string());
    }
    if too_long(&article.title, MAX_TITLE_LENGTH) {
        return Err(format!("title longer than {} chars", MAX_TITLE_LENGTH));
    }
    if too_long(&article.url, MAX_URL_LENGTH) {
        return Err(format!("url longer than {} chars", MAX_URL_LENGTH));
    }
    if let Some(description) = &article.description {
        if too_long(description, MAX_DESCRIPTION_LENGTH) {
            return Err(format!("description longer than {} chars", MAX_DESCRIPTION_LENGTH));
        }
    }
    if let Some(image_url) = &article.image_url {
        if too_long(image_url, MAX_URL_LENGTH) {
            return Err(format!("image url longer than {} chars", MAX_URL_LENGTH));
        }
    }
    Ok(())
}

/// Fill missing classification from the refresh filter, then from defaults.
pub fn enrich(article: &mut Article, filter: &RefreshFilter) {
    fn fill(slot: &mut Option<String>, from_filter: &Option<String>, default: &str) {
        if slot.is_none() {
            *slot = from_filter.clone();
        }
        if slot.is_none() {
            *slot = Some(default.to_string());
        }
    }

    fill(&mut article.country, &filter.country, DEFAULT_COUNTRY);
    fill(&mut article.language, &filter.language, DEFAULT_LANGUAGE);
    fill(&mut article.category, &filter.category, DEFAULT_CATEGORY);
}

impl IngestionPipeline {
    pub fn new(store: Arc<dyn ArticleStore>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self { store, summarizer }
    }

    /// Process `candidates` in order. Per-article problems are counted in the
    /// report; only an unreachable store fails the whole batch.
    pub async fn ingest(&self, candidates: Vec<Article>, filter: &RefreshFilter) -> Result<IngestReport> {
        let existing = self.store.count().await?;
        debug!("Ingesting {} candidates into {} ({} stored)", candidates.len(), self.store.name(), existing);

        let mut report = IngestReport::default();
        for mut article in candidates {
            if let Err(reason) = validate(&article) {
                debug!("Rejected article {}: {}", article.url, reason);
                report.errors += 1;
                continue;
            }

            match self.store.find_by_url(&article.url).await {
                Ok(Some(_)) => {
                    report.duplicates += 1;
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    error!("Error looking up article {}: {}", article.url, e);
                    report.errors += 1;
                    continue;
                }
            }

            enrich(&mut article, filter);
            if let Some(description) = article.description.as_deref().filter(|d| !d.trim().is_empty()) {
                article.summary = Some(self.summarizer.summarize(description));
            }

            match self.store.insert(&article).await {
                Ok(InsertOutcome::Inserted(_)) => report.saved += 1,
                // lost a race with a concurrent refresh
                Ok(InsertOutcome::Duplicate) => report.duplicates += 1,
                Err(e) => {
                    error!("Error saving article {}: {}", article.url, e);
                    report.errors += 1;
                }
            }
        }

        info!(
            "💾 Article processing completed - Saved: {}, Duplicates: {}, Errors: {}",
            report.saved, report.duplicates, report.errors
        );
        Ok(report)
    }
}
