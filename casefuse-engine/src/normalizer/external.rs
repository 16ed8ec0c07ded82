//! Network-backed sources
//!
//! `ExternalLinkExtractor` and `RestApiExtractor` feed normalization.
//! `ExternalIntegrator` re-fetches the same URLs to build the raw
//! `ExternalRecord`s fusion consumes; the second fetch is intentional, the two
//! results serve different consumers.
//!
//! Fetch errors are wrapped into `SourceProcessingFailed` here and never reach
//! the caller raw.

use super::{require_url, ContentExtractor};
use crate::fetcher::{ExternalFetcher, FetchError};
use crate::scoring;
use crate::types::{ExternalRecord, PipelineError, Source, SourceKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

fn fetch_failed(source: &Source, error: FetchError) -> PipelineError {
    PipelineError::SourceProcessingFailed {
        source_id: source.id.clone(),
        reason: error.to_string(),
    }
}

/// external-link: page text
pub struct ExternalLinkExtractor {
    fetcher: Arc<ExternalFetcher>,
}

impl ExternalLinkExtractor {
    pub fn new(fetcher: Arc<ExternalFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ContentExtractor for ExternalLinkExtractor {
    fn name(&self) -> &'static str {
        "external-link"
    }

    async fn extract(&self, source: &Source) -> Result<String, PipelineError> {
        let url = require_url(source)?;
        self.fetcher
            .fetch_text(url)
            .await
            .map_err(|e| fetch_failed(source, e))
    }
}

/// rest-api: pretty-printed JSON
pub struct RestApiExtractor {
    fetcher: Arc<ExternalFetcher>,
}

impl RestApiExtractor {
    pub fn new(fetcher: Arc<ExternalFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ContentExtractor for RestApiExtractor {
    fn name(&self) -> &'static str {
        "rest-api"
    }

    async fn extract(&self, source: &Source) -> Result<String, PipelineError> {
        let url = require_url(source)?;
        self.fetcher
            .fetch_json(url)
            .await
            .map_err(|e| fetch_failed(source, e))
    }
}

/// Builds raw external records for fusion
pub struct ExternalIntegrator {
    fetcher: Arc<ExternalFetcher>,
    vocabulary: Arc<[String]>,
}

impl ExternalIntegrator {
    pub fn new(fetcher: Arc<ExternalFetcher>, vocabulary: Arc<[String]>) -> Self {
        Self {
            fetcher,
            vocabulary,
        }
    }

    /// Fetch the raw payload behind an external-link or rest-api source
    ///
    /// # Errors
    /// - `UnsupportedSourceKind` for any other kind
    /// - `SourceProcessingFailed` if the URL is missing or the fetch fails
    pub async fn integrate(
        &self,
        source: &Source,
        now: DateTime<Utc>,
    ) -> Result<ExternalRecord, PipelineError> {
        let url = require_url(source)?;

        let payload = match source.kind {
            SourceKind::ExternalLink => self.fetcher.fetch_text(url).await,
            SourceKind::RestApi => self.fetcher.fetch_json(url).await,
            _ => return Err(PipelineError::UnsupportedSourceKind(source.kind.to_string())),
        }
        .map_err(|e| fetch_failed(source, e))?;

        debug!(source_id = %source.id, url = %url, "External record integrated");

        Ok(ExternalRecord {
            source_id: source.id.clone(),
            kind: source.kind.clone(),
            url: url.to_string(),
            impact_score: scoring::impact_score(&payload),
            reach_score: scoring::reach_score(&payload),
            tags: scoring::extract_tags(&payload, &self.vocabulary),
            payload,
            fetched_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::DEFAULT_TAG_VOCABULARY;
    use std::time::Duration;

    fn fetcher() -> Arc<ExternalFetcher> {
        Arc::new(ExternalFetcher::new("casefuse-test", Duration::from_secs(1)).unwrap())
    }

    #[tokio::test]
    async fn test_integrate_rejects_inline_kinds() {
        let integrator = ExternalIntegrator::new(fetcher(), DEFAULT_TAG_VOCABULARY.clone().into());
        let mut source = Source::inline("s1", SourceKind::DocumentText, "Memo", "x");
        source.url = Some("http://127.0.0.1:9/".to_string());

        let result = integrator.integrate(&source, Utc::now()).await;
        assert_eq!(
            result.unwrap_err(),
            PipelineError::UnsupportedSourceKind("document-text".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_wrapped_with_source_id() {
        let extractor = RestApiExtractor::new(fetcher());
        let source = Source::remote("api-1", SourceKind::RestApi, "Docket", "http://127.0.0.1:9/");

        match extractor.extract(&source).await {
            Err(PipelineError::SourceProcessingFailed { source_id, reason }) => {
                assert_eq!(source_id, "api-1");
                assert!(reason.contains("127.0.0.1:9"));
            }
            other => panic!("expected SourceProcessingFailed, got {:?}", other),
        }
    }
}
