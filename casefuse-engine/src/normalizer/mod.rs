//! Source normalization
//!
//! Turns a caller-supplied `Source` into a scored, tagged record with
//! normalized content. Text retrieval is per kind (one `ContentExtractor`
//! per family of kinds, selected in `SourceNormalizer::extractor_for`);
//! scoring and tagging are shared.
//!
//! # Extractors
//! - **documents** - document-text / pdf / docx and prior-ai-analysis (inline content)
//! - **external** - external-link (text fetch) and rest-api (JSON fetch), plus the
//!   `ExternalIntegrator` that builds raw records for fusion
//! - **database** - database-extract via a caller-supplied `DatabaseExtract`
//!
//! Scores are computed over the extracted text before the annotation lines are
//! appended, so annotations never move a score.

pub mod database;
pub mod documents;
pub mod external;

use crate::fetcher::ExternalFetcher;
use crate::scoring;
use crate::types::{PipelineError, Source, SourceKind, WisdomGraph};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

pub use database::{DatabaseExtract, DatabaseExtractor, MaterializedExtract};
pub use documents::{DocumentDecoder, DocumentExtractor, PassthroughDecoder, PriorAnalysisExtractor};
pub use external::{ExternalIntegrator, ExternalLinkExtractor, RestApiExtractor};

/// Framing line appended to every normalized text
pub const FRAMING_LINE: &str = "[casefuse: normalized for multi-source fusion]";

/// Text retrieval for one family of source kinds
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Extractor name (for logging)
    fn name(&self) -> &'static str;

    /// Retrieve the plain text of `source`
    async fn extract(&self, source: &Source) -> Result<String, PipelineError>;
}

/// Dispatches each source to its extractor, then scores and tags the text
pub struct SourceNormalizer {
    documents: Arc<dyn ContentExtractor>,
    external_links: Arc<dyn ContentExtractor>,
    rest_apis: Arc<dyn ContentExtractor>,
    database: Arc<dyn ContentExtractor>,
    prior_analyses: Arc<dyn ContentExtractor>,
    vocabulary: Arc<[String]>,
}

impl SourceNormalizer {
    pub fn new(fetcher: Arc<ExternalFetcher>, vocabulary: Arc<[String]>) -> Self {
        Self {
            documents: Arc::new(DocumentExtractor::new()),
            external_links: Arc::new(ExternalLinkExtractor::new(Arc::clone(&fetcher))),
            rest_apis: Arc::new(RestApiExtractor::new(fetcher)),
            database: Arc::new(DatabaseExtractor::new(Arc::new(MaterializedExtract))),
            prior_analyses: Arc::new(PriorAnalysisExtractor),
            vocabulary,
        }
    }

    /// Replace the database-extract callback
    pub fn with_database_extract(mut self, callback: Arc<dyn DatabaseExtract>) -> Self {
        self.database = Arc::new(DatabaseExtractor::new(callback));
        self
    }

    /// Replace the PDF and DOCX decoders
    pub fn with_document_decoders(
        mut self,
        pdf: Arc<dyn DocumentDecoder>,
        docx: Arc<dyn DocumentDecoder>,
    ) -> Self {
        self.documents = Arc::new(DocumentExtractor::with_decoders(pdf, docx));
        self
    }

    /// Dispatch table: source kind to extractor
    fn extractor_for(&self, kind: &SourceKind) -> Option<&dyn ContentExtractor> {
        match kind {
            SourceKind::DocumentText | SourceKind::DocumentPdf | SourceKind::DocumentDocx => {
                Some(self.documents.as_ref())
            }
            SourceKind::ExternalLink => Some(self.external_links.as_ref()),
            SourceKind::RestApi => Some(self.rest_apis.as_ref()),
            SourceKind::DatabaseExtract => Some(self.database.as_ref()),
            SourceKind::PriorAiAnalysis => Some(self.prior_analyses.as_ref()),
            SourceKind::Unsupported(_) => None,
        }
    }

    /// Normalize with the current wall clock
    pub async fn normalize(&self, source: Source) -> Result<Source, PipelineError> {
        self.normalize_at(source, Utc::now()).await
    }

    /// Normalize `source`, stamping `updatedAt` with `now`
    ///
    /// # Errors
    /// - `UnsupportedSourceKind` if no extractor handles the kind
    /// - `SourceProcessingFailed` if extraction or fetching fails
    pub async fn normalize_at(
        &self,
        mut source: Source,
        now: DateTime<Utc>,
    ) -> Result<Source, PipelineError> {
        let extractor = self
            .extractor_for(&source.kind)
            .ok_or_else(|| PipelineError::UnsupportedSourceKind(source.kind.to_string()))?;

        let text = extractor.extract(&source).await?;

        source.impact_score = scoring::impact_score(&text);
        source.reach_score = scoring::reach_score(&text);
        source.tags = scoring::extract_tags(&text, &self.vocabulary);
        source.wisdom_graph = source_wisdom_graph(&source);
        source.normalized_content = Some(annotate(text, &source.tags));
        source.updated_at = Some(now);

        debug!(
            source_id = %source.id,
            extractor = extractor.name(),
            impact = source.impact_score,
            reach = source.reach_score,
            tags = ?source.tags,
            "Source normalized"
        );

        Ok(source)
    }
}

/// Append the tag annotation line (only when tags matched) and the framing line
pub fn annotate(mut text: String, tags: &[String]) -> String {
    if !tags.is_empty() {
        text.push_str("\n\n[Tags: ");
        text.push_str(&tags.join(", "));
        text.push(']');
    }
    text.push_str("\n\n");
    text.push_str(FRAMING_LINE);
    text
}

fn source_wisdom_graph(source: &Source) -> WisdomGraph {
    WisdomGraph {
        level: 1.0,
        patterns: std::iter::once(source.kind.to_string())
            .chain(source.tags.iter().cloned())
            .collect(),
        connections: source.url.iter().cloned().collect(),
        evolution_steps: vec![
            "extracted".to_string(),
            "scored".to_string(),
            "tagged".to_string(),
        ],
    }
}

/// Require a non-blank URL on a network-backed source
pub(crate) fn require_url(source: &Source) -> Result<&str, PipelineError> {
    source
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| PipelineError::SourceProcessingFailed {
            source_id: source.id.clone(),
            reason: format!("{} source has no url", source.kind),
        })
}
