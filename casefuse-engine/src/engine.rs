//! Multi-source pipeline orchestration
//!
//! validate → normalize → integrate external → fuse → personas → unify → aggregate
//!
//! A run either returns a complete `MultiSourceAnalysis` or an error. Single
//! source failures during normalization or integration are logged and
//! recovered; the run only fails if no source survives.

use crate::config::EngineConfig;
use crate::fetcher::{ExternalFetcher, FetchError};
use crate::fusion::FusionEngine;
use crate::normalizer::{DatabaseExtract, DocumentDecoder, ExternalIntegrator, SourceNormalizer};
use crate::personas::{find_persona, PersonaInsightGenerator, PERSONA_ROSTER};
use crate::recommendations::RecommendationUnifier;
use crate::scoring::mean;
use crate::types::{
    AggregateMetrics, ExternalRecord, Insight, MultiSourceAnalysis, Persona, PipelineError,
    Priority, PriorityBreakdown, Source, UnifiedRecommendation, WisdomGraph,
};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Pipeline entry point, shared by all requests
pub struct MultiSourceDataEngine {
    normalizer: SourceNormalizer,
    integrator: ExternalIntegrator,
    fusion: FusionEngine,
    personas: PersonaInsightGenerator,
    unifier: RecommendationUnifier,
    max_concurrent_sources: usize,
}

impl MultiSourceDataEngine {
    /// Build the engine and its shared HTTP client
    pub fn new(config: EngineConfig) -> Result<Self, FetchError> {
        let fetcher = Arc::new(ExternalFetcher::new(
            &config.user_agent,
            config.fetch_timeout,
        )?);
        let vocabulary: Arc<[String]> = config.tag_vocabulary.into();

        Ok(Self {
            normalizer: SourceNormalizer::new(Arc::clone(&fetcher), Arc::clone(&vocabulary)),
            integrator: ExternalIntegrator::new(fetcher, vocabulary),
            fusion: FusionEngine::new(config.excerpt_chars),
            personas: PersonaInsightGenerator::new(&PERSONA_ROSTER),
            unifier: RecommendationUnifier::new(),
            max_concurrent_sources: config.max_concurrent_sources.max(1),
        })
    }

    /// Use a caller-supplied database-extract callback
    pub fn with_database_extract(mut self, callback: Arc<dyn DatabaseExtract>) -> Self {
        self.normalizer = self.normalizer.with_database_extract(callback);
        self
    }

    /// Use caller-supplied PDF / DOCX decoders
    pub fn with_document_decoders(
        mut self,
        pdf: Arc<dyn DocumentDecoder>,
        docx: Arc<dyn DocumentDecoder>,
    ) -> Self {
        self.normalizer = self.normalizer.with_document_decoders(pdf, docx);
        self
    }

    /// Replace the persona roster
    pub fn with_roster(mut self, roster: &'static [Persona]) -> Self {
        self.personas = PersonaInsightGenerator::new(roster);
        self
    }

    pub fn roster(&self) -> &'static [Persona] {
        self.personas.roster()
    }

    pub fn persona(&self, persona_id: &str) -> Option<&'static Persona> {
        find_persona(self.personas.roster(), persona_id)
    }

    /// Run the pipeline with the current wall clock
    pub async fn process_multiple_sources(
        &self,
        sources: Vec<Source>,
    ) -> Result<MultiSourceAnalysis, PipelineError> {
        self.process_multiple_sources_at(sources, Utc::now()).await
    }

    /// Run the pipeline with a fixed run clock
    ///
    /// Every timestamp in the result is `now`, so the same input and clock
    /// give the same output (network responses permitting).
    ///
    /// # Errors
    /// - `InvalidSourceInput` before any work if the input is malformed
    /// - `EmptySourceSet` if every source failed normalization
    pub async fn process_multiple_sources_at(
        &self,
        sources: Vec<Source>,
        now: DateTime<Utc>,
    ) -> Result<MultiSourceAnalysis, PipelineError> {
        validate_sources(&sources)?;
        let submitted = sources.len();
        info!(sources = submitted, "Multi-source run started");

        let (normalized, failed_source_ids) = self.normalize_all(sources, now).await;
        let external = self.integrate_external(&normalized, now).await;

        let insights = self.fusion.fuse_at(&normalized, &external, now)?;

        let persona_insights = self.personas.generate(&insights);
        let recommendations = self.unifier.unify_at(&insights, now);

        let aggregate_metrics =
            aggregate_metrics(&normalized, &failed_source_ids, &insights, &recommendations);
        let aggregate_wisdom_graph = aggregate_wisdom_graph(&normalized, &insights);

        info!(
            sources = submitted,
            failed = failed_source_ids.len(),
            insights = insights.len(),
            personas = persona_insights.len(),
            recommendations = recommendations.len(),
            community_impact = aggregate_metrics.community_impact,
            "Multi-source run complete"
        );

        Ok(MultiSourceAnalysis {
            sources: normalized,
            insights,
            aggregate_metrics,
            aggregate_wisdom_graph,
            persona_insights,
            recommendations,
            failed_source_ids,
        })
    }

    /// Normalize with bounded fan-out, keeping input order
    ///
    /// Returns the surviving sources and the ids of the failed ones.
    async fn normalize_all(
        &self,
        sources: Vec<Source>,
        now: DateTime<Utc>,
    ) -> (Vec<Source>, Vec<String>) {
        let results: Vec<(String, Result<Source, PipelineError>)> = stream::iter(sources)
            .map(|mut source| async move {
                if source.created_at.is_none() {
                    source.created_at = Some(now);
                }
                let id = source.id.clone();
                (id, self.normalizer.normalize_at(source, now).await)
            })
            .buffered(self.max_concurrent_sources)
            .collect()
            .await;

        let mut normalized = Vec::with_capacity(results.len());
        let mut failed = Vec::new();
        for (id, result) in results {
            match result {
                Ok(source) => normalized.push(source),
                Err(e) => {
                    warn!(source_id = %id, error = %e, "Source dropped from run");
                    failed.push(id);
                }
            }
        }

        (normalized, failed)
    }

    /// Re-fetch external sources into raw records; failures are skipped
    async fn integrate_external(
        &self,
        sources: &[Source],
        now: DateTime<Utc>,
    ) -> Vec<ExternalRecord> {
        let targets: Vec<Source> = sources
            .iter()
            .filter(|s| s.kind.is_external())
            .cloned()
            .collect();

        stream::iter(targets)
            .map(|source| async move {
                match self.integrator.integrate(&source, now).await {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(source_id = %source.id, error = %e, "External integration skipped");
                        None
                    }
                }
            })
            .buffered(self.max_concurrent_sources)
            .collect::<Vec<Option<ExternalRecord>>>()
            .await
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Reject malformed input before any work starts
pub fn validate_sources(sources: &[Source]) -> Result<(), PipelineError> {
    if sources.is_empty() {
        return Err(PipelineError::InvalidSourceInput(
            "at least one source is required".to_string(),
        ));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for (index, source) in sources.iter().enumerate() {
        if source.id.trim().is_empty() {
            return Err(PipelineError::InvalidSourceInput(format!(
                "source #{} has no id",
                index
            )));
        }
        if source.kind.is_missing() {
            return Err(PipelineError::InvalidSourceInput(format!(
                "source {} has no kind",
                source.id
            )));
        }
        if source.display_name.trim().is_empty() {
            return Err(PipelineError::InvalidSourceInput(format!(
                "source {} has no name",
                source.id
            )));
        }
        if !seen.insert(source.id.as_str()) {
            return Err(PipelineError::InvalidSourceInput(format!(
                "duplicate source id {}",
                source.id
            )));
        }
    }

    Ok(())
}

fn aggregate_metrics(
    sources: &[Source],
    failed_source_ids: &[String],
    insights: &[Insight],
    recommendations: &[UnifiedRecommendation],
) -> AggregateMetrics {
    let mean_reach = mean(sources.iter().map(|s| s.reach_score));

    let mut priority_breakdown = PriorityBreakdown::default();
    for recommendation in recommendations {
        match recommendation.priority {
            Priority::High => priority_breakdown.high += 1,
            Priority::Medium => priority_breakdown.medium += 1,
            Priority::Low => priority_breakdown.low += 1,
        }
    }

    AggregateMetrics {
        community_impact: (mean_reach * insights.len() as f64).min(100.0),
        source_count: sources.len(),
        failed_source_count: failed_source_ids.len(),
        insight_count: insights.len(),
        recommendation_count: recommendations.len(),
        mean_impact_score: mean(sources.iter().map(|s| s.impact_score)),
        mean_reach_score: mean_reach,
        priority_breakdown,
    }
}

fn aggregate_wisdom_graph(sources: &[Source], insights: &[Insight]) -> WisdomGraph {
    WisdomGraph {
        level: 1.0,
        patterns: insights.iter().map(|i| i.description.clone()).collect(),
        connections: sources.iter().map(|s| s.id.clone()).collect(),
        evolution_steps: vec!["multi-source-integration".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;

    fn doc(id: &str, text: &str) -> Source {
        Source::inline(id, SourceKind::DocumentText, format!("Doc {}", id), text)
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(matches!(
            validate_sources(&[]),
            Err(PipelineError::InvalidSourceInput(_))
        ));
    }

    #[test]
    fn test_validate_requires_fields() {
        let mut no_name = doc("a", "x");
        no_name.display_name = " ".to_string();
        assert!(validate_sources(&[no_name]).is_err());

        let mut no_kind = doc("a", "x");
        no_kind.kind = SourceKind::default();
        assert!(validate_sources(&[no_kind]).is_err());

        let mut no_id = doc("a", "x");
        no_id.id = String::new();
        assert!(validate_sources(&[no_id]).is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let result = validate_sources(&[doc("a", "x"), doc("a", "y")]);
        assert_eq!(
            result,
            Err(PipelineError::InvalidSourceInput("duplicate source id a".to_string()))
        );
    }

    #[test]
    fn test_validate_accepts_unsupported_kind() {
        // Unknown kinds fail per source later, not at validation
        let source = Source::inline("a", SourceKind::Unsupported("fax".into()), "Fax", "x");
        assert!(validate_sources(&[source]).is_ok());
    }

    #[tokio::test]
    async fn test_unsupported_kind_reported_as_failed() {
        let engine = MultiSourceDataEngine::new(EngineConfig::default()).unwrap();
        let sources = vec![
            doc("a", "healing words"),
            Source::inline("b", SourceKind::Unsupported("fax".into()), "Fax", "x"),
        ];

        let analysis = engine.process_multiple_sources(sources).await.unwrap();
        assert_eq!(analysis.failed_source_ids, vec!["b"]);
        assert_eq!(analysis.aggregate_metrics.failed_source_count, 1);
        assert_eq!(analysis.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_all_sources_failing_is_empty_set() {
        let engine = MultiSourceDataEngine::new(EngineConfig::default()).unwrap();
        let sources = vec![Source::inline("b", SourceKind::Unsupported("fax".into()), "Fax", "x")];

        let result = engine.process_multiple_sources(sources).await;
        assert_eq!(result.unwrap_err(), PipelineError::EmptySourceSet);
    }

    #[test]
    fn test_community_impact_capped() {
        let mut a = doc("a", "");
        a.reach_score = 60.0;
        let insights = vec![
            Insight {
                id: "insight-001".into(),
                category: crate::types::InsightCategory::Legal,
                source_ids: vec!["a".into()],
                confidence: 0.1,
                impact_score: 1.0,
                reach_potential: 60.0,
                wisdom_graph: WisdomGraph::default(),
                description: String::new(),
                evidence: Vec::new(),
                created_at: Utc::now(),
            };
            2
        ];

        let metrics = aggregate_metrics(&[a], &[], &insights, &[]);
        assert_eq!(metrics.community_impact, 100.0);
        assert_eq!(metrics.mean_reach_score, 60.0);
    }
}
