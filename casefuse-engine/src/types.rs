//! Core types for the multi-source fusion pipeline
//!
//! Data flows through these types in one direction:
//! - **Source** - caller input, enriched in place by normalization
//! - **Insight** - one per thematic cluster of sources (fusion)
//! - **PersonaInsight** - one per advisor persona
//! - **UnifiedRecommendation** - one per insight, each with concrete Actions
//!
//! Wire format is camelCase JSON. Scores are always recomputed by the
//! pipeline and are never read from caller input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Source
// ============================================================================

/// Kind of a data source
///
/// Canonical names are kebab-case (`document-text`, `rest-api`, ...). Legacy
/// short names (`txt`, `api`, `ai_analysis`, ...) are accepted on input.
/// Anything else is kept as `Unsupported` so the failure can be reported per
/// source instead of rejecting the whole request at deserialization time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceKind {
    DocumentText,
    DocumentPdf,
    DocumentDocx,
    ExternalLink,
    RestApi,
    DatabaseExtract,
    PriorAiAnalysis,
    /// Unrecognized kind string (empty string = kind not given)
    Unsupported(String),
}

impl SourceKind {
    /// Canonical wire name
    pub fn as_str(&self) -> &str {
        match self {
            SourceKind::DocumentText => "document-text",
            SourceKind::DocumentPdf => "document-pdf",
            SourceKind::DocumentDocx => "document-docx",
            SourceKind::ExternalLink => "external-link",
            SourceKind::RestApi => "rest-api",
            SourceKind::DatabaseExtract => "database-extract",
            SourceKind::PriorAiAnalysis => "prior-ai-analysis",
            SourceKind::Unsupported(kind) => kind.as_str(),
        }
    }

    /// True for kinds whose content is fetched over HTTP
    pub fn is_external(&self) -> bool {
        matches!(self, SourceKind::ExternalLink | SourceKind::RestApi)
    }

    /// True when the caller did not provide a kind at all
    pub fn is_missing(&self) -> bool {
        matches!(self, SourceKind::Unsupported(kind) if kind.trim().is_empty())
    }

    /// Insight category contributed by a source of this kind
    pub fn category(&self) -> InsightCategory {
        match self {
            SourceKind::DocumentText | SourceKind::DocumentPdf | SourceKind::DocumentDocx => {
                InsightCategory::Legal
            }
            SourceKind::ExternalLink | SourceKind::RestApi => InsightCategory::RiskImpact,
            SourceKind::DatabaseExtract => InsightCategory::Process,
            SourceKind::PriorAiAnalysis | SourceKind::Unsupported(_) => InsightCategory::Synthesis,
        }
    }
}

impl From<String> for SourceKind {
    fn from(value: String) -> Self {
        match value.trim() {
            "document-text" | "txt" | "text" | "prd" => SourceKind::DocumentText,
            "document-pdf" | "pdf" => SourceKind::DocumentPdf,
            "document-docx" | "docx" => SourceKind::DocumentDocx,
            "external-link" | "external_link" => SourceKind::ExternalLink,
            "rest-api" | "api" => SourceKind::RestApi,
            "database-extract" | "database" => SourceKind::DatabaseExtract,
            "prior-ai-analysis" | "ai_analysis" => SourceKind::PriorAiAnalysis,
            _ => SourceKind::Unsupported(value),
        }
    }
}

impl From<SourceKind> for String {
    fn from(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Unsupported(kind) => kind,
            other => other.as_str().to_string(),
        }
    }
}

impl Default for SourceKind {
    fn default() -> Self {
        SourceKind::Unsupported(String::new())
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive annotation attached to sources, insights and outputs
///
/// Never read by scoring, clustering or ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WisdomGraph {
    pub level: f64,
    pub patterns: Vec<String>,
    pub connections: Vec<String>,
    pub evolution_steps: Vec<String>,
}

/// One unit of pipeline input
///
/// Callers populate `id`, `kind`, `displayName`, `url`/`rawContent` and
/// `metadata`. Everything else is filled in by normalization; values the
/// caller sends for those fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "type")]
    pub kind: SourceKind,
    #[serde(default, alias = "name")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, alias = "content", skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    #[serde(default, skip_deserializing)]
    pub impact_score: f64,
    #[serde(default, skip_deserializing)]
    pub reach_score: f64,
    #[serde(default, skip_deserializing)]
    pub wisdom_graph: WisdomGraph,
    #[serde(default, skip_deserializing)]
    pub tags: Vec<String>,
    /// Extracted text plus annotation lines
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub normalized_content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Source {
    /// Source with inline content
    pub fn inline(
        id: impl Into<String>,
        kind: SourceKind,
        display_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            display_name: display_name.into(),
            raw_content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Source whose content lives behind a URL
    pub fn remote(
        id: impl Into<String>,
        kind: SourceKind,
        display_name: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            display_name: display_name.into(),
            url: Some(url.into()),
            ..Default::default()
        }
    }
}

/// Raw record produced by re-fetching an external-link / rest-api source
///
/// Consumed only by fusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalRecord {
    pub source_id: String,
    pub kind: SourceKind,
    pub url: String,
    pub payload: String,
    pub impact_score: f64,
    pub reach_score: f64,
    pub tags: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

// ============================================================================
// Insight
// ============================================================================

/// Insight / recommendation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightCategory {
    Legal,
    RiskImpact,
    Process,
    Synthesis,
}

impl InsightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightCategory::Legal => "legal",
            InsightCategory::RiskImpact => "risk-impact",
            InsightCategory::Process => "process",
            InsightCategory::Synthesis => "synthesis",
        }
    }

    pub const ALL: [InsightCategory; 4] = [
        InsightCategory::Legal,
        InsightCategory::RiskImpact,
        InsightCategory::Process,
        InsightCategory::Synthesis,
    ];
}

/// One source's contribution to an insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub source_id: String,
    pub source_kind: SourceKind,
    pub excerpt: String,
    pub confidence: f64,
    pub impact_score: f64,
    pub reach_score: f64,
}

/// Cross-source finding produced by fusion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    pub category: InsightCategory,
    pub source_ids: Vec<String>,
    /// 0.0-1.0
    pub confidence: f64,
    /// 1-10
    pub impact_score: f64,
    /// 0-100
    pub reach_potential: f64,
    pub wisdom_graph: WisdomGraph,
    pub description: String,
    pub evidence: Vec<Evidence>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Personas
// ============================================================================

/// Static advisor persona definition
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub role: &'static str,
    pub expertise_areas: &'static [&'static str],
    pub baseline_impact: f64,
    pub baseline_reach: f64,
}

/// One expertise-area statement inside a persona insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewpoint {
    pub expertise_area: String,
    pub statement: String,
    pub confidence: f64,
    pub impact_score: f64,
    pub reach_score: f64,
}

/// Per-persona restatement of the insight set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaInsight {
    pub persona_id: String,
    pub persona_name: String,
    pub persona_icon: String,
    pub role_label: String,
    pub viewpoints: Vec<Viewpoint>,
    pub impact_score: f64,
    pub reach_contribution: f64,
    pub wisdom_graph: WisdomGraph,
    pub recommendation_text: String,
}

// ============================================================================
// Recommendations
// ============================================================================

/// Recommendation priority
///
/// Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Concrete step attached to a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: String,
    pub kind: String,
    pub description: String,
    pub impact_score: f64,
    pub reach_impact: f64,
    pub wisdom_graph: WisdomGraph,
    pub priority: Priority,
    pub estimated_duration: String,
    pub resources: Vec<String>,
}

/// Final output unit, one per insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedRecommendation {
    pub id: String,
    pub category: InsightCategory,
    pub priority: Priority,
    pub confidence: f64,
    pub impact_score: f64,
    pub reach_potential: f64,
    pub wisdom_graph: WisdomGraph,
    pub description: String,
    pub actions: Vec<Action>,
    pub source_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Analysis
// ============================================================================

/// Recommendation counts per priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Run-level numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMetrics {
    /// min(100, mean(source.reachScore) x insightCount)
    pub community_impact: f64,
    pub source_count: usize,
    pub failed_source_count: usize,
    pub insight_count: usize,
    pub recommendation_count: usize,
    pub mean_impact_score: f64,
    pub mean_reach_score: f64,
    pub priority_breakdown: PriorityBreakdown,
}

/// Complete result of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSourceAnalysis {
    /// Sources that survived normalization, in input order
    pub sources: Vec<Source>,
    pub insights: Vec<Insight>,
    pub aggregate_metrics: AggregateMetrics,
    pub aggregate_wisdom_graph: WisdomGraph,
    pub persona_insights: Vec<PersonaInsight>,
    pub recommendations: Vec<UnifiedRecommendation>,
    /// Sources dropped during normalization, in input order
    pub failed_source_ids: Vec<String>,
}

// ============================================================================
// Errors
// ============================================================================

/// Pipeline error
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    /// Malformed or empty request, rejected before any work
    #[error("Invalid source input: {0}")]
    InvalidSourceInput(String),

    /// Source kind has no normalizer
    #[error("Unsupported source kind: {0}")]
    UnsupportedSourceKind(String),

    /// One source failed extraction or fetch (recovered by the orchestrator)
    #[error("Failed to process source {source_id}: {reason}")]
    SourceProcessingFailed { source_id: String, reason: String },

    /// Nothing left to fuse
    #[error("No sources survived normalization; nothing to fuse")]
    EmptySourceSet,

    /// Persona id not in the roster
    #[error("Persona not found: {0}")]
    PersonaNotFound(String),

    /// One persona could not be generated (recovered by the orchestrator)
    #[error("Persona {persona_id} insight generation failed: {reason}")]
    PersonaGenerationFailed { persona_id: String, reason: String },
}
