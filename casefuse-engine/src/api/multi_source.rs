//! Multi-source pipeline routes
//!
//! Mounted under `/api/v1/multi-source`:
//! - `POST /process` - body `{ "sources": [...] }`, full analysis
//! - `GET /personas/:persona_id?sources=<json>` - one persona's insight
//! - `GET /recommendations?sources=<json>` - recommendations only
//! - `GET /consciousness-evolution?sources=<json>` - aggregate metrics and wisdom graph
//!
//! Each request runs the whole pipeline. Success bodies share one envelope:
//! `success`, the route payload, echoed `metrics`, `requestId` and a
//! `message` trailer.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

use crate::api::middleware::{attach_request_context, validate_request_context, RequestContext};
use crate::error::{ApiError, ApiResult};
use crate::types::{
    AggregateMetrics, MultiSourceAnalysis, PersonaInsight, PipelineError, Source,
    UnifiedRecommendation, WisdomGraph,
};
use crate::AppState;

pub const SUCCESS_MESSAGE: &str = "Multi-source analysis complete";

/// POST /process body
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// `?sources=` query for the GET routes (JSON-encoded source list)
#[derive(Debug, Deserialize)]
pub struct SourcesQuery {
    pub sources: Option<String>,
}

/// Success envelope shared by every route
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub payload: T,
    pub metrics: AggregateMetrics,
    pub request_id: Uuid,
    pub message: String,
}

impl<T: Serialize> Envelope<T> {
    fn new(context: &RequestContext, metrics: AggregateMetrics, payload: T) -> Self {
        Self {
            success: true,
            payload,
            metrics,
            request_id: context.request_id,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalysisPayload {
    pub analysis: MultiSourceAnalysis,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaPayload {
    pub persona_insight: PersonaInsight,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsPayload {
    pub recommendations: Vec<UnifiedRecommendation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionPayload {
    pub aggregate_metrics: AggregateMetrics,
    pub aggregate_wisdom_graph: WisdomGraph,
    pub failed_source_ids: Vec<String>,
}

/// POST /api/v1/multi-source/process
pub async fn process_sources(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<AnalysisPayload>>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let analysis = run_pipeline(&state, request.sources).await?;
    let metrics = analysis.aggregate_metrics.clone();

    Ok(Json(Envelope::new(&context, metrics, AnalysisPayload { analysis })))
}

/// GET /api/v1/multi-source/personas/:persona_id
///
/// Unknown persona ids are rejected before the sources are looked at.
pub async fn get_persona_insight(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(persona_id): Path<String>,
    Query(query): Query<SourcesQuery>,
) -> ApiResult<Json<Envelope<PersonaPayload>>> {
    if state.engine.persona(&persona_id).is_none() {
        return Err(PipelineError::PersonaNotFound(persona_id).into());
    }

    let sources = sources_from_query(&query)?;
    let analysis = run_pipeline(&state, sources).await?;

    let persona_insight = analysis
        .persona_insights
        .into_iter()
        .find(|p| p.persona_id == persona_id)
        .ok_or_else(|| PipelineError::PersonaGenerationFailed {
            persona_id: persona_id.clone(),
            reason: "persona was omitted from this run".to_string(),
        })?;

    Ok(Json(Envelope::new(
        &context,
        analysis.aggregate_metrics,
        PersonaPayload { persona_insight },
    )))
}

/// GET /api/v1/multi-source/recommendations
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Query(query): Query<SourcesQuery>,
) -> ApiResult<Json<Envelope<RecommendationsPayload>>> {
    let sources = sources_from_query(&query)?;
    let analysis = run_pipeline(&state, sources).await?;

    Ok(Json(Envelope::new(
        &context,
        analysis.aggregate_metrics,
        RecommendationsPayload {
            recommendations: analysis.recommendations,
        },
    )))
}

/// GET /api/v1/multi-source/consciousness-evolution
pub async fn get_evolution_summary(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Query(query): Query<SourcesQuery>,
) -> ApiResult<Json<Envelope<EvolutionPayload>>> {
    let sources = sources_from_query(&query)?;
    let analysis = run_pipeline(&state, sources).await?;

    Ok(Json(Envelope::new(
        &context,
        analysis.aggregate_metrics.clone(),
        EvolutionPayload {
            aggregate_metrics: analysis.aggregate_metrics,
            aggregate_wisdom_graph: analysis.aggregate_wisdom_graph,
            failed_source_ids: analysis.failed_source_ids,
        },
    )))
}

fn sources_from_query(query: &SourcesQuery) -> ApiResult<Vec<Source>> {
    let raw = query
        .sources
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing sources query parameter".to_string()))?;

    serde_json::from_str(raw)
        .map_err(|e| ApiError::BadRequest(format!("Invalid sources query parameter: {}", e)))
}

/// Run the pipeline, recording server-side failures for /health
async fn run_pipeline(state: &AppState, sources: Vec<Source>) -> ApiResult<MultiSourceAnalysis> {
    match state.engine.process_multiple_sources(sources).await {
        Ok(analysis) => Ok(analysis),
        Err(e) => {
            let err = ApiError::from(e);
            if err.is_server_error() {
                error!(error = %err, "Multi-source run failed");
                *state.last_error.write().await = Some(err.to_string());
            } else {
                warn!(error = %err, "Multi-source request rejected");
            }
            Err(err)
        }
    }
}

/// Build multi-source routes (relative to `/api/v1/multi-source`)
pub fn multi_source_routes() -> Router<AppState> {
    Router::new()
        .route("/process", post(process_sources))
        .route("/personas/:persona_id", get(get_persona_insight))
        .route("/recommendations", get(get_recommendations))
        .route("/consciousness-evolution", get(get_evolution_summary))
        .layer(middleware::from_fn(validate_request_context))
        .layer(middleware::from_fn(attach_request_context))
}
