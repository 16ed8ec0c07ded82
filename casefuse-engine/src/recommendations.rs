//! Recommendation unification
//!
//! One recommendation per insight, in insight order, each with a single
//! synthesized action.

use crate::types::{
    Action, Insight, InsightCategory, Priority, UnifiedRecommendation, WisdomGraph,
};
use chrono::{DateTime, Utc};

/// Score at or above which a recommendation is high priority
pub const HIGH_PRIORITY_THRESHOLD: f64 = 0.7;

/// Score at or above which a recommendation is medium priority
pub const MEDIUM_PRIORITY_THRESHOLD: f64 = 0.4;

pub const DEFAULT_ACTION_DURATION: &str = "1 hour";

/// Priority from confidence (0-1) and reach potential (0-100)
///
/// `score = (confidence + reach / 100) / 2`, then thresholds 0.7 and 0.4.
pub fn priority_for(confidence: f64, reach_potential: f64) -> Priority {
    let score = (confidence + reach_potential / 100.0) / 2.0;
    if score >= HIGH_PRIORITY_THRESHOLD {
        Priority::High
    } else if score >= MEDIUM_PRIORITY_THRESHOLD {
        Priority::Medium
    } else {
        Priority::Low
    }
}

#[derive(Default)]
pub struct RecommendationUnifier;

impl RecommendationUnifier {
    pub fn new() -> Self {
        Self
    }

    pub fn unify(&self, insights: &[Insight]) -> Vec<UnifiedRecommendation> {
        self.unify_at(insights, Utc::now())
    }

    /// Map each insight to a recommendation, stamping `createdAt` with `now`
    pub fn unify_at(&self, insights: &[Insight], now: DateTime<Utc>) -> Vec<UnifiedRecommendation> {
        insights
            .iter()
            .enumerate()
            .map(|(index, insight)| recommend(index + 1, insight, now))
            .collect()
    }
}

fn recommend(ordinal: usize, insight: &Insight, now: DateTime<Utc>) -> UnifiedRecommendation {
    let wisdom_graph = WisdomGraph {
        level: insight.wisdom_graph.level,
        patterns: insight.wisdom_graph.patterns.clone(),
        connections: vec![insight.id.clone()],
        evolution_steps: vec!["fusion".to_string(), "recommendation".to_string()],
    };

    let action = Action {
        id: format!("action-{:03}-1", ordinal),
        kind: action_kind(insight.category).to_string(),
        description: format!("{}: {}", action_verb(insight.category), insight.description),
        impact_score: insight.impact_score,
        reach_impact: insight.reach_potential,
        wisdom_graph: wisdom_graph.clone(),
        priority: Priority::Medium,
        estimated_duration: DEFAULT_ACTION_DURATION.to_string(),
        resources: vec![
            insight.category.as_str().to_string(),
            "source-review".to_string(),
        ],
    };

    UnifiedRecommendation {
        id: format!("recommendation-{:03}", ordinal),
        category: insight.category,
        priority: priority_for(insight.confidence, insight.reach_potential),
        confidence: insight.confidence,
        impact_score: insight.impact_score,
        reach_potential: insight.reach_potential,
        wisdom_graph,
        description: insight.description.clone(),
        actions: vec![action],
        source_ids: insight.source_ids.clone(),
        created_at: now,
    }
}

fn action_kind(category: InsightCategory) -> &'static str {
    match category {
        InsightCategory::Legal => "legal-review",
        InsightCategory::RiskImpact => "risk-assessment",
        InsightCategory::Process => "process-improvement",
        InsightCategory::Synthesis => "synthesis-review",
    }
}

fn action_verb(category: InsightCategory) -> &'static str {
    match category {
        InsightCategory::Legal => "Review the legal position",
        InsightCategory::RiskImpact => "Assess exposure",
        InsightCategory::Process => "Adjust the process",
        InsightCategory::Synthesis => "Reconcile prior analysis",
    }
}
