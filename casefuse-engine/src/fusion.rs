//! Insight fusion
//!
//! One insight per thematic cluster. A cluster is a connected component of
//! the relation "shares at least one tag"; a source sharing no tag with any
//! other source forms a cluster of its own.
//!
//! Insights come out in the order their cluster's first member appears in the
//! input. Nothing is re-sorted.

use crate::scoring::{self, mean};
use crate::types::{
    Evidence, ExternalRecord, Insight, InsightCategory, PipelineError, Source, WisdomGraph,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Default evidence excerpt length in chars
pub const DEFAULT_EXCERPT_CHARS: usize = 200;

pub struct FusionEngine {
    excerpt_chars: usize,
}

impl FusionEngine {
    pub fn new(excerpt_chars: usize) -> Self {
        Self { excerpt_chars }
    }

    /// Fuse with the current wall clock
    pub fn fuse(
        &self,
        sources: &[Source],
        external: &[ExternalRecord],
    ) -> Result<Vec<Insight>, PipelineError> {
        self.fuse_at(sources, external, Utc::now())
    }

    /// Fuse normalized sources into insights
    ///
    /// `external` only contributes URLs to each insight's wisdom graph.
    ///
    /// # Errors
    /// `EmptySourceSet` if `sources` is empty.
    pub fn fuse_at(
        &self,
        sources: &[Source],
        external: &[ExternalRecord],
        now: DateTime<Utc>,
    ) -> Result<Vec<Insight>, PipelineError> {
        if sources.is_empty() {
            return Err(PipelineError::EmptySourceSet);
        }

        let insights: Vec<Insight> = cluster_by_shared_tags(sources)
            .into_iter()
            .enumerate()
            .map(|(index, members)| {
                let members: Vec<&Source> = members.into_iter().map(|i| &sources[i]).collect();
                self.build_insight(index + 1, &members, external, now)
            })
            .collect();

        debug!(
            sources = sources.len(),
            insights = insights.len(),
            "Fusion complete"
        );

        Ok(insights)
    }

    fn build_insight(
        &self,
        ordinal: usize,
        members: &[&Source],
        external: &[ExternalRecord],
        now: DateTime<Utc>,
    ) -> Insight {
        let impact = mean(members.iter().map(|s| s.impact_score));
        let reach = mean(members.iter().map(|s| s.reach_score));

        let evidence = members
            .iter()
            .map(|s| Evidence {
                source_id: s.id.clone(),
                source_kind: s.kind.clone(),
                excerpt: scoring::excerpt(
                    s.normalized_content.as_deref().unwrap_or_default(),
                    self.excerpt_chars,
                ),
                confidence: (s.impact_score / 10.0).clamp(0.0, 1.0),
                impact_score: s.impact_score,
                reach_score: s.reach_score,
            })
            .collect();

        let source_ids: Vec<String> = members.iter().map(|s| s.id.clone()).collect();

        let mut connections = source_ids.clone();
        connections.extend(
            external
                .iter()
                .filter(|r| source_ids.contains(&r.source_id))
                .map(|r| r.url.clone()),
        );

        Insight {
            id: format!("insight-{:03}", ordinal),
            category: dominant_category(members),
            source_ids,
            confidence: (impact / 10.0).clamp(0.0, 1.0),
            impact_score: impact,
            reach_potential: reach,
            wisdom_graph: WisdomGraph {
                level: impact,
                patterns: union_tags(members),
                connections,
                evolution_steps: vec!["normalization".to_string(), "fusion".to_string()],
            },
            description: describe(members),
            evidence,
            created_at: now,
        }
    }
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_EXCERPT_CHARS)
    }
}

/// Group source indices into tag-sharing clusters
///
/// Clusters are ordered by their smallest member index; members within a
/// cluster keep input order.
pub fn cluster_by_shared_tags(sources: &[Source]) -> Vec<Vec<usize>> {
    let mut parent: Vec<usize> = (0..sources.len()).collect();
    let mut first_with_tag: HashMap<&str, usize> = HashMap::new();

    for (i, source) in sources.iter().enumerate() {
        for tag in &source.tags {
            match first_with_tag.get(tag.as_str()) {
                Some(&j) => union(&mut parent, i, j),
                None => {
                    first_with_tag.insert(tag.as_str(), i);
                }
            }
        }
    }

    let mut clusters: Vec<Vec<usize>> = Vec::new();
    let mut cluster_of_root: HashMap<usize, usize> = HashMap::new();

    for i in 0..sources.len() {
        let root = find(&mut parent, i);
        let slot = *cluster_of_root.entry(root).or_insert_with(|| {
            clusters.push(Vec::new());
            clusters.len() - 1
        });
        clusters[slot].push(i);
    }

    clusters
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        // Lower index stays root
        let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[child] = root;
    }
}

/// Most frequent member category; ties go to the category seen first
fn dominant_category(members: &[&Source]) -> InsightCategory {
    let mut counts: Vec<(InsightCategory, usize)> = Vec::new();
    for source in members {
        let category = source.kind.category();
        match counts.iter_mut().find(|(c, _)| *c == category) {
            Some((_, n)) => *n += 1,
            None => counts.push((category, 1)),
        }
    }

    let mut best = (InsightCategory::Synthesis, 0);
    for (category, n) in counts {
        if n > best.1 {
            best = (category, n);
        }
    }
    best.0
}

/// All member tags, first-appearance order
fn union_tags(members: &[&Source]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in members.iter().flat_map(|s| s.tags.iter()) {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    tags
}

/// Tags carried by two or more members, first-appearance order
fn shared_tags(members: &[&Source]) -> Vec<String> {
    union_tags(members)
        .into_iter()
        .filter(|tag| members.iter().filter(|s| s.tags.contains(tag)).count() > 1)
        .collect()
}

fn describe(members: &[&Source]) -> String {
    match members {
        [single] => {
            if single.tags.is_empty() {
                format!("Single-source finding from {} \"{}\"", single.kind, single.display_name)
            } else {
                format!(
                    "Single-source finding from {} \"{}\" on {}",
                    single.kind,
                    single.display_name,
                    single.tags.join(", ")
                )
            }
        }
        _ => {
            let mut kinds: Vec<String> = Vec::new();
            for source in members {
                let kind = source.kind.to_string();
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            format!(
                "{} sources ({}) converge on {}",
                members.len(),
                kinds.join(", "),
                shared_tags(members).join(", ")
            )
        }
    }
}
