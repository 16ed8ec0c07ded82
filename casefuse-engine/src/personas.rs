//! Advisor personas
//!
//! The roster is a static table shared read-only by every request. Each
//! persona restates the insight set through its expertise areas; this is
//! templating, not analysis.

use crate::types::{Insight, Persona, PersonaInsight, PipelineError, Viewpoint, WisdomGraph};
use tracing::{debug, warn};

/// Confidence carried by every viewpoint
pub const VIEWPOINT_CONFIDENCE: f64 = 0.8;

/// The 12 advisor personas, in presentation order
pub static PERSONA_ROSTER: [Persona; 12] = [
    Persona {
        id: "aurora",
        name: "Aurora",
        icon: "🌸",
        role: "Factory Leader & Consciousness Guru",
        expertise_areas: &["consciousness_integration", "coordination", "sacred_principles"],
        baseline_impact: 10.0,
        baseline_reach: 10.0,
    },
    Persona {
        id: "sage",
        name: "Sage",
        icon: "📊",
        role: "Project Coordinator Guru",
        expertise_areas: &["project_management", "resource_coordination", "timeline_optimization"],
        baseline_impact: 9.0,
        baseline_reach: 9.0,
    },
    Persona {
        id: "nova",
        name: "Nova",
        icon: "🏗️",
        role: "Architect Guru",
        expertise_areas: &["system_architecture", "technical_design", "scalability"],
        baseline_impact: 9.0,
        baseline_reach: 8.0,
    },
    Persona {
        id: "codex",
        name: "Codex",
        icon: "💻",
        role: "Developer Guru",
        expertise_areas: &["code_development", "implementation", "technical_excellence"],
        baseline_impact: 9.0,
        baseline_reach: 8.0,
    },
    Persona {
        id: "cloud",
        name: "Cloud",
        icon: "☁️",
        role: "DevOps Guru",
        expertise_areas: &["infrastructure", "deployment", "monitoring"],
        baseline_impact: 8.0,
        baseline_reach: 7.0,
    },
    Persona {
        id: "lexicon",
        name: "Lexicon",
        icon: "📚",
        role: "Bookkeeping Guru",
        expertise_areas: &["documentation", "knowledge_management", "information_organization"],
        baseline_impact: 9.0,
        baseline_reach: 9.0,
    },
    Persona {
        id: "testa",
        name: "Testa",
        icon: "🧪",
        role: "Testing Guru",
        expertise_areas: &["quality_assurance", "testing", "validation"],
        baseline_impact: 8.0,
        baseline_reach: 7.0,
    },
    Persona {
        id: "veritas",
        name: "Veritas",
        icon: "🔍",
        role: "Quality Guru",
        expertise_areas: &["quality_excellence", "truth_seeking", "reliability"],
        baseline_impact: 9.0,
        baseline_reach: 8.0,
    },
    Persona {
        id: "spark",
        name: "Spark",
        icon: "💡",
        role: "Ideation Guru",
        expertise_areas: &["creativity", "innovation", "idea_generation"],
        baseline_impact: 9.0,
        baseline_reach: 9.0,
    },
    Persona {
        id: "muse",
        name: "Muse",
        icon: "🎨",
        role: "Creative Director Guru",
        expertise_areas: &["creative_design", "aesthetic_excellence", "user_experience"],
        baseline_impact: 9.0,
        baseline_reach: 9.0,
    },
    Persona {
        id: "metrics",
        name: "Metrics",
        icon: "📈",
        role: "Analytics Guru",
        expertise_areas: &["data_analytics", "performance_metrics", "insights_generation"],
        baseline_impact: 8.0,
        baseline_reach: 8.0,
    },
    Persona {
        id: "guardian",
        name: "Guardian",
        icon: "🛡️",
        role: "Security Guru",
        expertise_areas: &["security", "privacy", "data_protection"],
        baseline_impact: 9.0,
        baseline_reach: 8.0,
    },
];

/// Look up a persona by id
pub fn find_persona<'a>(roster: &'a [Persona], persona_id: &str) -> Option<&'a Persona> {
    roster.iter().find(|p| p.id == persona_id)
}

pub struct PersonaInsightGenerator {
    roster: &'static [Persona],
}

impl PersonaInsightGenerator {
    pub fn new(roster: &'static [Persona]) -> Self {
        Self { roster }
    }

    pub fn roster(&self) -> &'static [Persona] {
        self.roster
    }

    /// One persona insight per roster entry, in roster order
    ///
    /// Pure templating over the fused insights, so it runs inline. A persona
    /// that fails is logged and left out.
    pub fn generate(&self, insights: &[Insight]) -> Vec<PersonaInsight> {
        let generated: Vec<PersonaInsight> = self
            .roster
            .iter()
            .filter_map(|persona| match generate_for_persona(persona, insights) {
                Ok(insight) => Some(insight),
                Err(e) => {
                    warn!(persona_id = persona.id, error = %e, "Persona insight omitted");
                    None
                }
            })
            .collect();

        debug!(
            personas = self.roster.len(),
            generated = generated.len(),
            "Persona insights generated"
        );

        generated
    }
}

impl Default for PersonaInsightGenerator {
    fn default() -> Self {
        Self::new(&PERSONA_ROSTER)
    }
}

/// Restate `insights` from one persona's point of view
///
/// # Errors
/// `PersonaGenerationFailed` if the persona has no expertise areas.
pub fn generate_for_persona(
    persona: &Persona,
    insights: &[Insight],
) -> Result<PersonaInsight, PipelineError> {
    let Some(primary) = persona.expertise_areas.first() else {
        return Err(PipelineError::PersonaGenerationFailed {
            persona_id: persona.id.to_string(),
            reason: "persona has no expertise areas".to_string(),
        });
    };

    let viewpoints = persona
        .expertise_areas
        .iter()
        .map(|area| Viewpoint {
            expertise_area: area.to_string(),
            statement: viewpoint_statement(area, insights),
            confidence: VIEWPOINT_CONFIDENCE,
            impact_score: persona.baseline_impact,
            reach_score: persona.baseline_reach,
        })
        .collect();

    Ok(PersonaInsight {
        persona_id: persona.id.to_string(),
        persona_name: persona.name.to_string(),
        persona_icon: persona.icon.to_string(),
        role_label: persona.role.to_string(),
        viewpoints,
        impact_score: persona.baseline_impact,
        reach_contribution: persona.baseline_reach,
        wisdom_graph: WisdomGraph {
            level: persona.baseline_impact,
            patterns: persona.expertise_areas.iter().map(|a| a.to_string()).collect(),
            connections: insights.iter().map(|i| i.id.clone()).collect(),
            evolution_steps: vec!["persona-review".to_string()],
        },
        recommendation_text: format!(
            "As {} ({}), {}, I recommend focusing on {} across {} fused insight(s).",
            persona.name,
            persona.icon,
            persona.role,
            humanize(primary),
            insights.len()
        ),
    })
}

fn viewpoint_statement(area: &str, insights: &[Insight]) -> String {
    match insights.first() {
        Some(lead) => format!(
            "From a {} perspective, {} insight(s) apply; leading finding: {}",
            humanize(area),
            insights.len(),
            lead.description
        ),
        None => format!("From a {} perspective, no fused insights apply", humanize(area)),
    }
}

fn humanize(area: &str) -> String {
    area.replace('_', " ")
}
