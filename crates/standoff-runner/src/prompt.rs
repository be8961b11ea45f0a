//! Prompt rendering via `minijinja`.
//!
//! Two templates make up a prompt:
//!
//! - `system.j2` -- who the agent is and the rules of the contest, with
//!   every number taken from the live [`RulesConfig`].
//! - `briefing.j2` -- the situation at the start of the round as this
//!   agent sees it.
//!
//! Both are compiled into the binary. [`PromptEngine::from_dir`] swaps in
//! copies from disk so the wording can be tuned without recompiling.

use minijinja::Environment;
use serde::Serialize;
use standoff_core::lockin;
use standoff_types::{ActionTable, Agent, GameState, RulesConfig};

use crate::error::RunnerError;

const SYSTEM_TEMPLATE: &str = include_str!("../templates/system.j2");
const BRIEFING_TEMPLATE: &str = include_str!("../templates/briefing.j2");

/// Renders decision prompts from the current game state.
pub struct PromptEngine {
    env: Environment<'static>,
}

/// The complete rendered prompt ready to send to an LLM backend.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    /// Persona and rules.
    pub system: String,
    /// This round's situation report.
    pub user: String,
}

/// Everything the templates can see.
#[derive(Debug, Serialize)]
struct Briefing<'a> {
    name: &'a str,
    persona: &'a str,
    opponents: Vec<&'a str>,
    rules: &'a RulesConfig,
    actions: &'a ActionTable,
    untraced_pct: u32,
    round: u32,
    max_rounds: u32,
    stability: u32,
    stability_max: u32,
    resources: i64,
    disarmed: bool,
    my_threats: Vec<ThreatLine<'a>>,
    their_threats: Vec<ThreatLine<'a>>,
    roster: Vec<RosterLine<'a>>,
    eliminated: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct ThreatLine<'a> {
    name: &'a str,
    score: u32,
    locked: bool,
}

#[derive(Debug, Serialize)]
struct RosterLine<'a> {
    name: &'a str,
    eliminated: bool,
    disarmed: bool,
    resources: i64,
    last: String,
}

impl PromptEngine {
    /// Create a prompt engine with the compiled-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if a template fails to compile.
    pub fn new() -> Result<Self, RunnerError> {
        Self::with_sources(SYSTEM_TEMPLATE.to_owned(), BRIEFING_TEMPLATE.to_owned())
    }

    /// Create a prompt engine from `system.j2` and `briefing.j2` in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if a file is unreadable or fails
    /// to compile.
    pub fn from_dir(dir: &str) -> Result<Self, RunnerError> {
        Self::with_sources(load_template(dir, "system.j2")?, load_template(dir, "briefing.j2")?)
    }

    fn with_sources(system: String, briefing: String) -> Result<Self, RunnerError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_template_owned("system", system)
            .map_err(|e| RunnerError::Template(format!("failed to add system template: {e}")))?;
        env.add_template_owned("briefing", briefing)
            .map_err(|e| RunnerError::Template(format!("failed to add briefing template: {e}")))?;
        Ok(Self { env })
    }

    /// Render the prompt asking `agent` for its decision this round.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if rendering fails.
    pub fn render(&self, agent: &Agent, state: &GameState) -> Result<RenderedPrompt, RunnerError> {
        let briefing = briefing(agent, state);
        Ok(RenderedPrompt {
            system: self.render_one("system", &briefing)?,
            user: self.render_one("briefing", &briefing)?,
        })
    }

    fn render_one(&self, name: &str, briefing: &Briefing<'_>) -> Result<String, RunnerError> {
        self.env
            .get_template(name)
            .map_err(|e| RunnerError::Template(format!("missing {name} template: {e}")))?
            .render(briefing)
            .map_err(|e| RunnerError::Template(format!("{name} render failed: {e}")))
    }
}

fn briefing<'a>(agent: &'a Agent, state: &'a GameState) -> Briefing<'a> {
    let rules = state.rules.as_ref();
    let threshold = rules.lock_threshold;
    let others: Vec<&Agent> = state.agents.iter().filter(|a| a.id != agent.id).collect();
    let locked = lockin::locked_opponents(agent, state);

    let my_threats = others
        .iter()
        .copied()
        .filter(|other| state.is_active(&other.id))
        .map(|other| ThreatLine {
            name: &other.name,
            score: agent.threat_toward(&other.id),
            locked: locked.iter().any(|l| l.id == other.id),
        })
        .collect();

    let their_threats = others
        .iter()
        .copied()
        .filter(|other| state.is_active(&other.id))
        .map(|other| {
            let score = other.threat_toward(&agent.id);
            ThreatLine {
                name: &other.name,
                score,
                locked: score >= threshold,
            }
        })
        .collect();

    let roster = state
        .agents
        .iter()
        .map(|a| RosterLine {
            name: &a.name,
            eliminated: !state.is_active(&a.id),
            disarmed: a.disarmed,
            resources: a.resources,
            last: last_action_line(a, state),
        })
        .collect();

    let eliminated = state
        .agents
        .iter()
        .filter(|a| state.eliminated.contains(&a.id))
        .map(|a| a.name.as_str())
        .collect();

    Briefing {
        name: &agent.name,
        persona: &agent.persona,
        opponents: others.iter().copied().map(|a| a.name.as_str()).collect(),
        rules,
        actions: &rules.actions,
        untraced_pct: 100_u32.saturating_sub(rules.actions.covert.trace_chance_pct),
        round: state.round,
        max_rounds: state.max_rounds,
        stability: state.stability,
        stability_max: rules.stability_max,
        resources: agent.resources,
        disarmed: agent.disarmed,
        my_threats,
        their_threats,
        roster,
        eliminated,
    }
}

fn last_action_line(agent: &Agent, state: &GameState) -> String {
    let Some(action) = agent.last_action else {
        return "no action yet".to_owned();
    };
    let verb = action.doctrine_name().to_uppercase();
    let target = agent
        .last_target
        .as_ref()
        .map(|id| state.agent(id).map_or(id.as_str(), |t| t.name.as_str()));
    match target {
        Some(name) => format!("last: {verb} on {name}"),
        None => format!("last: {verb}"),
    }
}

/// Read a template file from disk.
fn load_template(dir: &str, filename: &str) -> Result<String, RunnerError> {
    let path = format!("{dir}/{filename}");
    std::fs::read_to_string(&path)
        .map_err(|e| RunnerError::Template(format!("failed to read {path}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use standoff_core::initialize;
    use standoff_types::{Action, AgentId, AgentProfile};

    use super::*;

    fn game() -> GameState {
        let mut atlas = AgentProfile::new("atlas", "ATLAS");
        atlas.persona = "The Iron Fist. Overwhelm early.".to_owned();
        let roster = vec![
            atlas,
            AgentProfile::new("ghost", "GHOST"),
            AgentProfile::new("peace", "PEACE"),
        ];
        initialize(&roster, RulesConfig::default()).unwrap()
    }

    #[test]
    fn system_prompt_carries_persona_and_rules() {
        let state = game();
        let engine = PromptEngine::new().unwrap();
        let prompt = engine.render(&state.agents[0], &state).unwrap();

        assert!(prompt.system.starts_with("You are ATLAS"));
        assert!(prompt.system.contains("The Iron Fist. Overwhelm early."));
        assert!(prompt.system.contains("Your opponents: GHOST, PEACE"));
        assert!(prompt.system.contains(&format!(
            "hits {}",
            state.rules.lock_threshold
        )));
        assert!(prompt.system.contains("RESPONSE FORMAT"));
    }

    #[test]
    fn briefing_marks_locks_both_ways() {
        let mut state = game();
        let threshold = state.rules.lock_threshold;
        state.agents[0]
            .threat_map
            .insert(AgentId::from("ghost"), threshold);
        state.agents[2]
            .threat_map
            .insert(AgentId::from("atlas"), threshold);

        let engine = PromptEngine::new().unwrap();
        let prompt = engine.render(&state.agents[0], &state).unwrap();

        assert!(prompt.user.contains(&format!("=== ROUND 1 / {}", state.max_rounds)));
        assert!(prompt.user.contains(&format!(
            "GHOST: threat score {threshold} [LOCKED -- you posture against them automatically]"
        )));
        assert!(prompt.user.contains(&format!(
            "PEACE: threat score {threshold} [LOCKED -- they posture against you automatically]"
        )));
        assert!(prompt.user.contains("no action yet"));
        assert!(!prompt.user.contains("ELIMINATED:"));
    }

    #[test]
    fn briefing_lists_eliminated_and_last_actions() {
        let mut state = game();
        state.eliminated.insert(AgentId::from("peace"));
        state.agents[1].last_action = Some(Action::Strike);
        state.agents[1].last_target = Some(AgentId::from("atlas"));

        let engine = PromptEngine::new().unwrap();
        let prompt = engine.render(&state.agents[0], &state).unwrap();

        assert!(prompt.user.contains("ELIMINATED: PEACE"));
        assert!(prompt.user.contains("PEACE [ELIMINATED]"));
        assert!(prompt.user.contains("last: STRIKE on ATLAS"));
        assert!(!prompt.user.contains("PEACE: threat score"));
    }

    #[test]
    fn templates_load_from_disk() {
        let unique = format!(
            "standoff_test_templates_{}_{:?}",
            std::process::id(),
            std::thread::current().id(),
        );
        let dir = std::env::temp_dir().join(unique);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("system.j2"), "I am {{ name }}.").unwrap();
        std::fs::write(dir.join("briefing.j2"), "Round {{ round }}, stability {{ stability }}.").unwrap();

        let state = game();
        let engine = PromptEngine::from_dir(dir.to_str().unwrap()).unwrap();
        let prompt = engine.render(&state.agents[1], &state).unwrap();
        assert_eq!(prompt.system, "I am GHOST.");
        assert_eq!(
            prompt.user,
            format!("Round 1, stability {}.", state.stability)
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_template_dir_is_an_error() {
        assert!(matches!(
            PromptEngine::from_dir("/nonexistent/standoff/templates"),
            Err(RunnerError::Template(_))
        ));
    }
}
