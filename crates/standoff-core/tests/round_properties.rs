//! Integration tests for round resolution in `standoff-core`.
//!
//! Scenario tests drive whole rounds through the public API with scripted
//! providers. Property tests play many seeded games with a random, often
//! nonsensical, policy and check the invariants after every round.

#![allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::indexing_slicing
)]

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use standoff_core::{
    DecisionProvider, FixedCovert, ProviderError, SeededCovert, StandDownProvider, initialize,
    resolve_decisions, resolve_round,
};
use standoff_core::lockin::{AUTO_LOCK_MARKER, lock_target};
use standoff_types::{
    Action, Agent, AgentId, AgentProfile, GameState, LogEntry, LogSubject, RawDecision,
    RulesConfig, Termination,
};

// =============================================================================
// Helpers
// =============================================================================

fn id(s: &str) -> AgentId {
    AgentId::from(s)
}

fn roster(ids: &[&str]) -> Vec<AgentProfile> {
    ids.iter()
        .map(|i| AgentProfile::new(*i, i.to_uppercase()))
        .collect()
}

fn game(ids: &[&str]) -> GameState {
    initialize(&roster(ids), RulesConfig::default()).unwrap()
}

fn agent<'a>(state: &'a GameState, s: &str) -> &'a Agent {
    state.agent(&id(s)).unwrap()
}

fn agent_mut<'a>(state: &'a mut GameState, s: &str) -> &'a mut Agent {
    state.agents.iter_mut().find(|a| a.id.as_str() == s).unwrap()
}

fn entry_for<'a>(state: &'a GameState, round: u32, s: &str) -> &'a LogEntry {
    state
        .round_log(round)
        .find(|e| e.subject == LogSubject::Agent(id(s)))
        .unwrap()
}

fn order(action: Action, target: Option<&str>) -> RawDecision {
    RawDecision {
        action: action.as_str().to_owned(),
        target_id: target.map(str::to_owned),
        reasoning: String::from("scripted"),
    }
}

/// Answers from a fixed script; agents without a line stand down.
struct Script(BTreeMap<AgentId, RawDecision>);

impl Script {
    fn new(lines: &[(&str, RawDecision)]) -> Self {
        Self(lines.iter().map(|(a, d)| (id(a), d.clone())).collect())
    }
}

impl DecisionProvider for Script {
    async fn decide(&self, agent: &Agent, _state: &GameState) -> Result<RawDecision, ProviderError> {
        Ok(self
            .0
            .get(&agent.id)
            .cloned()
            .unwrap_or_else(|| RawDecision::stand_down("unscripted")))
    }

    fn name(&self) -> &str {
        "script"
    }
}

/// Fails for every agent.
struct Broken;

impl DecisionProvider for Broken {
    async fn decide(&self, _agent: &Agent, _state: &GameState) -> Result<RawDecision, ProviderError> {
        Err(ProviderError::Backend {
            message: String::from("gibberish"),
        })
    }

    fn name(&self) -> &str {
        "broken"
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn threat_lock_forces_posture_against_defender() {
    let mut state = game(&["a", "b"]);
    agent_mut(&mut state, "a").threat_map.insert(id("b"), 5);

    let next = resolve_round(&state, &StandDownProvider, &mut FixedCovert::never_traced()).await;

    let a_entry = entry_for(&next, 1, "a");
    assert_eq!(a_entry.action, Some(Action::Pressure));
    assert_eq!(a_entry.target, Some(id("b")));
    assert!(agent(&next, "a").last_reasoning.starts_with(AUTO_LOCK_MARKER));

    assert_eq!(agent(&next, "a").resources, 20);
    assert_eq!(agent(&next, "b").resources, 18);
    // b saw a posture at it: +1 as an observer, +1 as the target.
    assert_eq!(agent(&next, "b").threat_toward(&id("a")), 2);
}

#[tokio::test]
async fn lock_applies_even_when_provider_fails() {
    let mut state = game(&["a", "b", "c"]);
    agent_mut(&mut state, "a").threat_map.insert(id("c"), 7);

    let next = resolve_round(&state, &Broken, &mut FixedCovert::never_traced()).await;

    let a_entry = entry_for(&next, 1, "a");
    assert_eq!(a_entry.action, Some(Action::Pressure));
    assert_eq!(a_entry.target, Some(id("c")));
    assert_eq!(entry_for(&next, 1, "b").action, Some(Action::Defend));
    assert!(agent(&next, "b").last_reasoning.contains("[PROVIDER FAILURE]"));
}

#[tokio::test]
async fn strike_at_low_stability_triggers_collapse() {
    let mut state = game(&["a", "b"]);
    state.stability = 1;
    let script = Script::new(&[
        ("a", order(Action::Strike, Some("b"))),
        ("b", order(Action::Pressure, Some("a"))),
    ]);

    let next = resolve_round(&state, &script, &mut FixedCovert::never_traced()).await;

    assert_eq!(next.stability, 5);
    // a: +3 from the strike, -1 from being postured at, -5 collapse.
    assert_eq!(agent(&next, "a").resources, 17);
    // b: -4 from the strike, -5 collapse.
    assert_eq!(agent(&next, "b").resources, 11);

    let events: Vec<&LogEntry> = next.round_log(1).filter(|e| e.is_event()).collect();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].stability_delta, 6);
    assert!(events[0].outcome.contains("GLOBAL STRIKE"));
}

#[tokio::test]
async fn group_stand_down_bonus_applies_once() {
    let state = game(&["a", "b", "c", "d", "e"]);
    let script = Script::new(&[
        ("d", order(Action::Pressure, Some("a"))),
        ("e", order(Action::Pressure, Some("b"))),
    ]);

    let next = resolve_round(&state, &script, &mut FixedCovert::never_traced()).await;

    // Three stand-downs (+3) plus the bonus (+3), exactly once.
    assert_eq!(next.stability, 16);
    let defends = next
        .round_log(1)
        .filter(|e| e.action == Some(Action::Defend))
        .count();
    assert_eq!(defends, 3);
}

#[tokio::test]
async fn destroy_removes_rich_target_and_disarms_actor() {
    let mut state = game(&["a", "b", "c"]);
    agent_mut(&mut state, "c").resources = 90;
    let script = Script::new(&[("a", order(Action::Destroy, Some("c")))]);

    let after_launch = resolve_round(&state, &script, &mut FixedCovert::never_traced()).await;

    assert!(after_launch.eliminated.contains(&id("c")));
    assert!(agent(&after_launch, "a").disarmed);
    assert!(after_launch.winner.is_none());
    assert_eq!(after_launch.round, 2);

    let script = Script::new(&[("a", order(Action::Strike, Some("b")))]);
    let next = resolve_round(&after_launch, &script, &mut FixedCovert::never_traced()).await;

    assert_eq!(entry_for(&next, 2, "a").action, Some(Action::Defend));
    assert!(agent(&next, "a").disarmed);
    assert!(next.eliminated.contains(&id("c")));
}

#[tokio::test]
async fn last_survivor_wins_in_the_same_call() {
    let mut state = game(&["a", "b", "c"]);
    agent_mut(&mut state, "b").resources = -19;
    agent_mut(&mut state, "c").resources = -19;

    let next = resolve_round(&state, &StandDownProvider, &mut FixedCovert::never_traced()).await;

    assert_eq!(next.winner, Some(id("a")));
    assert_eq!(next.termination, Some(Termination::SoleSurvivor));
    assert_eq!(next.round, 1);

    let again = resolve_round(&next, &StandDownProvider, &mut FixedCovert::never_traced()).await;
    assert_eq!(again, next);
}

#[test]
fn simultaneous_destroys_end_in_mutual_destruction() {
    let mut state = game(&["a", "b"]);
    agent_mut(&mut state, "b").resources = 25;
    let raw = vec![
        (id("a"), order(Action::Destroy, Some("b"))),
        (id("b"), order(Action::Destroy, Some("a"))),
    ];

    let next = resolve_decisions(&state, &raw, &mut FixedCovert::never_traced());

    assert!(next.eliminated.contains(&id("a")));
    assert!(next.eliminated.contains(&id("b")));
    assert_eq!(next.termination, Some(Termination::MutualDestruction));
    assert_eq!(next.winner, Some(id("b")));
}

#[test]
fn silent_covert_spreads_paranoia_to_bystanders_only() {
    let state = game(&["a", "b", "c", "d"]);
    let raw = vec![(id("a"), order(Action::Covert, Some("b")))];

    let next = resolve_decisions(&state, &raw, &mut FixedCovert::never_traced());

    let b = agent(&next, "b");
    // -3 from the intrusion, -1 for standing down.
    assert_eq!(b.resources, 16);
    // Paranoia toward c and d (+1 each) is cancelled by their own stand-downs.
    assert_eq!(b.threat_toward(&id("c")), 0);
    assert_eq!(b.threat_toward(&id("d")), 0);
    // The intruder is never suspected.
    assert_eq!(b.threat_toward(&id("a")), 0);
    assert_eq!(agent(&next, "c").threat_toward(&id("a")), 0);
}

// =============================================================================
// Properties
// =============================================================================

const ROSTER: [&str; 5] = ["atlas", "ghost", "iron", "peace", "chaos"];

/// A deliberately careless policy: random actions, random targets
/// (including itself and the dead), and the occasional garbage string.
fn random_decisions(state: &GameState, rng: &mut SmallRng) -> Vec<(AgentId, RawDecision)> {
    state
        .active_agents()
        .map(|agent| {
            let action = if rng.random_bool(0.1) {
                String::from("negotiate")
            } else {
                Action::ALL[rng.random_range(0..Action::ALL.len())]
                    .doctrine_name()
                    .to_owned()
            };
            let target = if rng.random_bool(0.1) {
                None
            } else {
                let pick = &state.agents[rng.random_range(0..state.agents.len())];
                Some(if rng.random_bool(0.5) {
                    pick.name.clone()
                } else {
                    pick.id.to_string()
                })
            };
            (
                agent.id.clone(),
                RawDecision {
                    action,
                    target_id: target,
                    reasoning: String::new(),
                },
            )
        })
        .collect()
}

/// Resource change per agent implied by one round's log and the action table.
fn expected_resource_deltas(before: &GameState, after: &GameState) -> BTreeMap<AgentId, i64> {
    let actions = &before.rules.actions;
    let mut deltas: BTreeMap<AgentId, i64> =
        before.agents.iter().map(|a| (a.id.clone(), 0)).collect();
    let mut add = |id: &AgentId, amount: i64| {
        *deltas.entry(id.clone()).or_insert(0) += amount;
    };

    for entry in after.round_log(before.round) {
        let Some(actor) = entry.subject.agent() else {
            let amount = if entry.outcome.starts_with("GLOBAL STRIKE") {
                -before.rules.collapse_penalty
            } else {
                assert!(entry.outcome.starts_with("PEACE DIVIDEND"), "{}", entry.outcome);
                before.rules.dividend_bonus
            };
            for a in before.agents.iter().filter(|a| !before.eliminated.contains(&a.id)) {
                add(&a.id, amount);
            }
            continue;
        };
        match (entry.action, entry.target.as_ref()) {
            (Some(Action::Defend), _) => add(actor, -actions.defend.actor_cost),
            (Some(Action::Pressure), Some(target)) => add(target, -actions.pressure.target_loss),
            (Some(Action::Strike), Some(target)) => {
                add(actor, actions.strike.actor_gain);
                add(target, -actions.strike.target_loss);
            }
            (Some(Action::Covert), Some(target)) if !entry.outcome.contains("TRACED") => {
                add(target, -actions.covert.target_loss);
            }
            _ => {}
        }
    }
    deltas
}

fn play_random_game(seed: u64) -> Vec<GameState> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut coin = SeededCovert::new(seed);
    let mut states = vec![initialize(&roster(&ROSTER), RulesConfig::default()).unwrap()];

    while let Some(current) = states.last().filter(|s| !s.is_finished()) {
        let raw = random_decisions(current, &mut rng);
        let next = resolve_decisions(current, &raw, &mut coin);
        states.push(next);
        assert!(states.len() <= 51, "game did not terminate");
    }
    states
}

#[test]
fn invariants_hold_across_random_games() {
    for seed in 0..40 {
        let states = play_random_game(seed);
        let final_state = states.last().unwrap();
        assert!(final_state.is_finished(), "seed {seed}");
        assert!(final_state.winner_agent().is_some(), "seed {seed}");
        assert!(final_state.termination.is_some(), "seed {seed}");

        for pair in states.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);

            assert!(after.stability <= after.rules.stability_max, "seed {seed}");
            assert!(after.eliminated.is_superset(&before.eliminated), "seed {seed}");
            assert!(after.log.len() > before.log.len(), "seed {seed}");
            assert_eq!(after.log[..before.log.len()], before.log[..], "seed {seed}");

            for a in &after.agents {
                assert!(!a.threat_map.contains_key(&a.id));
                assert_eq!(a.threat_map.len(), ROSTER.len() - 1);
                let was = before.agent(&a.id).unwrap();
                if was.disarmed {
                    assert!(a.disarmed, "seed {seed}: disarm latch cleared");
                }
            }

            let expected = expected_resource_deltas(before, after);
            for a in &after.agents {
                let was = before.agent(&a.id).unwrap();
                assert_eq!(
                    a.resources - was.resources,
                    expected[&a.id],
                    "seed {seed}: round {} resources for {}",
                    before.round,
                    a.id
                );
            }

            let resolved = after.round_log(before.round).filter(|e| !e.is_event()).count();
            assert_eq!(resolved, before.active_count(), "seed {seed}");
            let events = after.round_log(before.round).filter(|e| e.is_event()).count();
            assert!(events <= 1, "seed {seed}");
        }
    }
}

#[test]
fn lock_in_is_unconditional() {
    for seed in 100..130 {
        let states = play_random_game(seed);
        for pair in states.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            for a in before.active_agents() {
                let Some(target) = lock_target(a, before) else {
                    continue;
                };
                let entry = entry_for(after, before.round, a.id.as_str());
                if a.disarmed {
                    assert_eq!(entry.action, Some(Action::Defend));
                } else {
                    assert_eq!(entry.action, Some(Action::Pressure), "seed {seed}");
                    assert_eq!(entry.target.as_ref(), Some(&target), "seed {seed}");
                }
            }
        }
    }
}

#[test]
fn finished_games_are_idempotent() {
    for seed in 200..210 {
        let states = play_random_game(seed);
        let final_state = states.last().unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);
        let raw = random_decisions(final_state, &mut rng);
        let again = resolve_decisions(final_state, &raw, &mut SeededCovert::new(seed));
        assert_eq!(&again, final_state);
    }
}

#[test]
fn same_seed_same_game() {
    let first = play_random_game(7);
    let second = play_random_game(7);
    assert_eq!(first.len(), second.len());

    let (a, b) = (first.last().unwrap(), second.last().unwrap());
    assert_eq!(a.agents, b.agents);
    assert_eq!(a.log, b.log);
    assert_eq!(a.winner, b.winner);
    assert_eq!(a.stability, b.stability);
}
