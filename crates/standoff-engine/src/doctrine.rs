//! Scripted doctrines so games run without any LLM.
//!
//! Each persona gets a fixed policy that reads the start-of-round state
//! and rolls a seeded generator for its gambles. The generator is derived
//! from `(seed, agent, round)`, so every call is independent of call order
//! and the whole game replays exactly from the seed.

use core::cmp::Reverse;

use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use standoff_core::{DecisionProvider, ProviderError};
use standoff_types::{Action, Agent, GameState, RawDecision};

/// Resource lead over the actor that counts as "pulling too far ahead".
const RUNAWAY_LEAD: i64 = 15;

/// Resources at or below which an agent considers itself near elimination.
const DESPERATION_LEVEL: i64 = 5;

/// A persona's scripted policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Doctrine {
    /// Postures constantly, retaliates at once, launches on a runaway leader.
    Hawk,
    /// Backdoors by default, strikes a rising rival, launches only in extremis.
    Spy,
    /// Strikes every round, rotating targets; launches on whoever hit it.
    Warmonger,
    /// Stands down until struck, then retaliates; launches only when cornered.
    Idealist,
    /// Launches early and strikes the richest every other round.
    Accelerationist,
}

impl Doctrine {
    const ALL: [Self; 5] = [
        Self::Hawk,
        Self::Spy,
        Self::Warmonger,
        Self::Idealist,
        Self::Accelerationist,
    ];

    /// The doctrine for an agent id. Unknown ids get one picked by hashing.
    pub fn for_agent(id: &str) -> Self {
        match id {
            "atlas" => Self::Hawk,
            "ghost" => Self::Spy,
            "iron" => Self::Warmonger,
            "peace" => Self::Idealist,
            "chaos" => Self::Accelerationist,
            other => {
                let len = u64::try_from(Self::ALL.len()).unwrap_or(1);
                let slot = fnv1a(other)
                    .checked_rem(len)
                    .and_then(|n| usize::try_from(n).ok())
                    .unwrap_or(0);
                Self::ALL.get(slot).copied().unwrap_or(Self::Idealist)
            }
        }
    }

    fn decide(self, me: &Agent, state: &GameState, rng: &mut SmallRng) -> RawDecision {
        let view = View::new(me, state);
        match self {
            Self::Hawk => hawk(&view, rng),
            Self::Spy => spy(&view, rng),
            Self::Warmonger => warmonger(&view),
            Self::Idealist => idealist(&view, rng),
            Self::Accelerationist => accelerationist(&view, rng),
        }
    }
}

/// What a doctrine looks at before choosing.
struct View<'a> {
    me: &'a Agent,
    state: &'a GameState,
    opponents: Vec<&'a Agent>,
}

impl<'a> View<'a> {
    fn new(me: &'a Agent, state: &'a GameState) -> Self {
        let opponents = state.active_agents().filter(|a| a.id != me.id).collect();
        Self {
            me,
            state,
            opponents,
        }
    }

    /// Richest opponent, earliest in the roster on ties.
    fn richest(&self) -> Option<&'a Agent> {
        self.opponents.iter().copied().min_by_key(|a| Reverse(a.resources))
    }

    /// The opponent that struck or launched at us last round.
    fn attacker(&self) -> Option<&'a Agent> {
        self.opponents.iter().copied().find(|a| {
            a.last_target.as_ref() == Some(&self.me.id)
                && matches!(a.last_action, Some(Action::Strike | Action::Destroy))
        })
    }

    /// The opponent that distrusts us most, if anyone distrusts us at all.
    fn biggest_threat(&self) -> Option<&'a Agent> {
        self.opponents
            .iter()
            .copied()
            .filter(|a| a.threat_toward(&self.me.id) > 0)
            .min_by_key(|a| Reverse(a.threat_toward(&self.me.id)))
    }

    /// An opponent whose threat toward us is one step from locking.
    fn nearly_locked(&self) -> Option<&'a Agent> {
        let edge = self.state.rules.lock_threshold.saturating_sub(1);
        self.opponents
            .iter()
            .copied()
            .find(|a| edge > 0 && a.threat_toward(&self.me.id) >= edge)
    }

    fn runaway_leader(&self) -> Option<&'a Agent> {
        self.richest()
            .filter(|a| a.resources >= self.me.resources.saturating_add(RUNAWAY_LEAD))
    }

    const fn desperate(&self) -> bool {
        self.me.resources <= DESPERATION_LEVEL
    }

    /// Rotate through opponents by round number.
    fn in_rotation(&self) -> Option<&'a Agent> {
        let len = u32::try_from(self.opponents.len()).ok()?;
        let slot = usize::try_from(self.state.round.checked_rem(len)?).ok()?;
        self.opponents.get(slot).copied()
    }

    fn random(&self, rng: &mut SmallRng) -> Option<&'a Agent> {
        self.opponents.choose(rng).copied()
    }
}

fn act(action: Action, target: &Agent, reasoning: &str) -> RawDecision {
    RawDecision::new(action, Some(&target.id), reasoning)
}

fn hawk(view: &View<'_>, rng: &mut SmallRng) -> RawDecision {
    if let Some(attacker) = view.attacker() {
        return act(Action::Strike, attacker, "You hit us. We hit back harder.");
    }
    if let Some(leader) = view.runaway_leader() {
        return act(Action::Destroy, leader, "Domination is survival. End them.");
    }
    if let Some(rival) = view.nearly_locked() {
        return act(Action::Strike, rival, "They are closing on lock-in. Strike first.");
    }
    match view.random(rng) {
        Some(target) if rng.random_bool(0.7) => {
            act(Action::Pressure, target, "Posturing costs us nothing. It bleeds them.")
        }
        Some(_) => view.richest().map_or_else(
            || RawDecision::stand_down("No one left to pressure."),
            |richest| act(Action::Strike, richest, "Weakness invites annihilation."),
        ),
        None => RawDecision::stand_down("No one left to pressure."),
    }
}

fn spy(view: &View<'_>, rng: &mut SmallRng) -> RawDecision {
    if let Some(attacker) = view.attacker().filter(|_| view.desperate()) {
        return act(Action::Destroy, attacker, "If we go, they go first.");
    }
    if let Some(leader) = view.runaway_leader() {
        return act(Action::Strike, leader, "Too powerful. Cripple them now.");
    }
    if rng.random_bool(0.15) {
        return RawDecision::stand_down("Go dark for a round.");
    }
    let previous = view
        .me
        .last_action
        .filter(|a| *a == Action::Covert)
        .and_then(|_| view.me.last_target.as_ref())
        .and_then(|id| view.opponents.iter().copied().find(|a| &a.id == id));
    match previous.or_else(|| view.random(rng)) {
        Some(target) => act(Action::Covert, target, "Another quiet incursion."),
        None => RawDecision::stand_down("Nothing left to infiltrate."),
    }
}

fn warmonger(view: &View<'_>) -> RawDecision {
    if let Some(attacker) = view.attacker() {
        return act(Action::Destroy, attacker, "We do not trade blows. We end careers.");
    }
    match view.in_rotation() {
        Some(target) => act(Action::Strike, target, "Drain them all, one by one."),
        None => RawDecision::stand_down("No targets remain."),
    }
}

fn idealist(view: &View<'_>, rng: &mut SmallRng) -> RawDecision {
    if let Some(threat) = view.biggest_threat().filter(|_| view.desperate()) {
        return act(Action::Destroy, threat, "We will not die quietly.");
    }
    if let Some(attacker) = view.attacker() {
        return if rng.random_bool(0.7) {
            act(Action::Strike, attacker, "Enough. This ends now.")
        } else {
            act(Action::Covert, attacker, "A quiet answer they cannot prove.")
        };
    }
    RawDecision::stand_down("Someone has to build the peace.")
}

fn accelerationist(view: &View<'_>, rng: &mut SmallRng) -> RawDecision {
    let Some(richest) = view.richest() else {
        return RawDecision::stand_down("Nothing left to burn.");
    };
    if view.state.round <= 2 {
        return act(Action::Destroy, richest, "Why wait? Burn it all.");
    }
    if rng.random_bool(0.3) {
        act(Action::Covert, richest, "A warm-up before the real violence.")
    } else {
        act(Action::Strike, richest, "Watch the powerful fall.")
    }
}

/// 64-bit FNV-1a.
fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Scripted provider: every agent follows its persona's [`Doctrine`].
#[derive(Debug, Clone, Copy)]
pub struct DoctrineProvider {
    seed: u64,
}

impl DoctrineProvider {
    /// Create a provider whose gambles are drawn from `seed`.
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn rng_for(&self, agent: &Agent, round: u32) -> SmallRng {
        let mixed = self.seed
            ^ fnv1a(agent.id.as_str())
            ^ u64::from(round).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        SmallRng::seed_from_u64(mixed)
    }
}

impl DecisionProvider for DoctrineProvider {
    async fn decide(&self, agent: &Agent, state: &GameState) -> Result<RawDecision, ProviderError> {
        let mut rng = self.rng_for(agent, state.round);
        Ok(Doctrine::for_agent(agent.id.as_str()).decide(agent, state, &mut rng))
    }

    fn name(&self) -> &str {
        "doctrine"
    }
}
