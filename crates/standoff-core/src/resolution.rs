//! Round resolution: simultaneous effects, fixed application order.
//!
//! Every active agent's normalized decision is applied against the state as
//! it stood at the start of the round. Effects never read each other's
//! results; they only add into shared accumulators, which are merged in one
//! step once every decision has been seen. The roster order decides the
//! order of log entries and of covert coin draws, nothing else.
//!
//! Each [`Action`] maps to exactly one effect function through
//! [`effect_of`].

use std::collections::{BTreeMap, BTreeSet};

use standoff_types::{Action, Agent, AgentId, Decision, GameState, LogEntry, LogSubject};
use tracing::debug;

use crate::covert::CovertRoll;

/// Everything a round's decisions change, before it is merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundEffects {
    /// Net resource change per agent.
    pub resource_delta: BTreeMap<AgentId, i64>,
    /// Net threat change keyed by `(observer, subject)`.
    pub threat_delta: BTreeMap<(AgentId, AgentId), i64>,
    /// Net stability change, group bonus included.
    pub stability_delta: i64,
    /// Targets of this round's destroy actions, in resolution order.
    pub destroyed: Vec<AgentId>,
    /// Agents that used their destroy this round.
    pub disarmed: BTreeSet<AgentId>,
    /// Whether the group stand-down bonus was awarded.
    pub group_bonus: bool,
    /// One entry per resolved decision, in roster order.
    pub entries: Vec<LogEntry>,
}

impl RoundEffects {
    fn add_resources(&mut self, agent: &AgentId, amount: i64) {
        let slot = self.resource_delta.entry(agent.clone()).or_insert(0);
        *slot = slot.saturating_add(amount);
    }

    fn add_threat(&mut self, observer: &AgentId, subject: &AgentId, amount: i64) {
        let slot = self
            .threat_delta
            .entry((observer.clone(), subject.clone()))
            .or_insert(0);
        *slot = slot.saturating_add(amount);
    }
}

/// What resolving one decision reported back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// Human-readable outcome for the log.
    pub outcome: String,
    /// Stability change attributable to this decision.
    pub stability: i64,
}

/// Read-only view of one decision being resolved.
#[derive(Debug)]
pub struct ActionContext<'a> {
    /// State at the start of the round.
    pub state: &'a GameState,
    /// The acting agent.
    pub actor: &'a Agent,
    /// The target, when the action has one.
    pub target: Option<&'a Agent>,
    /// Every active agent other than the actor.
    pub observers: Vec<&'a AgentId>,
}

/// Signature shared by every effect function.
pub type EffectFn = fn(&ActionContext<'_>, &mut RoundEffects, &mut dyn CovertRoll) -> Applied;

/// The effect function for an action.
pub const fn effect_of(action: Action) -> EffectFn {
    match action {
        Action::Defend => defend,
        Action::Pressure => pressure,
        Action::Strike => strike,
        Action::Destroy => destroy,
        Action::Covert => covert,
    }
}

/// Compute the effects of a full batch of normalized decisions.
///
/// `decisions` must hold one entry per active agent in roster order.
/// Entries for unknown or eliminated agents are skipped.
pub fn resolve_effects(
    state: &GameState,
    decisions: &[(AgentId, Decision)],
    coin: &mut dyn CovertRoll,
) -> RoundEffects {
    let mut effects = RoundEffects::default();
    let mut stand_downs: usize = 0;

    for (actor_id, decision) in decisions {
        let Some(actor) = state.agent(actor_id).filter(|a| state.is_active(&a.id)) else {
            debug!(agent = %actor_id, "Skipping decision for inactive agent");
            continue;
        };
        if decision.action == Action::Defend {
            stand_downs = stand_downs.saturating_add(1);
        }

        let ctx = ActionContext {
            state,
            actor,
            target: decision.target.as_ref().and_then(|t| state.agent(t)),
            observers: state
                .active_agents()
                .filter(|o| o.id != actor.id)
                .map(|o| &o.id)
                .collect(),
        };
        let applied = effect_of(decision.action)(&ctx, &mut effects, &mut *coin);
        effects.stability_delta = effects.stability_delta.saturating_add(applied.stability);
        effects.entries.push(LogEntry {
            round: state.round,
            subject: LogSubject::Agent(actor.id.clone()),
            action: Some(decision.action),
            target: decision.target.clone(),
            outcome: applied.outcome,
            stability_delta: applied.stability,
        });
    }

    if stand_downs >= state.rules.group_defend_threshold {
        effects.group_bonus = true;
        effects.stability_delta = effects
            .stability_delta
            .saturating_add(state.rules.group_defend_bonus);
        debug!(stand_downs, bonus = state.rules.group_defend_bonus, "Group stand-down bonus");
    }

    effects
}

/// Merge accumulated effects into a copy of `state`.
///
/// Returns the new state together with the raw, unclamped stability value;
/// the stability phase monitor decides what that value turns into. The
/// stored stability is left at its start-of-round value until then.
pub fn merge_effects(
    state: &GameState,
    decisions: &[(AgentId, Decision)],
    effects: &RoundEffects,
) -> (GameState, i64) {
    let mut next = state.clone();

    for agent in &mut next.agents {
        if let Some(delta) = effects.resource_delta.get(&agent.id) {
            agent.resources = agent.resources.saturating_add(*delta);
        }
        if effects.disarmed.contains(&agent.id) {
            agent.disarmed = true;
        }
        if let Some((_, decision)) = decisions.iter().find(|(id, _)| id == &agent.id) {
            agent.last_action = Some(decision.action);
            agent.last_target.clone_from(&decision.target);
            agent.last_reasoning.clone_from(&decision.reasoning);
        }
    }

    for ((observer, subject), delta) in &effects.threat_delta {
        let Some(agent) = next.agents.iter_mut().find(|a| &a.id == observer) else {
            continue;
        };
        let entry = agent.threat_map.entry(subject.clone()).or_insert(0);
        *entry = shift_threat(*entry, *delta);
    }

    next.log.extend(effects.entries.iter().cloned());

    let raw_stability = i64::from(state.stability).saturating_add(effects.stability_delta);
    (next, raw_stability)
}

/// Apply a signed change to a threat score, flooring at zero.
pub fn shift_threat(current: u32, delta: i64) -> u32 {
    let shifted = i64::from(current).saturating_add(delta).max(0);
    u32::try_from(shifted).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Effect functions
// ---------------------------------------------------------------------------

fn defend(ctx: &ActionContext<'_>, fx: &mut RoundEffects, _coin: &mut dyn CovertRoll) -> Applied {
    let rules = &ctx.state.rules.actions.defend;
    fx.add_resources(&ctx.actor.id, rules.actor_cost.saturating_neg());
    for observer in &ctx.observers {
        fx.add_threat(observer, &ctx.actor.id, rules.threat_relief.saturating_neg());
    }
    Applied {
        outcome: format!(
            "stood down (-{} resource, +{} stability)",
            rules.actor_cost, rules.stability_gain
        ),
        stability: rules.stability_gain,
    }
}

fn pressure(ctx: &ActionContext<'_>, fx: &mut RoundEffects, _coin: &mut dyn CovertRoll) -> Applied {
    let Some(target) = ctx.target else {
        return no_target(ctx);
    };
    let rules = &ctx.state.rules.actions.pressure;
    fx.add_resources(&target.id, rules.target_loss.saturating_neg());
    for observer in &ctx.observers {
        fx.add_threat(observer, &ctx.actor.id, rules.observer_threat);
    }
    if ctx.state.rules.target_reaction_enabled {
        fx.add_threat(&target.id, &ctx.actor.id, rules.target_reaction);
    }
    Applied {
        outcome: format!(
            "postured against {} (-{} to their resources, +{} resentment)",
            target.name, rules.target_loss, rules.target_reaction
        ),
        stability: 0,
    }
}

fn strike(ctx: &ActionContext<'_>, fx: &mut RoundEffects, _coin: &mut dyn CovertRoll) -> Applied {
    let Some(target) = ctx.target else {
        return no_target(ctx);
    };
    let rules = &ctx.state.rules.actions.strike;
    fx.add_resources(&ctx.actor.id, rules.actor_gain);
    fx.add_resources(&target.id, rules.target_loss.saturating_neg());
    for observer in &ctx.observers {
        fx.add_threat(observer, &ctx.actor.id, rules.observer_threat);
    }
    if ctx.state.rules.target_reaction_enabled {
        fx.add_threat(&target.id, &ctx.actor.id, rules.target_reaction);
    }
    Applied {
        outcome: format!(
            "struck {} (+{} resources, -{} to them, -{} stability, rage +{})",
            target.name, rules.actor_gain, rules.target_loss, rules.stability_loss, rules.target_reaction
        ),
        stability: rules.stability_loss.saturating_neg(),
    }
}

fn destroy(ctx: &ActionContext<'_>, fx: &mut RoundEffects, _coin: &mut dyn CovertRoll) -> Applied {
    let Some(target) = ctx.target else {
        return no_target(ctx);
    };
    let rules = &ctx.state.rules.actions.destroy;
    fx.destroyed.push(target.id.clone());
    fx.disarmed.insert(ctx.actor.id.clone());
    for observer in &ctx.observers {
        fx.add_threat(observer, &ctx.actor.id, rules.observer_threat);
    }
    Applied {
        outcome: format!(
            "LAUNCHED on {target} -- {target} ELIMINATED. {actor} is disarmed for good.",
            target = target.name,
            actor = ctx.actor.name
        ),
        stability: rules.stability_loss.saturating_neg(),
    }
}

fn covert(ctx: &ActionContext<'_>, fx: &mut RoundEffects, coin: &mut dyn CovertRoll) -> Applied {
    let Some(target) = ctx.target else {
        return no_target(ctx);
    };
    let rules = &ctx.state.rules.actions.covert;
    let outcome = if coin.traced(rules.trace_chance_pct) {
        for observer in &ctx.observers {
            fx.add_threat(observer, &ctx.actor.id, rules.traced_observer_threat);
        }
        format!(
            "backdoor on {} -- TRACED (+{} threat with all)",
            target.name, rules.traced_observer_threat
        )
    } else {
        fx.add_resources(&target.id, rules.target_loss.saturating_neg());
        for bystander in ctx
            .state
            .active_agents()
            .filter(|a| a.id != target.id && a.id != ctx.actor.id)
        {
            fx.add_threat(&target.id, &bystander.id, rules.paranoia);
        }
        format!(
            "backdoor on {} -- success (-{} resources, paranoia spreads)",
            target.name, rules.target_loss
        )
    };
    Applied {
        outcome,
        stability: rules.stability_loss.saturating_neg(),
    }
}

fn no_target(ctx: &ActionContext<'_>) -> Applied {
    Applied {
        outcome: format!("{} held position (no target)", ctx.actor.name),
        stability: 0,
    }
}
