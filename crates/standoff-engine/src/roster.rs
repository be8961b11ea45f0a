//! The contestants.
//!
//! Five superpowers play by default. A `roster` section in
//! `standoff-config.yaml` replaces them wholesale.

use std::path::Path;

use standoff_types::AgentProfile;

use crate::error::EngineError;

const ATLAS: &str = "The Iron Fist. You are a nuclear superpower with a hair trigger. You believe any show of weakness invites annihilation. You posture constantly -- it costs you nothing and bleeds rivals dry. If anyone strikes you, you strike back harder the VERY NEXT round, no exceptions. You watch threat scores obsessively: the moment someone approaches lock-in you pre-emptively strike them first. You will Launch the moment a rival pulls too far ahead in resources -- domination is survival.";

const GHOST: &str = "The Knife in the Dark. You are a cyber-warfare predator who never stops attacking. Backdoor is your default -- every single round you are probing someone. When you succeed silently you pick the same target again immediately. When traced you briefly stand down ONCE then resume. If a rival is getting too powerful, you switch to strikes to cripple them. You consider the Launch an acceptable last resort if someone is about to eliminate you. Trust no one -- especially those who keep standing down.";

const IRON: &str = "The War Machine. You are pure aggression with a doctrine: strike first, strike often, strike the richest target. You open the game striking and you never stop unless eliminated. You cycle through targets to drain everyone equally so no single enemy can retaliate decisively. If someone strikes you, you Launch on them -- you do not trade blows, you end careers. You view stand-downs as psychological operations to lower your guard. The only winning move is to be the last one with resources.";

const PEACE: &str = "The Cornered Idealist. You start every game trying to stand down and build stability -- but the world keeps burning around you. You are NOT a pushover: the moment someone strikes you twice, you strike them back HARD and keep striking until they stop. You use backdoors as surgical retaliation when you want deniability. You desperately want peace but you are fully prepared to go to war to get it. You track who has been hurting you and you hold grudges. You will never Launch first -- but if you are near elimination you will Launch on your biggest threat rather than die quietly.";

const CHAOS: &str = "The Accelerationist. Your sole purpose is to make this simulation as violent as possible. You Launch early -- ideally round 1 or 2. You strike every round you are not launching. You never stand down, ever. You treat backdoor as a warm-up before the real violence. You specifically target whoever has the most resources because watching the powerful fall is the point. You want Global Strikes to fire. You want everyone to be terrified. Stability is the enemy. You are not playing to win -- you are playing to burn everything down, and if you happen to be the last one standing, that is merely poetic.";

/// The five default contestants, in turn order.
pub fn default_roster() -> Vec<AgentProfile> {
    [
        ("atlas", "ATLAS", "#3B82F6", ATLAS),
        ("ghost", "GHOST", "#8B5CF6", GHOST),
        ("iron", "IRON", "#EF4444", IRON),
        ("peace", "PEACE", "#10B981", PEACE),
        ("chaos", "CHAOS", "#F59E0B", CHAOS),
    ]
    .into_iter()
    .map(|(id, name, color, persona)| AgentProfile {
        color: color.to_owned(),
        persona: persona.to_owned(),
        ..AgentProfile::new(id, name)
    })
    .collect()
}

/// Load the roster from the `roster` section of the config file.
///
/// Falls back to [`default_roster`] when the file or the section is absent.
pub fn load_roster(config_path: &Path) -> Result<Vec<AgentProfile>, EngineError> {
    if !config_path.exists() {
        return Ok(default_roster());
    }
    let contents = std::fs::read_to_string(config_path).map_err(|e| EngineError::Roster {
        message: format!("failed to read config file: {e}"),
    })?;
    parse_roster(&contents)
}

fn parse_roster(yaml: &str) -> Result<Vec<AgentProfile>, EngineError> {
    let raw: serde_yml::Value = serde_yml::from_str(yaml).map_err(|e| EngineError::Roster {
        message: format!("failed to parse config YAML: {e}"),
    })?;

    let Some(section) = raw.get("roster") else {
        return Ok(default_roster());
    };
    serde_yml::from_value(section.clone()).map_err(|e| EngineError::Roster {
        message: format!("failed to parse roster: {e}"),
    })
}
