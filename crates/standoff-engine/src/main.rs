//! Standoff engine binary.
//!
//! Wires together configuration, the roster, a decision provider, and the
//! game loop, then plays one game to the end.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `standoff-config.yaml` (or `STANDOFF_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Load the roster and build the opening state
//! 4. Select the decision provider
//! 5. Run the game loop
//! 6. Log the result

mod doctrine;
mod error;
mod provider;
mod round_log;
mod roster;

use std::path::PathBuf;
use std::time::Duration;

use standoff_core::config::EngineConfig;
use standoff_core::{SeededCovert, initialize, log_game_end, run_game};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::provider::EngineProvider;
use crate::round_log::RoundLogger;

/// Default location of the configuration file.
const DEFAULT_CONFIG_PATH: &str = "standoff-config.yaml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path();
    let config = load_config(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        game = config.game.name,
        seed = config.game.seed,
        max_rounds = config.rules.max_rounds,
        round_interval_ms = config.game.round_interval_ms,
        path = %config_path.display(),
        "Configuration loaded"
    );

    let roster = roster::load_roster(&config_path)?;
    let state = initialize(&roster, config.rules.clone())?;
    let provider = EngineProvider::from_config(&config)?;
    let mut coin = SeededCovert::new(config.game.seed);

    let result = run_game(
        state,
        &provider,
        &mut coin,
        &mut RoundLogger,
        Duration::from_millis(config.game.round_interval_ms),
    )
    .await;

    log_game_end(&result);
    Ok(())
}

fn config_path() -> PathBuf {
    std::env::var_os("STANDOFF_CONFIG").map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load configuration, falling back to defaults when the file is absent.
fn load_config(path: &std::path::Path) -> Result<EngineConfig, EngineError> {
    if path.exists() {
        Ok(EngineConfig::from_file(path)?)
    } else {
        let mut config = EngineConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}
