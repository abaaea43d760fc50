//! Replay and verification CLI for Skirmish tick transitions.
//!
//! Reads JSON inputs from disk, runs them through the engine, and prints the
//! result as JSON on stdout. Logs go to stderr so the output can be piped.
//!
//! ```text
//! skirmish-replay apply  <state.json> <decisions.json>
//! skirmish-replay verify <state.json> <decisions.json> <claimed.json>
//! skirmish-replay battle <sides.json> <seed>
//! ```
//!
//! Engine configuration is read from the file named by `SKIRMISH_CONFIG`,
//! else `skirmish-config.yaml` in the working directory, else defaults.
//! `verify` exits non-zero when the claim diverges.

mod error;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use skirmish_core::config::EngineConfig;
use skirmish_core::{apply_transition, resolve_battle, verify_transition};
use skirmish_types::{BattleSide, DecisionBatch, TransitionOutcome, WorldSnapshot};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::ReplayError;

const CONFIG_ENV: &str = "SKIRMISH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "skirmish-config.yaml";

/// Skirmish replay - apply, verify, and resolve engine ticks offline
#[derive(Parser, Debug)]
#[command(name = "skirmish-replay")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Apply one tick and print the outcome
    Apply {
        /// World snapshot before the tick
        state: PathBuf,
        /// Decision batch for the tick
        decisions: PathBuf,
    },

    /// Re-derive one tick and compare it with a claimed outcome
    Verify {
        /// World snapshot before the tick
        state: PathBuf,
        /// Decision batch for the tick
        decisions: PathBuf,
        /// Outcome to check
        claimed: PathBuf,
    },

    /// Resolve one battle with a seeded generator
    Battle {
        /// JSON file holding `side_a` and `side_b`
        sides: PathBuf,
        /// Seed for the battle draws
        seed: u64,
    },
}

/// Input file for the `battle` subcommand.
#[derive(Debug, Deserialize)]
struct BattleRequest {
    side_a: BattleSide,
    side_b: BattleSide,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if an input cannot be loaded or the engine rejects the
/// inputs. Malformed arguments exit through clap.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config()?;
    info!(
        map_radius = config.map.radius,
        interaction_range = config.interaction.range,
        invalid_movement = ?config.interaction.invalid_movement,
        casualty_probability = config.battle.casualty_probability,
        "Configuration loaded"
    );

    let output = run(&cli.command, &config)?;
    println!("{output}");
    Ok(())
}

/// Execute a command and return the JSON to print.
fn run(command: &Commands, config: &EngineConfig) -> Result<String, ReplayError> {
    match command {
        Commands::Apply { state, decisions } => {
            let current: WorldSnapshot = read_json(state)?;
            let decisions: DecisionBatch = read_json(decisions)?;
            let outcome = apply_transition(config, &current, &decisions)?;
            Ok(serde_json::to_string_pretty(&outcome)?)
        }
        Commands::Verify {
            state,
            decisions,
            claimed,
        } => {
            let previous: WorldSnapshot = read_json(state)?;
            let decisions: DecisionBatch = read_json(decisions)?;
            let claimed: TransitionOutcome = read_json(claimed)?;
            verify_transition(config, &previous, &decisions, &claimed)?;
            Ok(serde_json::to_string_pretty(&serde_json::json!({ "verified": true }))?)
        }
        Commands::Battle { sides, seed } => {
            let request: BattleRequest = read_json(sides)?;
            let mut rng = StdRng::seed_from_u64(*seed);
            let outcome = resolve_battle(&request.side_a, &request.side_b, &config.battle, &mut rng)?;
            Ok(serde_json::to_string_pretty(&outcome)?)
        }
    }
}

/// Load engine configuration.
///
/// An explicit `SKIRMISH_CONFIG` path must exist. Otherwise the default path
/// is used if present, and built-in defaults if not.
fn load_config() -> Result<EngineConfig, ReplayError> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(EngineConfig::from_file(Path::new(&path))?);
    }

    let config_path = Path::new(DEFAULT_CONFIG_PATH);
    if config_path.exists() {
        Ok(EngineConfig::from_file(config_path)?)
    } else {
        info!("Config file not found, using defaults");
        Ok(EngineConfig::default())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ReplayError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ReplayError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ReplayError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use skirmish_types::{BattleOutcome, BattleWinner};
    use tempfile::TempDir;

    use super::*;

    fn parse(args: &[&str]) -> Result<Commands, clap::Error> {
        let argv = std::iter::once("skirmish-replay").chain(args.iter().copied());
        Cli::try_parse_from(argv).map(|cli| cli.command)
    }

    /// Write `contents` to `name` inside `dir`.
    fn make_input(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    const STATE: &str = r#"{
        "agents": {
            "agentA": { "id": "agentA", "position": { "x": 0, "y": 0 } },
            "agentB": { "id": "agentB", "position": { "x": 1, "y": 1 } }
        }
    }"#;

    const DECISIONS: &str = r#"{
        "agentA": { "interaction": "alliance", "with_agent": "agentB" },
        "agentB": { "interaction": "alliance", "with_agent": "agentA" }
    }"#;

    // -----------------------------------------------------------------------
    // Argument parsing
    // -----------------------------------------------------------------------

    #[test]
    fn parses_each_subcommand() {
        assert_eq!(
            parse(&["apply", "s.json", "d.json"]).unwrap(),
            Commands::Apply {
                state: PathBuf::from("s.json"),
                decisions: PathBuf::from("d.json"),
            }
        );
        assert_eq!(
            parse(&["verify", "s.json", "d.json", "c.json"]).unwrap(),
            Commands::Verify {
                state: PathBuf::from("s.json"),
                decisions: PathBuf::from("d.json"),
                claimed: PathBuf::from("c.json"),
            }
        );
        assert_eq!(
            parse(&["battle", "sides.json", "42"]).unwrap(),
            Commands::Battle {
                sides: PathBuf::from("sides.json"),
                seed: 42,
            }
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["apply", "only-one.json"]).is_err());
        assert!(parse(&["verify", "s.json", "d.json"]).is_err());
        assert!(parse(&["battle", "sides.json", "-3"]).is_err());
        assert!(parse(&["battle", "sides.json", "seven"]).is_err());
        assert!(parse(&["replay", "s.json"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    #[test]
    fn apply_then_verify_round_trips() {
        let dir = TempDir::new().unwrap();
        let config = EngineConfig::default();
        let state = make_input(&dir, "state.json", STATE);
        let decisions = make_input(&dir, "decisions.json", DECISIONS);

        let output = run(
            &Commands::Apply {
                state: state.clone(),
                decisions: decisions.clone(),
            },
            &config,
        )
        .unwrap();
        let outcome: TransitionOutcome = serde_json::from_str(&output).unwrap();
        assert_eq!(outcome.summary.interactions.len(), 1);

        let claimed = make_input(&dir, "claimed.json", &output);
        let verified = run(
            &Commands::Verify {
                state,
                decisions,
                claimed,
            },
            &config,
        )
        .unwrap();
        assert!(verified.contains("\"verified\": true"));
    }

    #[test]
    fn verify_rejects_a_forged_claim() {
        let dir = TempDir::new().unwrap();
        let config = EngineConfig::default();
        let state = make_input(&dir, "state.json", STATE);
        let decisions = make_input(&dir, "decisions.json", DECISIONS);
        // Claims nothing happened.
        let claimed = make_input(
            &dir,
            "claimed.json",
            &format!(r#"{{ "snapshot": {STATE}, "summary": {{ "movements": [], "interactions": [] }} }}"#),
        );

        let err = run(
            &Commands::Verify {
                state,
                decisions,
                claimed,
            },
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, ReplayError::Verification { .. }));
    }

    #[test]
    fn battle_is_reproducible_from_seed() {
        let dir = TempDir::new().unwrap();
        let config = EngineConfig::default();
        let sides = make_input(
            &dir,
            "sides.json",
            r#"{
                "side_a": { "combatants": [{ "agent_id": "agentA", "balance": "10" }] },
                "side_b": { "combatants": [{ "agent_id": "agentB", "balance": "0" }] }
            }"#,
        );
        let command = Commands::Battle { sides, seed: 9 };

        let first = run(&command, &config).unwrap();
        let second = run(&command, &config).unwrap();
        assert_eq!(first, second);

        let outcome: BattleOutcome = serde_json::from_str(&first).unwrap();
        assert_eq!(outcome.winner, BattleWinner::SideA);
    }

    #[test]
    fn malformed_input_reports_parse_error() {
        let dir = TempDir::new().unwrap();
        let state = make_input(&dir, "state.json", "{ not json");
        let decisions = make_input(&dir, "decisions.json", DECISIONS);

        let err = run(
            &Commands::Apply { state, decisions },
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ReplayError::Parse { .. }));
    }

    #[test]
    fn missing_input_reports_path() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("absent.json");
        let err = run(
            &Commands::Apply {
                state: state.clone(),
                decisions: state.clone(),
            },
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains(&state.display().to_string()));
    }
}
