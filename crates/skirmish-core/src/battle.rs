//! Battle outcome resolution.
//!
//! Two sides of combatants fight. Each side's strength is the sum of its
//! combatants' balances, and side A wins with probability
//! `strength_a / (strength_a + strength_b)`. Every combatant on the losing
//! side is then independently killed in action with the configured casualty
//! probability.
//!
//! All randomness comes from the caller's generator. Draws are consumed in a
//! fixed order (one win draw, then one casualty draw per loser in side
//! order), so a seeded generator reproduces the outcome exactly.

use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use skirmish_types::{BattleOutcome, BattleSide, BattleWinner, DefeatedAgent};
use tracing::{debug, warn};

use crate::config::BattleConfig;
use crate::error::BattleError;

/// Resolve a battle between `side_a` and `side_b`.
///
/// # Errors
///
/// Returns [`BattleError::InvalidCasualtyProbability`] for a probability
/// outside `[0, 1]`, [`BattleError::NegativeBalance`] for a negative balance,
/// [`BattleError::OverlappingSides`] if an agent fights on both sides, and
/// [`BattleError::DegenerateBattle`] if both sides have zero strength.
pub fn resolve_battle(
    side_a: &BattleSide,
    side_b: &BattleSide,
    config: &BattleConfig,
    rng: &mut impl Rng,
) -> Result<BattleOutcome, BattleError> {
    let casualty_probability = config.casualty_probability;
    if !(casualty_probability.is_finite() && (0.0..=1.0).contains(&casualty_probability)) {
        return Err(BattleError::InvalidCasualtyProbability {
            value: casualty_probability.to_string(),
        });
    }
    validate_sides(side_a, side_b)?;

    let strength_a = side_strength(side_a, "side A strength")?;
    let strength_b = side_strength(side_b, "side B strength")?;
    let total = strength_a
        .checked_add(strength_b)
        .ok_or_else(|| overflow("total strength"))?;

    if total.is_zero() {
        warn!(
            side_a = side_a.len(),
            side_b = side_b.len(),
            "Battle has no strength on either side"
        );
        return Err(BattleError::DegenerateBattle);
    }

    let win_probability = strength_a
        .checked_div(total)
        .and_then(|ratio| ratio.to_f64())
        .ok_or_else(|| overflow("win probability"))?;

    let draw: f64 = rng.random();
    let (winner, winning_side, losing_side) = if draw < win_probability {
        (BattleWinner::SideA, side_a, side_b)
    } else {
        (BattleWinner::SideB, side_b, side_a)
    };

    let defeated_agents: Vec<DefeatedAgent> = losing_side
        .combatants
        .iter()
        .map(|combatant| DefeatedAgent {
            combatant: combatant.clone(),
            killed_in_action: rng.random::<f64>() < casualty_probability,
        })
        .collect();

    debug!(
        ?winner,
        %strength_a,
        %strength_b,
        win_probability,
        defeated = defeated_agents.len(),
        killed = defeated_agents.iter().filter(|d| d.killed_in_action).count(),
        "Battle resolved"
    );

    Ok(BattleOutcome {
        winner,
        winning_side: winning_side.clone(),
        defeated_agents,
    })
}

/// Reject negative balances and agents listed on both sides.
fn validate_sides(side_a: &BattleSide, side_b: &BattleSide) -> Result<(), BattleError> {
    for combatant in side_a.combatants.iter().chain(&side_b.combatants) {
        if combatant.balance < Decimal::ZERO {
            return Err(BattleError::NegativeBalance {
                agent_id: combatant.agent_id.clone(),
                balance: combatant.balance.to_string(),
            });
        }
    }

    if let Some(shared) = side_a
        .combatants
        .iter()
        .find(|combatant| side_b.contains(&combatant.agent_id))
    {
        return Err(BattleError::OverlappingSides {
            agent_id: shared.agent_id.clone(),
        });
    }

    Ok(())
}

fn side_strength(side: &BattleSide, context: &str) -> Result<Decimal, BattleError> {
    side.total_balance().ok_or_else(|| overflow(context))
}

fn overflow(context: &str) -> BattleError {
    BattleError::ArithmeticOverflow {
        context: context.to_owned(),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::indexing_slicing
)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{RngCore, SeedableRng};
    use rust_decimal_macros::dec;
    use skirmish_types::{AgentId, Combatant};

    use super::*;

    /// Generator that replays a fixed list of unit-interval draws, then
    /// repeats the last one.
    struct ScriptedRng {
        draws: Vec<u64>,
        next: usize,
    }

    impl ScriptedRng {
        fn new(units: &[f64]) -> Self {
            Self {
                draws: units.iter().map(|u| unit_to_bits(*u)).collect(),
                next: 0,
            }
        }

        fn constant(unit: f64) -> Self {
            Self::new(&[unit])
        }
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            (self.next_u64() >> 32) as u32
        }

        fn next_u64(&mut self) -> u64 {
            let value = self
                .draws
                .get(self.next)
                .or_else(|| self.draws.last())
                .copied()
                .unwrap_or(0);
            self.next = self.next.saturating_add(1);
            value
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            for chunk in dst.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }
    }

    /// Bits that the standard `f64` sampler maps back to `unit` (53-bit
    /// precision, high bits first).
    fn unit_to_bits(unit: f64) -> u64 {
        let mantissa = (unit * (1u64 << 53) as f64) as u64;
        mantissa << 11
    }

    fn side(members: &[(&str, Decimal)]) -> BattleSide {
        BattleSide::new(
            members
                .iter()
                .map(|(name, balance)| Combatant::new(AgentId::from(*name), *balance))
                .collect(),
        )
    }

    fn config(casualty_probability: f64) -> BattleConfig {
        BattleConfig {
            casualty_probability,
        }
    }

    // -----------------------------------------------------------------------
    // Winner selection
    // -----------------------------------------------------------------------

    #[test]
    fn zero_draw_gives_stronger_side_the_win() {
        let a = side(&[("agentA", dec!(10))]);
        let b = side(&[("agentB", dec!(0))]);

        let outcome =
            resolve_battle(&a, &b, &BattleConfig::default(), &mut ScriptedRng::constant(0.0))
                .unwrap();

        assert_eq!(outcome.winner, BattleWinner::SideA);
        assert_eq!(outcome.winning_side, a);
        assert_eq!(outcome.defeated_agents.len(), 1);
        assert_eq!(outcome.defeated_agents[0].combatant.agent_id, AgentId::from("agentB"));
        // 0.0 < 0.05, so the loser is killed.
        assert!(outcome.defeated_agents[0].killed_in_action);
    }

    #[test]
    fn zero_strength_side_never_wins() {
        let a = side(&[("agentA", dec!(10))]);
        let b = side(&[("agentB", dec!(0))]);

        let outcome =
            resolve_battle(&a, &b, &BattleConfig::default(), &mut ScriptedRng::constant(0.999_999))
                .unwrap();
        assert_eq!(outcome.winner, BattleWinner::SideA);

        let outcome =
            resolve_battle(&b, &a, &BattleConfig::default(), &mut ScriptedRng::constant(0.0))
                .unwrap();
        assert_eq!(outcome.winner, BattleWinner::SideB);
    }

    #[test]
    fn draw_above_win_probability_goes_to_side_b() {
        // P(A) = 10 / 40 = 0.25.
        let a = side(&[("agentA", dec!(10))]);
        let b = side(&[("agentB", dec!(20)), ("agentC", dec!(10))]);

        let outcome =
            resolve_battle(&a, &b, &config(0.0), &mut ScriptedRng::constant(0.3)).unwrap();
        assert_eq!(outcome.winner, BattleWinner::SideB);
        assert_eq!(outcome.winning_side, b);

        let outcome =
            resolve_battle(&a, &b, &config(0.0), &mut ScriptedRng::constant(0.2)).unwrap();
        assert_eq!(outcome.winner, BattleWinner::SideA);
        assert_eq!(outcome.defeated_agents.len(), 2);
    }

    // -----------------------------------------------------------------------
    // Casualties
    // -----------------------------------------------------------------------

    #[test]
    fn casualty_draws_follow_side_order() {
        let a = side(&[("agentA", dec!(1))]);
        let b = side(&[("agentB", dec!(0)), ("agentC", dec!(0)), ("agentD", dec!(0))]);

        // Win draw, then one draw per loser.
        let mut rng = ScriptedRng::new(&[0.5, 0.01, 0.5, 0.04]);
        let outcome = resolve_battle(&a, &b, &config(0.05), &mut rng).unwrap();

        let killed: Vec<_> = outcome.killed().map(AgentId::as_str).collect();
        assert_eq!(killed, vec!["agentB", "agentD"]);
    }

    #[test]
    fn zero_casualty_probability_kills_nobody() {
        let a = side(&[("agentA", dec!(5))]);
        let b = side(&[("agentB", dec!(5)), ("agentC", dec!(5))]);

        let outcome =
            resolve_battle(&a, &b, &config(0.0), &mut ScriptedRng::constant(0.0)).unwrap();
        assert_eq!(outcome.killed().count(), 0);
    }

    #[test]
    fn certain_casualty_probability_kills_every_loser() {
        let a = side(&[("agentA", dec!(5))]);
        let b = side(&[("agentB", dec!(5)), ("agentC", dec!(5))]);

        let outcome =
            resolve_battle(&a, &b, &config(1.0), &mut ScriptedRng::constant(0.999_999)).unwrap();
        assert_eq!(outcome.winner, BattleWinner::SideB);
        assert_eq!(outcome.killed().count(), 1);
        assert!(outcome.defeated_agents.iter().all(|d| d.killed_in_action));
    }

    // -----------------------------------------------------------------------
    // Seeded generators
    // -----------------------------------------------------------------------

    #[test]
    fn same_seed_gives_same_outcome() {
        let a = side(&[("agentA", dec!(3.5)), ("agentB", dec!(1.25))]);
        let b = side(&[("agentC", dec!(4)), ("agentD", dec!(0.75))]);
        let cfg = config(0.3);

        let first = resolve_battle(&a, &b, &cfg, &mut SmallRng::seed_from_u64(7)).unwrap();
        let second = resolve_battle(&a, &b, &cfg, &mut SmallRng::seed_from_u64(7)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn win_rate_tracks_strength_ratio() {
        let a = side(&[("agentA", dec!(10))]);
        let b = side(&[("agentB", dec!(30))]);
        let mut rng = SmallRng::seed_from_u64(42);

        let mut a_wins = 0_u32;
        for _ in 0..2000 {
            let outcome = resolve_battle(&a, &b, &config(0.0), &mut rng).unwrap();
            if outcome.winner == BattleWinner::SideA {
                a_wins += 1;
            }
        }

        // Expected 500 with a standard deviation of about 19.
        assert!((400..=600).contains(&a_wins), "side A won {a_wins} of 2000");
    }

    // -----------------------------------------------------------------------
    // Rejected input
    // -----------------------------------------------------------------------

    #[test]
    fn both_sides_empty_or_zero_is_degenerate() {
        let empty = BattleSide::default();
        assert_eq!(
            resolve_battle(&empty, &empty, &BattleConfig::default(), &mut ScriptedRng::constant(0.0)),
            Err(BattleError::DegenerateBattle)
        );

        let a = side(&[("agentA", dec!(0))]);
        let b = side(&[("agentB", dec!(0.00))]);
        assert_eq!(
            resolve_battle(&a, &b, &BattleConfig::default(), &mut ScriptedRng::constant(0.0)),
            Err(BattleError::DegenerateBattle)
        );
    }

    #[test]
    fn negative_balance_is_rejected() {
        let a = side(&[("agentA", dec!(10))]);
        let b = side(&[("agentB", dec!(-1))]);

        let err =
            resolve_battle(&a, &b, &BattleConfig::default(), &mut ScriptedRng::constant(0.0))
                .unwrap_err();
        assert!(matches!(err, BattleError::NegativeBalance { .. }));
    }

    #[test]
    fn agent_on_both_sides_is_rejected() {
        let a = side(&[("agentA", dec!(10)), ("agentB", dec!(1))]);
        let b = side(&[("agentB", dec!(1))]);

        let err =
            resolve_battle(&a, &b, &BattleConfig::default(), &mut ScriptedRng::constant(0.0))
                .unwrap_err();
        assert_eq!(
            err,
            BattleError::OverlappingSides {
                agent_id: AgentId::from("agentB"),
            }
        );
    }

    #[test]
    fn invalid_casualty_probability_is_rejected() {
        let a = side(&[("agentA", dec!(10))]);
        let b = side(&[("agentB", dec!(1))]);

        for bad in [1.5, -0.01, f64::NAN] {
            let err = resolve_battle(&a, &b, &config(bad), &mut ScriptedRng::constant(0.0))
                .unwrap_err();
            assert!(matches!(err, BattleError::InvalidCasualtyProbability { .. }));
        }
    }
}
