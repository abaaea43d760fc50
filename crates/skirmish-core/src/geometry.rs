//! Geometry predicates for movement and proximity.
//!
//! The map is a disc of configurable radius centred on the origin. Steps
//! and interaction range use Chebyshev distance (a square neighbourhood),
//! while the map edge uses true Euclidean distance. All checks are exact
//! integer arithmetic so replays never disagree on a boundary case.

use skirmish_types::Position;

/// Largest per-axis displacement allowed in a single tick.
pub const MAX_STEP: u32 = 1;

/// Why a requested move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    /// The target lies outside the map disc.
    OutOfBounds,
    /// The target is more than one step away on some axis.
    TooFar,
}

impl core::fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfBounds => f.write_str("target outside map"),
            Self::TooFar => f.write_str("target more than one step away"),
        }
    }
}

/// Whether `point` is within `map_radius` of the origin (edge inclusive).
pub fn is_within_map_bounds(map_radius: u32, point: Position) -> bool {
    // |x|, |y| <= 2^31, so each square is <= 2^62 and the sum fits in u64.
    let dx = u64::from(point.x.unsigned_abs());
    let dy = u64::from(point.y.unsigned_abs());
    let radius = u64::from(map_radius);

    let distance_sq = dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy));
    distance_sq <= radius.saturating_mul(radius)
}

/// Maximum of the absolute per-axis differences.
pub fn chebyshev_distance(a: Position, b: Position) -> u32 {
    a.x.abs_diff(b.x).max(a.y.abs_diff(b.y))
}

/// Whether moving from `current` to `target` is a single 8-directional step.
/// Staying in place counts.
pub fn is_single_step_move(current: Position, target: Position) -> bool {
    chebyshev_distance(current, target) <= MAX_STEP
}

/// Whether two agents are close enough to interact.
pub fn is_within_interaction_range(a: Position, b: Position, range: u32) -> bool {
    chebyshev_distance(a, b) <= range
}

/// Check a requested move against both the map edge and the step limit.
pub fn check_move(map_radius: u32, current: Position, target: Position) -> Result<(), MoveRejection> {
    if !is_within_map_bounds(map_radius, target) {
        return Err(MoveRejection::OutOfBounds);
    }
    if !is_single_step_move(current, target) {
        return Err(MoveRejection::TooFar);
    }
    Ok(())
}
