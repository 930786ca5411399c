//! The level curve.

/// XP per level-squared step of the curve.
const XP_PER_LEVEL_UNIT: i64 = 100;

/// Level reached with `xp_total` experience: `floor(sqrt(xp / 100)) + 1`.
///
/// Negative totals count as zero, so the minimum level is 1.
#[must_use]
pub fn level_for_xp(xp_total: i64) -> i64 {
    (xp_total.max(0) / XP_PER_LEVEL_UNIT).isqrt() + 1
}

/// Total XP at which `level + 1` is reached.
#[must_use]
pub fn xp_for_next_level(level: i64) -> i64 {
    level.max(1).pow(2) * XP_PER_LEVEL_UNIT
}
