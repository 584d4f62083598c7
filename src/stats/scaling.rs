//! Scaling curves
//!
//! Pure numeric functions turning tier and level into multipliers.
//! Everything here is deterministic and stateless; the generator and
//! the rescaler both go through these so a relevel reproduces exactly
//! what generation computed.

/// Flat stat growth per tier, compounding.
pub const TIER_MULTIPLIER: f64 = 1.25;

/// Additional growth per level above 1 (10% of the tier-scaled value).
pub const STAGE_PERCENT: f64 = 0.1;

/// Highest tier an item can be.
pub const MAX_TIER: u8 = 12;

/// Pick weight of a subtype's preferred stat relative to a normal one.
pub const PREFERRED_STAT_WEIGHT: u32 = 3;

/// At most this many resistance-family stats on one item.
pub const MAX_RESISTANCE_STATS: usize = 3;

/// At most this many attribute-family stats on one item.
pub const MAX_ATTRIBUTE_STATS: usize = 3;

/// Two-handed weapons double both the rolled value and its bound.
pub const TWO_HANDED_MULTIPLIER: f64 = 2.0;

/// Bound relaxation for items matching a catalog unique definition.
pub const UNIQUE_LIMIT_MULTIPLIER: f64 = 1.5;

/// Tier multiplier: `TIER_MULTIPLIER^(tier-1)`.
///
/// Tier 1 is the baseline (factor 1.0); every tier above compounds.
pub fn item_tier_scaling(tier: u8) -> f64 {
    TIER_MULTIPLIER.powi(i32::from(tier) - 1)
}

/// Combined tier and level scale factor for an item's flat stats.
///
/// Level 1 contributes nothing beyond the tier factor; each level
/// above adds `STAGE_PERCENT` of the tier-scaled value.
pub fn item_stat_scale_factor(level: u32, tier: u8) -> f64 {
    let tier_factor = item_tier_scaling(tier);
    if level > 1 {
        tier_factor * (1.0 + (level - 1) as f64 * STAGE_PERCENT)
    } else {
        tier_factor
    }
}

/// Build a per-tier table interpolating from `start` (tier 1) to
/// `end` (tier 12) along `((t-1)/11)^power`.
///
/// Used where a percent stat's cap should grow with tier instead of
/// multiplying a flat scale into the value.
pub fn create_tier_scaling(start: f64, end: f64, power: f64) -> [f64; MAX_TIER as usize] {
    let mut table = [0.0; MAX_TIER as usize];
    let span = f64::from(MAX_TIER) - 1.0;
    for (i, entry) in table.iter_mut().enumerate() {
        let t = (i as f64 / span).powf(power);
        *entry = start + (end - start) * t;
    }
    table
}
