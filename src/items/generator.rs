//! Stat selection
//!
//! Fills a fresh item's stat slots: mandatory stats first, then a
//! weighted-random draw from the eligible pool, capped per stat
//! family. Runs once per item; rerolling a single stat goes through
//! [`add_random_stat`] instead.

use rand::Rng;

use crate::items::{Item, StatKey};
use crate::stats::{
    StatCatalog, StatContext, MAX_ATTRIBUTE_STATS, MAX_RESISTANCE_STATS, PREFERRED_STAT_WEIGHT,
};

/// Running count of family-capped stats on an item.
struct FamilyCounts {
    resistances: usize,
    attributes: usize,
}

impl FamilyCounts {
    fn of(item: &Item) -> FamilyCounts {
        FamilyCounts {
            resistances: item.stats.keys().filter(|s| s.is_resistance()).count(),
            attributes: item.stats.keys().filter(|s| s.is_attribute()).count(),
        }
    }

    fn allows(&self, stat: StatKey) -> bool {
        if stat.is_resistance() && self.resistances >= MAX_RESISTANCE_STATS {
            return false;
        }
        if stat.is_attribute() && self.attributes >= MAX_ATTRIBUTE_STATS {
            return false;
        }
        true
    }

    fn record(&mut self, stat: StatKey) {
        if stat.is_resistance() {
            self.resistances += 1;
        }
        if stat.is_attribute() {
            self.attributes += 1;
        }
    }
}

/// Roll a stat's base value and store both roll and computed value.
fn roll_stat(item: &mut Item, ctx: &StatContext<'_>, stat: StatKey, rng: &mut impl Rng) {
    if let Some(range) = ctx.roll_range(stat) {
        let base_value = if range.min < range.max {
            rng.gen_range(range.min..=range.max)
        } else {
            range.min
        };
        item.set_stat(ctx, stat, base_value, item.level);
        log::debug!(
            "rolled {:?} base {:.3} -> {:?}",
            stat,
            base_value,
            item.stats.get(&stat)
        );
    }
}

/// Populate a fresh item's stats per its type, subtype and rarity.
///
/// Never fails: if family caps or a small pool exhaust the eligible
/// candidates before the rarity's budget is met, the item simply ends
/// up with fewer stats.
pub fn generate_stats(item: &mut Item, catalog: &StatCatalog, rng: &mut impl Rng) {
    let ctx = StatContext::new(catalog, item);
    let Some(type_config) = catalog.type_config(item.item_type) else {
        log::warn!("no type config for {}; item gets no stats", item.item_type.name());
        return;
    };

    let total_needed = item.rarity.stat_budget();

    // Mandatory stats, unless the subtype turned them off.
    for &stat in &type_config.mandatory {
        if ctx.subtype().map(|s| s.disables(stat)).unwrap_or(false) {
            continue;
        }
        roll_stat(item, &ctx, stat, rng);
    }

    // Eligible pool: type pool plus subtype additions, minus anything
    // already present or disabled.
    let mut available: Vec<StatKey> = Vec::new();
    let additional = ctx.subtype().map(|s| s.additional_stats.as_slice()).unwrap_or(&[]);
    for &stat in type_config.possible.iter().chain(additional) {
        if item.stats.contains_key(&stat) || available.contains(&stat) {
            continue;
        }
        if ctx.subtype().map(|s| s.disables(stat)).unwrap_or(false) {
            continue;
        }
        available.push(stat);
    }

    let mut counts = FamilyCounts::of(item);
    while item.stats.len() < total_needed && !available.is_empty() {
        let eligible: Vec<StatKey> = available
            .iter()
            .copied()
            .filter(|&s| counts.allows(s))
            .collect();
        if eligible.is_empty() {
            log::debug!(
                "stat pool exhausted at {}/{} stats for {}",
                item.stats.len(),
                total_needed,
                item.item_type.name()
            );
            break;
        }

        let chosen = pick_weighted(&eligible, &ctx, rng);
        available.retain(|&s| s != chosen);
        roll_stat(item, &ctx, chosen, rng);
        counts.record(chosen);
    }
}

/// Weighted pick: preferred stats count `PREFERRED_STAT_WEIGHT` times.
fn pick_weighted(eligible: &[StatKey], ctx: &StatContext<'_>, rng: &mut impl Rng) -> StatKey {
    let weight = |stat: StatKey| -> u32 {
        if ctx.subtype().map(|s| s.prefers(stat)).unwrap_or(false) {
            PREFERRED_STAT_WEIGHT
        } else {
            1
        }
    };
    let total: u32 = eligible.iter().map(|&s| weight(s)).sum();
    let mut pick = rng.gen_range(0..total);
    for &stat in eligible {
        let w = weight(stat);
        if pick < w {
            return stat;
        }
        pick -= w;
    }
    // Weights always sum to at least eligible.len().
    eligible[eligible.len() - 1]
}

/// Roll one extra stat onto an existing item (the reroll flow).
///
/// The pool is the type's possible stats minus everything already
/// present minus `exclude`; family caps still apply; the pick is
/// uniform. Returns the chosen key, or `None` when nothing is
/// eligible.
pub fn add_random_stat(
    item: &mut Item,
    catalog: &StatCatalog,
    rng: &mut impl Rng,
    exclude: Option<StatKey>,
) -> Option<StatKey> {
    let ctx = StatContext::new(catalog, item);
    let type_config = catalog.type_config(item.item_type)?;

    let counts = FamilyCounts::of(item);
    let pool: Vec<StatKey> = type_config
        .possible
        .iter()
        .copied()
        .filter(|&s| !item.stats.contains_key(&s))
        .filter(|&s| Some(s) != exclude)
        .filter(|&s| counts.allows(s))
        .collect();
    if pool.is_empty() {
        return None;
    }

    let chosen = pool[rng.gen_range(0..pool.len())];
    roll_stat(item, &ctx, chosen, rng);
    Some(chosen)
}
