//! Level rescaling
//!
//! Recomputes an item's stats at a new level from the persisted base
//! rolls — no new randomness, so upgrading an item (or loading an old
//! save and normalizing its level) reproduces the same numbers every
//! time. Items from before rolls were persisted get their base values
//! reverse-derived from the displayed stat; that path is lossy because
//! the displayed value was rounded.

use std::collections::BTreeMap;

use crate::items::{Item, StatKey, StatRoll};
use crate::stats::{StatCatalog, StatContext};

/// The unscaled base roll behind each present stat.
///
/// Prefers `meta.stat_rolls`; reverse-derives for legacy items that
/// predate roll persistence. Reverse-derivation divides the displayed
/// value by the full multiplier stack and inherits its rounding error.
pub fn base_stat_values(item: &Item, catalog: &StatCatalog) -> BTreeMap<StatKey, f64> {
    let ctx = StatContext::new(catalog, item);
    item.stats
        .iter()
        .map(|(&stat, &value)| {
            let base = match item.meta.stat_rolls.get(&stat) {
                Some(roll) => roll.base_value,
                None => {
                    log::debug!("no stored roll for {:?}; reverse-deriving", stat);
                    value / (ctx.fixed_multiplier() * ctx.scale_for(stat, item.level))
                }
            };
            (stat, base)
        })
        .collect()
}

/// Recompute every stat (and any attached set-bonus block) for
/// `new_level`, then update the item's level. Idempotent: applying the
/// same target level twice changes nothing.
pub fn apply_level_to_stats(item: &mut Item, catalog: &StatCatalog, new_level: u32) {
    let bases = base_stat_values(item, catalog);
    let ctx = StatContext::new(catalog, item);
    let old_level = item.level;

    log::debug!(
        "relevel {} {} -> {}",
        item.item_type.name(),
        old_level,
        new_level
    );
    for (stat, base_value) in bases {
        item.set_stat(&ctx, stat, base_value, new_level);
    }

    if let Some(mut block) = item.meta.set_bonus.take() {
        let stats: Vec<(StatKey, f64)> = block.stats.iter().map(|(&s, &v)| (s, v)).collect();
        for (stat, value) in stats {
            let base = match block.stat_rolls.get(&stat) {
                Some(roll) => roll.base_value,
                None => value / (ctx.fixed_multiplier() * ctx.scale_for(stat, old_level)),
            };
            if let Some(recomputed) = ctx.calculate(stat, base, ctx.scale_for(stat, new_level)) {
                block.stats.insert(stat, recomputed);
                block.stat_rolls.insert(stat, StatRoll { base_value: base });
            }
        }
        item.meta.set_bonus = Some(block);
    }

    item.level = new_level;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{ItemParams, ItemType, Rarity, SetBonusBlock};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rolled(item_type: ItemType, rarity: Rarity, tier: u8, seed: u64) -> (StatCatalog, Item) {
        let catalog = StatCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(seed);
        let item = Item::roll(
            &catalog,
            ItemParams {
                item_type,
                subtype: None,
                level: 1,
                tier,
                rarity,
            },
            &mut rng,
        );
        (catalog, item)
    }

    #[test]
    fn test_base_values_round_trip() {
        let (catalog, item) = rolled(ItemType::Chest, Rarity::Epic, 2, 41);
        let bases = item.base_stat_values(&catalog);
        for (stat, base) in &bases {
            let stored = item.meta.stat_rolls[stat].base_value;
            assert_eq!(*base, stored);
        }
    }

    #[test]
    fn test_apply_level_is_idempotent() {
        let (catalog, mut item) = rolled(ItemType::Sword, Rarity::Rare, 3, 43);
        item.apply_level(&catalog, 50);
        let first = item.clone();
        item.apply_level(&catalog, 50);
        assert_eq!(item, first);
    }

    #[test]
    fn test_relevel_down_restores_originals() {
        let (catalog, mut item) = rolled(ItemType::Helmet, Rarity::Epic, 2, 47);
        let original = item.stats.clone();
        item.apply_level(&catalog, 50);
        assert_ne!(item.stats, original);
        item.apply_level(&catalog, 1);
        for (stat, value) in &original {
            let back = item.stats[stat];
            assert!(
                (back - value).abs() < 1e-9,
                "{:?}: {} vs {}",
                stat,
                back,
                value
            );
        }
    }

    #[test]
    fn test_flat_stat_monotonic_in_level_until_cap() {
        let (catalog, mut item) = rolled(ItemType::Sword, Rarity::Normal, 1, 53);
        let mut prev = item.stats[&StatKey::Damage];
        let mut plateaued = false;
        for level in 2..13_000 {
            item.apply_level(&catalog, level);
            let next = item.stats[&StatKey::Damage];
            if plateaued {
                assert_eq!(next, prev, "value must stay at the limit once hit");
            } else {
                assert!(next >= prev, "flat stat dropped while levelling up");
                if next == prev {
                    // Rounding can hold a value flat for one step
                    // without the limit being the cause; only treat an
                    // exact limit hit as the plateau.
                    let ctx = StatContext::new(&catalog, &item);
                    if next == ctx.resolve_bound(StatKey::Damage).unwrap() {
                        plateaued = true;
                    }
                }
            }
            prev = next;
        }
        assert!(plateaued, "limit never reached at extreme levels");
    }

    #[test]
    fn test_flat_stat_monotonic_in_tier() {
        // Same base roll across tiers: the computed value never drops.
        let catalog = StatCatalog::builtin();
        let mut prev = 0.0;
        for tier in 1..=12u8 {
            let mut item = Item::from_parts(
                ItemParams {
                    item_type: ItemType::Sword,
                    subtype: None,
                    level: 10,
                    tier,
                    rarity: Rarity::Normal,
                },
                Default::default(),
                Default::default(),
            );
            let ctx = StatContext::new(&catalog, &item);
            let level = item.level;
            item.set_stat(&ctx, StatKey::Damage, 8.0, level);
            let value = item.stats[&StatKey::Damage];
            assert!(value >= prev);
            prev = value;
        }
    }

    #[test]
    fn test_legacy_item_reverse_derivation() {
        let (catalog, mut item) = rolled(ItemType::Sword, Rarity::Rare, 2, 59);
        let reference = item.clone();
        // Simulate a pre-roll-persistence save.
        item.meta.stat_rolls.clear();
        let bases = item.base_stat_values(&catalog);
        for (stat, base) in &bases {
            let stored = reference.meta.stat_rolls[stat].base_value;
            // Lossy: rounding of the displayed value bleeds into the
            // derived base. Tolerance spans one rounding step scaled
            // back down.
            assert!(
                (base - stored).abs() < 0.5,
                "{:?}: derived {} vs stored {}",
                stat,
                base,
                stored
            );
        }
        // Relevelling a legacy item still works and re-persists rolls.
        item.apply_level(&catalog, 20);
        assert_eq!(item.meta.stat_rolls.len(), item.stats.len());
    }

    #[test]
    fn test_set_bonus_block_relevels() {
        let (catalog, mut item) = rolled(ItemType::Helmet, Rarity::Rare, 1, 61);
        item.meta.set_id = Some("wardens_vigil".to_string());
        item.meta.set_piece_id = Some("helm".to_string());
        let mut block = SetBonusBlock::default();
        block.stat_rolls.insert(StatKey::Health, StatRoll { base_value: 30.0 });
        {
            let ctx = StatContext::new(&catalog, &item);
            let value = ctx
                .calculate(StatKey::Health, 30.0, ctx.scale_for(StatKey::Health, item.level))
                .unwrap();
            block.stats.insert(StatKey::Health, value);
        }
        item.meta.set_bonus = Some(block);

        item.apply_level(&catalog, 25);
        let block = item.meta.set_bonus.as_ref().unwrap();
        let ctx = StatContext::new(&catalog, &item);
        let expected = ctx
            .calculate(StatKey::Health, 30.0, ctx.scale_for(StatKey::Health, 25))
            .unwrap();
        assert_eq!(block.stats[&StatKey::Health], expected);
        // The block's roll survives unchanged.
        assert_eq!(block.stat_rolls[&StatKey::Health].base_value, 30.0);
    }
}
