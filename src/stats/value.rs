//! Stat value pipeline
//!
//! Turns an unscaled base roll into the final displayed number:
//! multiplier stacking, precision rounding, then a clamp against the
//! stat's resolved cap (percent/chance) or limit (flat). The same
//! pipeline runs at generation time and again on every relevel, so it
//! must stay pure — all state lives on the item.

use crate::items::{Item, ItemType, Rarity, StatKey, StatRoll};
use crate::stats::catalog::{ScalingKind, StatCatalog, StatRange};
use crate::stats::scaling::{item_stat_scale_factor, item_tier_scaling, UNIQUE_LIMIT_MULTIPLIER};
use crate::stats::subtype::SubtypeConfig;

/// Everything the pipeline needs about the item, resolved once from
/// the catalog instead of looked up per stat.
pub struct StatContext<'a> {
    catalog: &'a StatCatalog,
    item_type: ItemType,
    subtype: Option<&'a SubtypeConfig>,
    tier: u8,
    rarity: Rarity,
    is_unique: bool,
}

impl<'a> StatContext<'a> {
    pub fn new(catalog: &'a StatCatalog, item: &Item) -> StatContext<'a> {
        let subtype = item.subtype.as_deref().and_then(|name| {
            let resolved = catalog.subtype(item.item_type, name);
            if resolved.is_none() {
                log::debug!(
                    "unknown subtype {:?} for {}; treating as plain item",
                    name,
                    item.item_type.name()
                );
            }
            resolved
        });
        StatContext {
            catalog,
            item_type: item.item_type,
            subtype,
            tier: item.tier,
            rarity: item.rarity,
            is_unique: catalog.is_unique_item(&item.meta),
        }
    }

    pub fn subtype(&self) -> Option<&'a SubtypeConfig> {
        self.subtype
    }

    /// Scale factor for `stat` at the given level, following the
    /// stat's configured growth curve. Stats the catalog does not know
    /// fall back to the standard curve (their value computation will
    /// return `None` anyway).
    pub fn scale_for(&self, stat: StatKey, level: u32) -> f64 {
        let scaling = self
            .catalog
            .stat(stat)
            .map(|def| def.scaling)
            .unwrap_or_default();
        match scaling {
            ScalingKind::Standard => item_stat_scale_factor(level, self.tier),
            ScalingKind::TierOnly => item_tier_scaling(self.tier),
            ScalingKind::Fixed => 1.0,
        }
    }

    /// Product of every multiplier applied outside the scale factor.
    /// The reverse-derivation in the rescaler divides by this exact
    /// quantity, so keep the two in sync.
    pub fn fixed_multiplier(&self) -> f64 {
        self.rarity.value_multiplier() * self.item_type.handed_multiplier()
    }

    /// The subtype-adjusted envelope a fresh roll for `stat` is drawn
    /// from. `None` for stats the catalog does not define.
    pub fn roll_range(&self, stat: StatKey) -> Option<StatRange> {
        let def = self.catalog.stat(stat)?;
        let mut range = def
            .override_for(self.item_type)
            .and_then(|o| o.range)
            .unwrap_or(def.range);
        if let Some(mult) = self.subtype.and_then(|s| s.multiplier(stat)) {
            range.min *= mult.min;
            range.max *= mult.max;
        }
        Some(range)
    }

    /// The clamp bound for `stat` on this item: the base cap/limit,
    /// type-overridden, scaled by the subtype multiplier's `min`
    /// factor, doubled for two-handers, and relaxed for uniques.
    pub fn resolve_bound(&self, stat: StatKey) -> Option<f64> {
        let def = self.catalog.stat(stat)?;
        let over = def.override_for(self.item_type);
        let mut bound = if def.kind.uses_cap() {
            over.and_then(|o| o.cap).unwrap_or_else(|| def.cap_at_tier(self.tier))
        } else {
            over.and_then(|o| o.limit).unwrap_or(def.limit)
        };
        if !bound.is_finite() {
            // Intentional "no cap" sentinel; multiplying it is
            // pointless and NaN-prone for a zero factor.
            return Some(bound);
        }
        // Historical behavior: only the min factor of the subtype
        // multiplier stretches the bound. See DESIGN.md.
        if let Some(mult) = self.subtype.and_then(|s| s.multiplier(stat)) {
            bound *= mult.min;
        }
        bound *= self.item_type.handed_multiplier();
        if self.is_unique {
            bound *= UNIQUE_LIMIT_MULTIPLIER;
        }
        Some(bound)
    }

    /// Final value of `stat` for an unscaled `base_value` at `scale`.
    /// Pure; returns `None` for stats the catalog does not define.
    pub fn calculate(&self, stat: StatKey, base_value: f64, scale: f64) -> Option<f64> {
        let def = self.catalog.stat(stat)?;
        let value = base_value * self.fixed_multiplier() * scale;
        let value = round_to(value, def.decimal_places);
        let bound = self.resolve_bound(stat)?;
        Some(if bound.is_finite() { value.min(bound) } else { value })
    }
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimal_places: u8) -> f64 {
    let factor = 10f64.powi(i32::from(decimal_places));
    (value * factor).round() / factor
}

impl Item {
    /// Compute and store one stat from its base roll at `level`: the
    /// final value goes into `stats`, the roll into `meta.stat_rolls`
    /// (overwriting any prior roll for that stat).
    pub(crate) fn set_stat(
        &mut self,
        ctx: &StatContext<'_>,
        stat: StatKey,
        base_value: f64,
        level: u32,
    ) {
        let scale = ctx.scale_for(stat, level);
        if let Some(value) = ctx.calculate(stat, base_value, scale) {
            self.stats.insert(stat, value);
            self.meta.stat_rolls.insert(stat, StatRoll { base_value });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{ItemMeta, ItemParams};
    use std::collections::BTreeMap;

    fn plain_item(item_type: ItemType, tier: u8) -> Item {
        Item::from_parts(
            ItemParams {
                item_type,
                subtype: None,
                level: 1,
                tier,
                rarity: Rarity::Normal,
            },
            BTreeMap::new(),
            ItemMeta::default(),
        )
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(3.145, 1), 3.1);
        assert_eq!(round_to(7.5, 0), 8.0);
    }

    #[test]
    fn test_calculate_basic() {
        let catalog = StatCatalog::builtin();
        let item = plain_item(ItemType::Sword, 1);
        let ctx = StatContext::new(&catalog, &item);
        // Normal rarity, one-handed, scale 1: value is the rounded roll.
        assert_eq!(ctx.calculate(StatKey::Damage, 7.4, 1.0), Some(7.0));
    }

    #[test]
    fn test_two_handed_doubles_value_and_bound() {
        let catalog = StatCatalog::builtin();
        let one_hand = plain_item(ItemType::Sword, 1);
        let two_hand = plain_item(ItemType::Greatsword, 1);
        let ctx1 = StatContext::new(&catalog, &one_hand);
        let ctx2 = StatContext::new(&catalog, &two_hand);

        let v1 = ctx1.calculate(StatKey::Health, 20.0, 1.0).unwrap();
        let v2 = ctx2.calculate(StatKey::Health, 20.0, 1.0).unwrap();
        assert_eq!(v2, v1 * 2.0);

        let b1 = ctx1.resolve_bound(StatKey::Health).unwrap();
        let b2 = ctx2.resolve_bound(StatKey::Health).unwrap();
        assert_eq!(b2, b1 * 2.0);
    }

    #[test]
    fn test_clamp_to_limit() {
        let catalog = StatCatalog::builtin();
        let item = plain_item(ItemType::Sword, 1);
        let ctx = StatContext::new(&catalog, &item);
        // A huge scale pushes way past the flat limit.
        let value = ctx.calculate(StatKey::Damage, 12.0, 1e9).unwrap();
        assert_eq!(value, ctx.resolve_bound(StatKey::Damage).unwrap());
    }

    #[test]
    fn test_percent_cap_grows_with_tier() {
        let catalog = StatCatalog::builtin();
        let low = plain_item(ItemType::Sword, 1);
        let high = plain_item(ItemType::Sword, 12);
        let ctx_low = StatContext::new(&catalog, &low);
        let ctx_high = StatContext::new(&catalog, &high);
        assert!(
            ctx_high.resolve_bound(StatKey::CritChance).unwrap()
                > ctx_low.resolve_bound(StatKey::CritChance).unwrap()
        );
    }

    #[test]
    fn test_type_cap_override() {
        let catalog = StatCatalog::builtin();
        let dagger = plain_item(ItemType::Dagger, 1);
        let ctx = StatContext::new(&catalog, &dagger);
        // Daggers override the crit cap with a flat 75.
        assert_eq!(ctx.resolve_bound(StatKey::CritChance), Some(75.0));
    }

    #[test]
    fn test_subtype_min_factor_scales_bound() {
        let catalog = StatCatalog::builtin();
        let mut item = plain_item(ItemType::Shield, 1);
        let plain_bound = StatContext::new(&catalog, &item)
            .resolve_bound(StatKey::Armor)
            .unwrap();
        item.subtype = Some("bulwark".to_string());
        let subtype_bound = StatContext::new(&catalog, &item)
            .resolve_bound(StatKey::Armor)
            .unwrap();
        // bulwark's Armor multiplier is 1.1..1.3; only min applies.
        assert!((subtype_bound - plain_bound * 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_subtype_adjusts_roll_range() {
        let catalog = StatCatalog::builtin();
        let mut item = plain_item(ItemType::Shield, 1);
        item.subtype = Some("bulwark".to_string());
        let ctx = StatContext::new(&catalog, &item);
        let range = ctx.roll_range(StatKey::Armor).unwrap();
        // Shield override range 5..14, stretched by 1.1..1.3.
        assert!((range.min - 5.0 * 1.1).abs() < 1e-9);
        assert!((range.max - 14.0 * 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_unique_relaxes_bound() {
        let catalog = StatCatalog::builtin();
        let mut item = plain_item(ItemType::Sword, 1);
        let plain_bound = StatContext::new(&catalog, &item)
            .resolve_bound(StatKey::Damage)
            .unwrap();
        item.meta.unique_id = Some("embersoul_blade".to_string());
        let unique_bound = StatContext::new(&catalog, &item)
            .resolve_bound(StatKey::Damage)
            .unwrap();
        assert_eq!(unique_bound, plain_bound * UNIQUE_LIMIT_MULTIPLIER);

        // An id the catalog does not know leaves the bound alone.
        item.meta.unique_id = Some("not_in_catalog".to_string());
        let stranger = StatContext::new(&catalog, &item)
            .resolve_bound(StatKey::Damage)
            .unwrap();
        assert_eq!(stranger, plain_bound);
    }

    #[test]
    fn test_infinite_bound_passes_through() {
        let catalog = StatCatalog::builtin();
        let item = plain_item(ItemType::Sword, 1);
        let ctx = StatContext::new(&catalog, &item);
        // CritDamage has a finite cap; Damage a finite limit. Build the
        // uncapped case from a minimal catalog instead.
        let uncapped: StatCatalog = ron::from_str(
            r#"(
                stats: {
                    Damage: (
                        key: Damage,
                        kind: Flat,
                        decimal_places: 0,
                        range: (min: 4.0, max: 12.0),
                    ),
                },
                types: { Sword: (mandatory: [Damage], possible: []) },
            )"#,
        )
        .unwrap();
        let ctx_uncapped = StatContext::new(&uncapped, &item);
        assert_eq!(
            ctx_uncapped.resolve_bound(StatKey::Damage),
            Some(f64::INFINITY)
        );
        let value = ctx_uncapped.calculate(StatKey::Damage, 10.0, 1e9).unwrap();
        assert!(value.is_finite());
        assert!(value > ctx.resolve_bound(StatKey::Damage).unwrap());
    }

    #[test]
    fn test_unknown_stat_is_none() {
        let tiny: StatCatalog = ron::from_str(
            r#"(
                stats: {},
                types: {},
            )"#,
        )
        .unwrap();
        let item = plain_item(ItemType::Sword, 1);
        let ctx = StatContext::new(&tiny, &item);
        assert!(ctx.calculate(StatKey::Damage, 5.0, 1.0).is_none());
        assert!(ctx.roll_range(StatKey::Damage).is_none());
    }

    #[test]
    fn test_set_stat_records_roll() {
        let catalog = StatCatalog::builtin();
        let mut item = plain_item(ItemType::Sword, 1);
        let ctx = StatContext::new(&catalog, &item);
        item.set_stat(&ctx, StatKey::Damage, 9.3, 1);
        assert_eq!(item.stats.get(&StatKey::Damage), Some(&9.0));
        assert_eq!(
            item.meta.stat_rolls.get(&StatKey::Damage).unwrap().base_value,
            9.3
        );
        // Overwrites any prior roll.
        item.set_stat(&ctx, StatKey::Damage, 5.0, 1);
        assert_eq!(
            item.meta.stat_rolls.get(&StatKey::Damage).unwrap().base_value,
            5.0
        );
    }
}
