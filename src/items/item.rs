//! Item definitions
//!
//! The core item data model: stat keys, item types, rarities, and the
//! `Item` struct that round-trips losslessly through JSON. Everything
//! in `ItemMeta` is plain data — the save layer persists it verbatim.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::stats::{StatCatalog, StatContext, StatRange};

/// Every stat an item can roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatKey {
    // Flat combat/sustain stats
    Damage,
    Armor,
    Health,
    Mana,
    HealthRegen,
    ManaRegen,

    // Attributes (at most 3 per item)
    Strength,
    Dexterity,
    Intelligence,
    Vitality,
    Wisdom,

    // Resistances (percent, at most 3 per item)
    FireResist,
    IceResist,
    LightningResist,
    PoisonResist,
    ShadowResist,

    // Percent stats
    CritDamage,
    AttackSpeed,
    LifeSteal,
    MagicFind,
    ExperienceBonus,

    // Chance stats
    CritChance,
    DodgeChance,
    BlockChance,
}

impl StatKey {
    /// Resistance family membership (counted against the cap of 3).
    pub fn is_resistance(&self) -> bool {
        matches!(
            self,
            StatKey::FireResist
                | StatKey::IceResist
                | StatKey::LightningResist
                | StatKey::PoisonResist
                | StatKey::ShadowResist
        )
    }

    /// Attribute family membership (counted against the cap of 3).
    pub fn is_attribute(&self) -> bool {
        matches!(
            self,
            StatKey::Strength
                | StatKey::Dexterity
                | StatKey::Intelligence
                | StatKey::Vitality
                | StatKey::Wisdom
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            StatKey::Damage => "Damage",
            StatKey::Armor => "Armor",
            StatKey::Health => "Health",
            StatKey::Mana => "Mana",
            StatKey::HealthRegen => "Health Regen",
            StatKey::ManaRegen => "Mana Regen",
            StatKey::Strength => "Strength",
            StatKey::Dexterity => "Dexterity",
            StatKey::Intelligence => "Intelligence",
            StatKey::Vitality => "Vitality",
            StatKey::Wisdom => "Wisdom",
            StatKey::FireResist => "Fire Resist",
            StatKey::IceResist => "Ice Resist",
            StatKey::LightningResist => "Lightning Resist",
            StatKey::PoisonResist => "Poison Resist",
            StatKey::ShadowResist => "Shadow Resist",
            StatKey::CritDamage => "Crit Damage",
            StatKey::AttackSpeed => "Attack Speed",
            StatKey::LifeSteal => "Life Steal",
            StatKey::MagicFind => "Magic Find",
            StatKey::ExperienceBonus => "Experience Bonus",
            StatKey::CritChance => "Crit Chance",
            StatKey::DodgeChance => "Dodge Chance",
            StatKey::BlockChance => "Block Chance",
        }
    }
}

/// How a stat's final value is bounded and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatKind {
    /// Bounded by a legacy `limit`; scales with the item scale factor.
    Flat,
    /// Percentage, bounded by a `cap` (possibly tier-indexed).
    Percent,
    /// Proc chance, bounded like a percent stat.
    Chance,
}

impl StatKind {
    /// Percent and chance stats share the cap clamp path.
    pub fn uses_cap(&self) -> bool {
        matches!(self, StatKind::Percent | StatKind::Chance)
    }
}

/// Every item type the engine can generate stats for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Sword,
    Greatsword,
    Axe,
    Greataxe,
    Dagger,
    Mace,
    Staff,
    Bow,
    Shield,
    Helmet,
    Chest,
    Gloves,
    Boots,
    Ring,
    Amulet,
}

impl ItemType {
    /// Two-handed weapons double both the stat budget bound and the
    /// computed value.
    pub fn is_two_handed(&self) -> bool {
        matches!(
            self,
            ItemType::Greatsword | ItemType::Greataxe | ItemType::Staff | ItemType::Bow
        )
    }

    /// Value multiplier from handedness.
    pub fn handed_multiplier(&self) -> f64 {
        if self.is_two_handed() {
            crate::stats::TWO_HANDED_MULTIPLIER
        } else {
            1.0
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ItemType::Sword => "Sword",
            ItemType::Greatsword => "Greatsword",
            ItemType::Axe => "Axe",
            ItemType::Greataxe => "Greataxe",
            ItemType::Dagger => "Dagger",
            ItemType::Mace => "Mace",
            ItemType::Staff => "Staff",
            ItemType::Bow => "Bow",
            ItemType::Shield => "Shield",
            ItemType::Helmet => "Helmet",
            ItemType::Chest => "Chest",
            ItemType::Gloves => "Gloves",
            ItemType::Boots => "Boots",
            ItemType::Ring => "Ring",
            ItemType::Amulet => "Amulet",
        }
    }
}

/// Item rarity tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Normal,
    Magic,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Total stat slots an item of this rarity rolls (mandatory stats
    /// included). The generator may fall short if the eligible pool
    /// runs dry first.
    pub fn stat_budget(&self) -> usize {
        match self {
            Rarity::Normal => 1,
            Rarity::Magic => 2,
            Rarity::Rare => 3,
            Rarity::Epic => 4,
            Rarity::Legendary => 5,
        }
    }

    /// Global value multiplier applied to every stat roll.
    pub fn value_multiplier(&self) -> f64 {
        match self {
            Rarity::Normal => 1.0,
            Rarity::Magic => 1.05,
            Rarity::Rare => 1.1,
            Rarity::Epic => 1.2,
            Rarity::Legendary => 1.3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Normal => "Normal",
            Rarity::Magic => "Magic",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

/// The unscaled random draw behind a stat, persisted so relevelling
/// never re-rolls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatRoll {
    pub base_value: f64,
}

/// A set-bonus stat block carried by a set piece. Relevelled together
/// with the item, from its own stored rolls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetBonusBlock {
    pub stats: BTreeMap<StatKey, f64>,
    pub stat_rolls: BTreeMap<StatKey, StatRoll>,
}

/// Persisted item metadata. Plain, JSON-serializable data only — the
/// save layer stores and reloads it verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta {
    /// Unscaled base rolls, one per present stat.
    #[serde(default)]
    pub stat_rolls: BTreeMap<StatKey, StatRoll>,
    /// Link to a fixed unique-item definition, if any.
    #[serde(default)]
    pub unique_id: Option<String>,
    /// Link to a set definition, if any.
    #[serde(default)]
    pub set_id: Option<String>,
    /// Which piece of the set this item is.
    #[serde(default)]
    pub set_piece_id: Option<String>,
    /// Set-bonus stats attached to this piece.
    #[serde(default)]
    pub set_bonus: Option<SetBonusBlock>,
}

/// Identity parameters of an item, fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemParams {
    pub item_type: ItemType,
    /// Subtype name, resolved against the catalog's subtype registry.
    #[serde(default)]
    pub subtype: Option<String>,
    pub level: u32,
    pub tier: u8,
    pub rarity: Rarity,
}

/// A generated item: identity, current stat values, and the metadata
/// needed to recompute them at any level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_type: ItemType,
    #[serde(default)]
    pub subtype: Option<String>,
    pub level: u32,
    pub tier: u8,
    pub rarity: Rarity,
    pub stats: BTreeMap<StatKey, f64>,
    #[serde(default)]
    pub meta: ItemMeta,
}

impl Item {
    /// Generate a fresh item: pick stats per the catalog's rules for
    /// its type/subtype/rarity and roll their values.
    pub fn roll(catalog: &StatCatalog, params: ItemParams, rng: &mut impl rand::Rng) -> Item {
        let mut item = Item::from_parts(params, BTreeMap::new(), ItemMeta::default());
        crate::items::generator::generate_stats(&mut item, catalog, rng);
        item
    }

    /// Rebuild an item from already-rolled parts (the deserialization
    /// path); no generation happens.
    pub fn from_parts(params: ItemParams, stats: BTreeMap<StatKey, f64>, meta: ItemMeta) -> Item {
        Item {
            item_type: params.item_type,
            subtype: params.subtype,
            level: params.level,
            tier: params.tier,
            rarity: params.rarity,
            stats,
            meta,
        }
    }

    pub fn is_two_handed(&self) -> bool {
        self.item_type.is_two_handed()
    }

    /// Recompute every stat for `new_level` from the stored base
    /// rolls. No new randomness; idempotent per target level.
    pub fn apply_level(&mut self, catalog: &StatCatalog, new_level: u32) {
        crate::items::rescale::apply_level_to_stats(self, catalog, new_level);
    }

    /// Roll one additional stat (reroll flow). Returns the chosen key,
    /// or `None` when every candidate is blocked.
    pub fn add_random_stat(
        &mut self,
        catalog: &StatCatalog,
        rng: &mut impl rand::Rng,
        exclude: Option<StatKey>,
    ) -> Option<StatKey> {
        crate::items::generator::add_random_stat(self, catalog, rng, exclude)
    }

    /// Unscaled base rolls behind the current stats. See
    /// [`crate::items::rescale::base_stat_values`].
    pub fn base_stat_values(&self, catalog: &StatCatalog) -> BTreeMap<StatKey, f64> {
        crate::items::rescale::base_stat_values(self, catalog)
    }

    /// The displayed min/max a stat could have rolled on this item at
    /// its current level. Unique/set definitions override the generic
    /// catalog range. `None` for stats the catalog does not know.
    pub fn stat_min_max(&self, catalog: &StatCatalog, stat: StatKey) -> Option<StatRange> {
        let ctx = StatContext::new(catalog, self);
        let base = match catalog.special_range(&self.meta, stat) {
            Some(range) => *range,
            None => ctx.roll_range(stat)?,
        };
        let scale = ctx.scale_for(stat, self.level);
        Some(StatRange {
            min: ctx.calculate(stat, base.min, scale)?,
            max: ctx.calculate(stat, base.max, scale)?,
        })
    }

    /// Min/max ranges for every stat present on the item. Stats the
    /// catalog cannot resolve are skipped rather than erroring.
    pub fn all_stats_min_max(&self, catalog: &StatCatalog) -> BTreeMap<StatKey, StatRange> {
        self.stats
            .keys()
            .filter_map(|&stat| Some((stat, self.stat_min_max(catalog, stat)?)))
            .collect()
    }
}
