//! Stat catalog
//!
//! The read-only table every other part of the engine consults: each
//! stat's numeric envelope (tier-1 roll range, precision, cap/limit,
//! per-type overrides, tier-indexed cap curves), the per-type
//! mandatory/possible stat lists, the subtype registry, and the fixed
//! unique/set definitions. Built once via [`StatCatalog::builtin`] or
//! loaded from a RON file; never mutated afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::items::{ItemMeta, ItemType, StatKey, StatKind};
use crate::stats::scaling::{create_tier_scaling, MAX_TIER};
use crate::stats::subtype::{MultiplierRange, SubtypeConfig};

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatRange {
    pub min: f64,
    pub max: f64,
}

impl StatRange {
    pub fn new(min: f64, max: f64) -> Self {
        StatRange { min, max }
    }
}

/// Partial per-item-type override of a stat's envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatOverride {
    #[serde(default)]
    pub range: Option<StatRange>,
    #[serde(default)]
    pub limit: Option<f64>,
    #[serde(default)]
    pub cap: Option<f64>,
}

/// How a stat's value responds to the item's level and tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalingKind {
    /// Full tier-and-level growth (flat stats).
    #[default]
    Standard,
    /// Tier multiplier only; levels do nothing.
    TierOnly,
    /// No growth; the roll is the value (percent/chance stats, whose
    /// caps grow with tier instead).
    Fixed,
}

/// Everything the engine knows about one stat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatDefinition {
    pub key: StatKey,
    pub kind: StatKind,
    /// Decimal precision of the final value.
    pub decimal_places: u8,
    /// Roll envelope at tier 1.
    pub range: StatRange,
    /// Growth curve of the computed value.
    #[serde(default)]
    pub scaling: ScalingKind,
    /// Bound for flat stats. `f64::INFINITY` means uncapped.
    #[serde(default = "uncapped")]
    pub limit: f64,
    /// Bound for percent/chance stats (tier 1 when a curve exists).
    #[serde(default = "uncapped")]
    pub cap: f64,
    /// Optional tier-indexed cap curve; entry `tier-1` replaces `cap`.
    #[serde(default)]
    pub cap_by_tier: Option<[f64; MAX_TIER as usize]>,
    /// Per-item-type envelope overrides.
    #[serde(default)]
    pub overrides: BTreeMap<ItemType, StatOverride>,
}

fn uncapped() -> f64 {
    f64::INFINITY
}

impl StatDefinition {
    /// The cap in effect at `tier`, before type/subtype adjustments.
    pub fn cap_at_tier(&self, tier: u8) -> f64 {
        match &self.cap_by_tier {
            Some(curve) => {
                let idx = usize::from(tier.clamp(1, MAX_TIER)) - 1;
                curve[idx]
            }
            None => self.cap,
        }
    }

    pub fn override_for(&self, item_type: ItemType) -> Option<&StatOverride> {
        self.overrides.get(&item_type)
    }
}

/// Which stats an item type must and may roll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeConfig {
    /// Rolled on every item of the type unless subtype-disabled.
    #[serde(default)]
    pub mandatory: Vec<StatKey>,
    /// Pool the weighted fill draws from.
    #[serde(default)]
    pub possible: Vec<StatKey>,
}

/// A fixed unique item's own stat envelopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueDefinition {
    pub id: String,
    pub item_type: ItemType,
    pub stats: BTreeMap<StatKey, StatRange>,
}

/// A set definition: per-piece stat envelopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDefinition {
    pub id: String,
    pub pieces: BTreeMap<String, BTreeMap<StatKey, StatRange>>,
}

/// Catalog construction/validation failures.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("stat {stat:?} has an invalid roll range")]
    InvalidRange { stat: StatKey },
    #[error("stat {stat:?} has a negative or NaN bound")]
    InvalidBound { stat: StatKey },
    #[error("stat {stat:?} uses more than 3 decimal places")]
    TooManyDecimals { stat: StatKey },
    #[error("stat {stat:?} has a non-finite or non-positive cap curve entry")]
    InvalidCurve { stat: StatKey },
    #[error("{context} references unknown stat {stat:?}")]
    UnknownStat { context: String, stat: StatKey },
    #[error("subtype {name:?} has an invalid multiplier range for {stat:?}")]
    InvalidMultiplier { name: String, stat: StatKey },
}

/// The full static table. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCatalog {
    stats: BTreeMap<StatKey, StatDefinition>,
    types: BTreeMap<ItemType, TypeConfig>,
    #[serde(default)]
    subtypes: Vec<SubtypeConfig>,
    #[serde(default)]
    uniques: BTreeMap<String, UniqueDefinition>,
    #[serde(default)]
    sets: BTreeMap<String, SetDefinition>,
}

impl StatCatalog {
    pub fn stat(&self, key: StatKey) -> Option<&StatDefinition> {
        self.stats.get(&key)
    }

    pub fn type_config(&self, item_type: ItemType) -> Option<&TypeConfig> {
        self.types.get(&item_type)
    }

    /// Resolve a subtype by type and name. Unknown names resolve to
    /// `None` (the item behaves as if it had no subtype).
    pub fn subtype(&self, item_type: ItemType, name: &str) -> Option<&SubtypeConfig> {
        self.subtypes
            .iter()
            .find(|s| s.item_type == item_type && s.name == name)
    }

    pub fn unique(&self, id: &str) -> Option<&UniqueDefinition> {
        self.uniques.get(id)
    }

    /// Whether the metadata links the item to a catalog unique.
    pub fn is_unique_item(&self, meta: &ItemMeta) -> bool {
        meta.unique_id
            .as_deref()
            .map(|id| self.uniques.contains_key(id))
            .unwrap_or(false)
    }

    /// The unique/set-specific roll envelope for a stat, if the
    /// metadata links to one that defines it. Display lookups consult
    /// this before the generic per-type envelope.
    pub fn special_range(&self, meta: &ItemMeta, stat: StatKey) -> Option<&StatRange> {
        if let Some(def) = meta.unique_id.as_deref().and_then(|id| self.uniques.get(id)) {
            if let Some(range) = def.stats.get(&stat) {
                return Some(range);
            }
        }
        if let (Some(set_id), Some(piece_id)) = (meta.set_id.as_deref(), meta.set_piece_id.as_deref())
        {
            if let Some(set) = self.sets.get(set_id) {
                if let Some(range) = set.pieces.get(piece_id).and_then(|p| p.get(&stat)) {
                    return Some(range);
                }
            }
        }
        None
    }

    /// Register a subtype variant (builder-style, for assembly only).
    pub fn with_subtype(mut self, subtype: SubtypeConfig) -> Self {
        self.subtypes.push(subtype);
        self
    }

    pub fn with_unique(mut self, unique: UniqueDefinition) -> Self {
        self.uniques.insert(unique.id.clone(), unique);
        self
    }

    pub fn with_set(mut self, set: SetDefinition) -> Self {
        self.sets.insert(set.id.clone(), set);
        self
    }

    /// Check every envelope, bound, curve and cross-reference.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for def in self.stats.values() {
            validate_range(def.key, &def.range)?;
            validate_bound(def.key, def.limit)?;
            validate_bound(def.key, def.cap)?;
            if def.decimal_places > 3 {
                return Err(CatalogError::TooManyDecimals { stat: def.key });
            }
            if let Some(curve) = &def.cap_by_tier {
                if curve.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                    return Err(CatalogError::InvalidCurve { stat: def.key });
                }
            }
            for over in def.overrides.values() {
                if let Some(range) = &over.range {
                    validate_range(def.key, range)?;
                }
                for bound in [over.limit, over.cap].into_iter().flatten() {
                    validate_bound(def.key, bound)?;
                }
            }
        }

        for (item_type, config) in &self.types {
            let context = format!("type config for {}", item_type.name());
            for &stat in config.mandatory.iter().chain(&config.possible) {
                self.require_stat(&context, stat)?;
            }
        }

        for subtype in &self.subtypes {
            let context = format!("subtype {:?}", subtype.name);
            for &stat in subtype
                .additional_stats
                .iter()
                .chain(&subtype.disabled_stats)
                .chain(&subtype.preferred_stats)
            {
                self.require_stat(&context, stat)?;
            }
            for (&stat, mult) in &subtype.stat_multipliers {
                self.require_stat(&context, stat)?;
                if !mult.min.is_finite() || !mult.max.is_finite() || mult.min <= 0.0 || mult.min > mult.max
                {
                    return Err(CatalogError::InvalidMultiplier {
                        name: subtype.name.clone(),
                        stat,
                    });
                }
            }
        }

        for unique in self.uniques.values() {
            let context = format!("unique {:?}", unique.id);
            for (&stat, range) in &unique.stats {
                self.require_stat(&context, stat)?;
                validate_range(stat, range)?;
            }
        }
        for set in self.sets.values() {
            let context = format!("set {:?}", set.id);
            for pieces in set.pieces.values() {
                for (&stat, range) in pieces {
                    self.require_stat(&context, stat)?;
                    validate_range(stat, range)?;
                }
            }
        }

        Ok(())
    }

    fn require_stat(&self, context: &str, stat: StatKey) -> Result<(), CatalogError> {
        if self.stats.contains_key(&stat) {
            Ok(())
        } else {
            Err(CatalogError::UnknownStat {
                context: context.to_string(),
                stat,
            })
        }
    }
}

fn validate_range(stat: StatKey, range: &StatRange) -> Result<(), CatalogError> {
    if !range.min.is_finite() || !range.max.is_finite() || range.min <= 0.0 || range.min > range.max
    {
        return Err(CatalogError::InvalidRange { stat });
    }
    Ok(())
}

fn validate_bound(stat: StatKey, bound: f64) -> Result<(), CatalogError> {
    // Infinity is the intentional "no cap" sentinel; NaN and negatives
    // are data bugs.
    if bound.is_nan() || bound < 0.0 {
        return Err(CatalogError::InvalidBound { stat });
    }
    Ok(())
}

fn flat(key: StatKey, decimal_places: u8, min: f64, max: f64, limit: f64) -> StatDefinition {
    StatDefinition {
        key,
        kind: StatKind::Flat,
        decimal_places,
        range: StatRange::new(min, max),
        scaling: ScalingKind::Standard,
        limit,
        cap: f64::INFINITY,
        cap_by_tier: None,
        overrides: BTreeMap::new(),
    }
}

fn percent(key: StatKey, decimal_places: u8, min: f64, max: f64, cap: f64) -> StatDefinition {
    StatDefinition {
        key,
        kind: StatKind::Percent,
        decimal_places,
        range: StatRange::new(min, max),
        scaling: ScalingKind::Fixed,
        limit: f64::INFINITY,
        cap,
        cap_by_tier: None,
        overrides: BTreeMap::new(),
    }
}

fn chance(key: StatKey, decimal_places: u8, min: f64, max: f64, curve: [f64; 12]) -> StatDefinition {
    StatDefinition {
        key,
        kind: StatKind::Chance,
        decimal_places,
        range: StatRange::new(min, max),
        scaling: ScalingKind::Fixed,
        limit: f64::INFINITY,
        cap: curve[0],
        cap_by_tier: Some(curve),
        overrides: BTreeMap::new(),
    }
}

impl StatCatalog {
    /// The builtin catalog: the tuning data shipped with the engine.
    /// `validate()` on the result is pinned by a test.
    pub fn builtin() -> StatCatalog {
        use ItemType::*;
        use StatKey::*;

        let resist_caps = create_tier_scaling(40.0, 75.0, 1.2);

        let mut stats = BTreeMap::new();
        let defs = [
            flat(Damage, 0, 4.0, 12.0, 5000.0),
            flat(Armor, 0, 3.0, 10.0, 4000.0),
            flat(Health, 0, 10.0, 40.0, 100_000.0),
            flat(Mana, 0, 5.0, 25.0, 50_000.0),
            flat(HealthRegen, 1, 0.5, 3.0, 500.0),
            flat(ManaRegen, 1, 0.5, 2.5, 400.0),
            flat(Strength, 0, 1.0, 6.0, 1000.0),
            flat(Dexterity, 0, 1.0, 6.0, 1000.0),
            flat(Intelligence, 0, 1.0, 6.0, 1000.0),
            flat(Vitality, 0, 1.0, 6.0, 1000.0),
            flat(Wisdom, 0, 1.0, 6.0, 1000.0),
            {
                let mut def = percent(FireResist, 1, 2.0, 8.0, resist_caps[0]);
                def.cap_by_tier = Some(resist_caps);
                def
            },
            {
                let mut def = percent(IceResist, 1, 2.0, 8.0, resist_caps[0]);
                def.cap_by_tier = Some(resist_caps);
                def
            },
            {
                let mut def = percent(LightningResist, 1, 2.0, 8.0, resist_caps[0]);
                def.cap_by_tier = Some(resist_caps);
                def
            },
            {
                let mut def = percent(PoisonResist, 1, 2.0, 8.0, resist_caps[0]);
                def.cap_by_tier = Some(resist_caps);
                def
            },
            {
                let mut def = percent(ShadowResist, 1, 2.0, 8.0, resist_caps[0]);
                def.cap_by_tier = Some(resist_caps);
                def
            },
            percent(CritDamage, 0, 5.0, 20.0, 200.0),
            {
                let mut def = percent(AttackSpeed, 1, 2.0, 8.0, 30.0);
                def.cap_by_tier = Some(create_tier_scaling(30.0, 80.0, 1.0));
                def
            },
            percent(LifeSteal, 1, 1.0, 4.0, 25.0),
            percent(MagicFind, 0, 3.0, 12.0, 300.0),
            percent(ExperienceBonus, 0, 2.0, 10.0, 150.0),
            chance(CritChance, 1, 1.0, 5.0, create_tier_scaling(25.0, 60.0, 1.4)),
            chance(DodgeChance, 1, 1.0, 5.0, create_tier_scaling(20.0, 50.0, 1.3)),
            chance(BlockChance, 1, 2.0, 10.0, create_tier_scaling(30.0, 65.0, 1.1)),
        ];
        for def in defs {
            stats.insert(def.key, def);
        }

        // Per-type envelope adjustments.
        if let Some(def) = stats.get_mut(&Damage) {
            def.overrides.insert(
                Dagger,
                StatOverride {
                    range: Some(StatRange::new(3.0, 9.0)),
                    ..Default::default()
                },
            );
            def.overrides.insert(
                Greataxe,
                StatOverride {
                    range: Some(StatRange::new(6.0, 16.0)),
                    ..Default::default()
                },
            );
        }
        if let Some(def) = stats.get_mut(&Armor) {
            def.overrides.insert(
                Shield,
                StatOverride {
                    range: Some(StatRange::new(5.0, 14.0)),
                    limit: Some(6000.0),
                    ..Default::default()
                },
            );
        }
        if let Some(def) = stats.get_mut(&CritChance) {
            def.overrides.insert(
                Dagger,
                StatOverride {
                    cap: Some(75.0),
                    ..Default::default()
                },
            );
        }
        if let Some(def) = stats.get_mut(&Health) {
            def.overrides.insert(
                Chest,
                StatOverride {
                    range: Some(StatRange::new(15.0, 50.0)),
                    ..Default::default()
                },
            );
        }

        let mut types = BTreeMap::new();
        let type_table: [(ItemType, &[StatKey], &[StatKey]); 15] = [
            (
                Sword,
                &[Damage],
                &[
                    CritChance, CritDamage, AttackSpeed, LifeSteal, Strength, Dexterity, Vitality,
                    FireResist, IceResist, LightningResist,
                ],
            ),
            (
                Greatsword,
                &[Damage],
                &[
                    CritDamage, AttackSpeed, Strength, Vitality, Wisdom, Health, FireResist,
                    IceResist, PoisonResist,
                ],
            ),
            (
                Axe,
                &[Damage],
                &[
                    CritDamage, CritChance, Strength, Vitality, LifeSteal, Health, FireResist,
                    ShadowResist,
                ],
            ),
            (
                Greataxe,
                &[Damage],
                &[
                    CritDamage, Strength, Vitality, LifeSteal, Health, FireResist, IceResist,
                    ShadowResist,
                ],
            ),
            (
                Dagger,
                &[Damage],
                &[
                    CritChance, CritDamage, AttackSpeed, LifeSteal, Dexterity, Intelligence,
                    DodgeChance, PoisonResist, ShadowResist,
                ],
            ),
            (
                Mace,
                &[Damage],
                &[
                    Strength, Vitality, Health, Armor, BlockChance, FireResist, LightningResist,
                ],
            ),
            (
                Staff,
                &[Damage],
                &[
                    Intelligence, Wisdom, Mana, ManaRegen, CritChance, CritDamage, FireResist,
                    IceResist, LightningResist,
                ],
            ),
            (
                Bow,
                &[Damage],
                &[
                    CritChance, CritDamage, AttackSpeed, Dexterity, Wisdom, DodgeChance,
                    PoisonResist, LightningResist,
                ],
            ),
            (
                Shield,
                &[Armor],
                &[
                    BlockChance, Health, Vitality, Strength, FireResist, IceResist,
                    LightningResist, PoisonResist, ShadowResist,
                ],
            ),
            (
                Helmet,
                &[Armor],
                &[
                    Health, Mana, Wisdom, Intelligence, Vitality, FireResist, IceResist,
                    ShadowResist,
                ],
            ),
            (
                Chest,
                &[Armor],
                &[
                    Health, HealthRegen, Strength, Vitality, FireResist, IceResist,
                    LightningResist, PoisonResist,
                ],
            ),
            (
                Gloves,
                &[Armor],
                &[
                    AttackSpeed, CritChance, Strength, Dexterity, LifeSteal, FireResist,
                    PoisonResist,
                ],
            ),
            (
                Boots,
                &[Armor],
                &[
                    DodgeChance, Dexterity, Vitality, Health, IceResist, LightningResist,
                    ShadowResist,
                ],
            ),
            (
                Ring,
                &[],
                &[
                    CritChance, CritDamage, MagicFind, ExperienceBonus, Strength, Dexterity,
                    Intelligence, Vitality, Wisdom, LifeSteal,
                ],
            ),
            (
                Amulet,
                &[],
                &[
                    Health, Mana, MagicFind, ExperienceBonus, Wisdom, Intelligence, HealthRegen,
                    ManaRegen, FireResist, IceResist, LightningResist, PoisonResist, ShadowResist,
                ],
            ),
        ];
        for (item_type, mandatory, possible) in type_table {
            types.insert(
                item_type,
                TypeConfig {
                    mandatory: mandatory.to_vec(),
                    possible: possible.to_vec(),
                },
            );
        }

        let catalog = StatCatalog {
            stats,
            types,
            subtypes: Vec::new(),
            uniques: BTreeMap::new(),
            sets: BTreeMap::new(),
        };

        catalog
            .with_subtype(SubtypeConfig {
                name: "duelist".to_string(),
                item_type: Sword,
                additional_stats: vec![DodgeChance],
                disabled_stats: vec![],
                preferred_stats: vec![CritChance, AttackSpeed],
                stat_multipliers: BTreeMap::from([(
                    Damage,
                    MultiplierRange { min: 0.9, max: 1.1 },
                )]),
            })
            .with_subtype(SubtypeConfig {
                name: "flamebrand".to_string(),
                item_type: Sword,
                additional_stats: vec![MagicFind],
                disabled_stats: vec![],
                preferred_stats: vec![FireResist],
                stat_multipliers: BTreeMap::from([(
                    FireResist,
                    MultiplierRange { min: 1.1, max: 1.3 },
                )]),
            })
            .with_subtype(SubtypeConfig {
                name: "colossus".to_string(),
                item_type: Greatsword,
                additional_stats: vec![],
                disabled_stats: vec![CritDamage],
                preferred_stats: vec![Strength],
                stat_multipliers: BTreeMap::from([(
                    Damage,
                    MultiplierRange { min: 1.1, max: 1.3 },
                )]),
            })
            .with_subtype(SubtypeConfig {
                name: "venom".to_string(),
                item_type: Dagger,
                additional_stats: vec![MagicFind],
                disabled_stats: vec![CritDamage],
                preferred_stats: vec![LifeSteal, PoisonResist],
                stat_multipliers: BTreeMap::from([(
                    CritChance,
                    MultiplierRange {
                        min: 1.1,
                        max: 1.25,
                    },
                )]),
            })
            .with_subtype(SubtypeConfig {
                name: "bulwark".to_string(),
                item_type: Shield,
                additional_stats: vec![],
                disabled_stats: vec![],
                preferred_stats: vec![BlockChance],
                stat_multipliers: BTreeMap::from([
                    (Armor, MultiplierRange { min: 1.1, max: 1.3 }),
                    (BlockChance, MultiplierRange { min: 1.0, max: 1.2 }),
                ]),
            })
            .with_subtype(SubtypeConfig {
                // Trades the armor mandate away for mana sustain.
                name: "spellguard".to_string(),
                item_type: Shield,
                additional_stats: vec![Mana, ManaRegen],
                disabled_stats: vec![Armor],
                preferred_stats: vec![Mana],
                stat_multipliers: BTreeMap::new(),
            })
            .with_subtype(SubtypeConfig {
                name: "archon".to_string(),
                item_type: Staff,
                additional_stats: vec![ExperienceBonus],
                disabled_stats: vec![],
                preferred_stats: vec![Intelligence],
                stat_multipliers: BTreeMap::from([(Mana, MultiplierRange { min: 1.2, max: 1.5 })]),
            })
            .with_unique(UniqueDefinition {
                id: "embersoul_blade".to_string(),
                item_type: Sword,
                stats: BTreeMap::from([
                    (Damage, StatRange::new(8.0, 14.0)),
                    (FireResist, StatRange::new(6.0, 9.0)),
                ]),
            })
            .with_set(SetDefinition {
                id: "wardens_vigil".to_string(),
                pieces: BTreeMap::from([
                    (
                        "helm".to_string(),
                        BTreeMap::from([
                            (Armor, StatRange::new(6.0, 12.0)),
                            (Health, StatRange::new(20.0, 45.0)),
                        ]),
                    ),
                    (
                        "plate".to_string(),
                        BTreeMap::from([
                            (Armor, StatRange::new(8.0, 16.0)),
                            (Vitality, StatRange::new(2.0, 7.0)),
                        ]),
                    ),
                ]),
            })
    }
}
