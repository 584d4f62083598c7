//! Stat catalog, scaling curves and the value pipeline

pub mod catalog;
pub mod scaling;
pub mod subtype;
pub mod value;

pub use catalog::{
    CatalogError, ScalingKind, SetDefinition, StatCatalog, StatDefinition, StatOverride, StatRange,
    TypeConfig, UniqueDefinition,
};
pub use scaling::{
    create_tier_scaling, item_stat_scale_factor, item_tier_scaling, MAX_ATTRIBUTE_STATS, MAX_TIER,
    MAX_RESISTANCE_STATS, PREFERRED_STAT_WEIGHT, STAGE_PERCENT, TIER_MULTIPLIER,
    TWO_HANDED_MULTIPLIER, UNIQUE_LIMIT_MULTIPLIER,
};
pub use subtype::{MultiplierRange, SubtypeConfig};
pub use value::{round_to, StatContext};
