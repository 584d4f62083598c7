//! Item model and the operations that mutate it

pub mod generator;
pub mod item;
pub mod rescale;

pub use generator::{add_random_stat, generate_stats};
pub use item::{
    Item, ItemMeta, ItemParams, ItemType, Rarity, SetBonusBlock, StatKey, StatKind, StatRoll,
};
pub use rescale::{apply_level_to_stats, base_stat_values};
