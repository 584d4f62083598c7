//! Lootforge — procedural item stat generation and rescaling
//!
//! Items roll a constrained set of stats from a static catalog, scale
//! each value through tier/level/rarity multipliers under per-stat
//! caps, and persist the unscaled rolls so the same item can be
//! relevelled later without re-rolling.
//!
//! ```
//! use lootforge::items::{Item, ItemParams, ItemType, Rarity};
//! use lootforge::stats::StatCatalog;
//! use rand::SeedableRng;
//!
//! let catalog = StatCatalog::builtin();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let mut item = Item::roll(
//!     &catalog,
//!     ItemParams {
//!         item_type: ItemType::Sword,
//!         subtype: None,
//!         level: 1,
//!         tier: 1,
//!         rarity: Rarity::Rare,
//!     },
//!     &mut rng,
//! );
//! item.apply_level(&catalog, 40);
//! assert_eq!(item.level, 40);
//! ```

pub mod data;
pub mod items;
pub mod stats;

// Re-export commonly used types
pub use items::{Item, ItemMeta, ItemParams, ItemType, Rarity, StatKey, StatRoll};
pub use stats::{StatCatalog, StatContext, StatRange};
