//! Lootforge - Demo binary
//!
//! Rolls a spread of items across types and rarities with a seeded
//! RNG, relevels one of them, and prints everything as JSON.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use lootforge::items::{Item, ItemParams, ItemType, Rarity};

const DEMO_SEED: u64 = 0xF0_4765;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting lootforge demo v{}", env!("CARGO_PKG_VERSION"));

    let catalog = lootforge::data::load_or_builtin(std::path::Path::new("data/catalog.ron"));
    let mut rng = StdRng::seed_from_u64(DEMO_SEED);

    let drops = [
        (ItemType::Sword, Some("duelist"), 1, 1, Rarity::Normal),
        (ItemType::Dagger, Some("venom"), 8, 2, Rarity::Magic),
        (ItemType::Greatsword, Some("colossus"), 15, 3, Rarity::Rare),
        (ItemType::Shield, Some("spellguard"), 22, 4, Rarity::Epic),
        (ItemType::Staff, Some("archon"), 30, 5, Rarity::Legendary),
        (ItemType::Amulet, None, 30, 5, Rarity::Legendary),
    ];

    let mut items = Vec::with_capacity(drops.len());
    for (item_type, subtype, level, tier, rarity) in drops {
        let item = Item::roll(
            &catalog,
            ItemParams {
                item_type,
                subtype: subtype.map(str::to_string),
                level,
                tier,
                rarity,
            },
            &mut rng,
        );
        log::info!(
            "Rolled {} {} (lvl {}, T{}) with {} stats",
            rarity.name(),
            item_type.name(),
            level,
            tier,
            item.stats.len()
        );
        items.push(item);
    }

    println!("{}", serde_json::to_string_pretty(&items)?);

    // Relevel the legendary staff and show the before/after.
    let mut staff = items[4].clone();
    let before = staff.stats.clone();
    staff.apply_level(&catalog, 60);
    log::info!("Relevelled {} from 30 to 60", staff.item_type.name());
    println!("\n--- {} at level 60 ---", staff.item_type.name());
    for (stat, value) in &staff.stats {
        println!("{:>20}: {:>10.1}  (was {:.1})", stat.name(), value, before[stat]);
    }

    Ok(())
}
