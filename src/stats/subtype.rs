//! Subtype variants
//!
//! A subtype reshapes which stats an item type can roll: it can add
//! eligible stats, disable others (mandatory ones included), bias the
//! pick weight toward preferred stats, and stretch or shrink per-stat
//! roll ranges. A `SubtypeConfig` is resolved from the catalog once
//! per operation and threaded through as a parameter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::items::{ItemType, StatKey};

/// Multiplier window applied to a stat's roll range endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiplierRange {
    pub min: f64,
    pub max: f64,
}

/// Configuration of one (item type, subtype) variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtypeConfig {
    pub name: String,
    pub item_type: ItemType,
    /// Stats this subtype makes eligible beyond the type's pool.
    #[serde(default)]
    pub additional_stats: Vec<StatKey>,
    /// Stats this subtype removes, mandatory stats included.
    #[serde(default)]
    pub disabled_stats: Vec<StatKey>,
    /// Stats picked with extra weight during generation.
    #[serde(default)]
    pub preferred_stats: Vec<StatKey>,
    /// Per-stat roll-range multipliers.
    #[serde(default)]
    pub stat_multipliers: BTreeMap<StatKey, MultiplierRange>,
}

impl SubtypeConfig {
    pub fn disables(&self, stat: StatKey) -> bool {
        self.disabled_stats.contains(&stat)
    }

    pub fn prefers(&self, stat: StatKey) -> bool {
        self.preferred_stats.contains(&stat)
    }

    pub fn multiplier(&self, stat: StatKey) -> Option<MultiplierRange> {
        self.stat_multipliers.get(&stat).copied()
    }
}
