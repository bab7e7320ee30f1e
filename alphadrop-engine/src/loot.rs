//! Loot pools and the weighted outcome resolver.
//!
//! Weights are relative, hand-tuned values; they deliberately do not sum to
//! 100 and must never be re-normalized to round percentages. Pool ordering
//! is part of the resolution contract (ties resolve to the earliest entry
//! reaching the cumulative threshold), so entries are listed in a fixed,
//! documented order: collectible entries first, utility entries after.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::rng::LootRng;

/// Weight added to every collectible entry of the legendary pool per point
/// of pity.
pub const PITY_WEIGHT_BONUS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }

    /// The top tier resets the pity counter when hit.
    #[must_use]
    pub const fn is_top_tier(self) -> bool {
        matches!(self, Self::Legendary)
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Self::Common),
            "rare" => Ok(Self::Rare),
            "epic" => Ok(Self::Epic),
            "legendary" => Ok(Self::Legendary),
            _ => Err(()),
        }
    }
}

/// A resolved reward, one closed case per reward kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LootOutcome {
    /// Flat Alpha Point grant.
    Points { amount: u64 },
    /// 24h double-points boost; overwrites any running boost.
    Boost,
    /// One streak-saver token.
    StreakFreeze,
    /// Raffle ticket fragments; ten convert into a ticket eagerly.
    Fragments { count: u32 },
    /// A collectible drop of the given rarity.
    Collectible { rarity: Rarity },
}

/// Rarity tier reported on the reward event for an outcome.
#[must_use]
pub const fn outcome_rarity(outcome: LootOutcome) -> Rarity {
    match outcome {
        LootOutcome::Points { .. } | LootOutcome::Fragments { .. } => Rarity::Common,
        LootOutcome::Boost | LootOutcome::StreakFreeze => Rarity::Rare,
        LootOutcome::Collectible { rarity } => rarity,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LootEntry {
    pub outcome: LootOutcome,
    pub weight: u32,
}

const fn entry(outcome: LootOutcome, weight: u32) -> LootEntry {
    LootEntry { outcome, weight }
}

/// Bonus pool drawn alongside the streak-scaled base grant of a daily
/// claim. Collectible-dominant like the box pools, with a utility tail.
/// Carries no point entries; the base point grant is handled by the streak
/// controller, never by this pool.
pub const DAILY_BONUS_POOL: &[LootEntry] = &[
    entry(LootOutcome::Collectible { rarity: Rarity::Common }, 52),
    entry(LootOutcome::Collectible { rarity: Rarity::Rare }, 12),
    entry(LootOutcome::Fragments { count: 1 }, 18),
    entry(LootOutcome::Fragments { count: 2 }, 6),
    entry(LootOutcome::Boost, 7),
    entry(LootOutcome::StreakFreeze, 5),
];

pub const COMMON_BOX_POOL: &[LootEntry] = &[
    entry(LootOutcome::Collectible { rarity: Rarity::Common }, 70),
    entry(LootOutcome::Collectible { rarity: Rarity::Rare }, 12),
    entry(LootOutcome::Fragments { count: 1 }, 10),
    entry(LootOutcome::Points { amount: 30 }, 8),
    entry(LootOutcome::Boost, 3),
];

pub const RARE_BOX_POOL: &[LootEntry] = &[
    entry(LootOutcome::Collectible { rarity: Rarity::Common }, 30),
    entry(LootOutcome::Collectible { rarity: Rarity::Rare }, 45),
    entry(LootOutcome::Collectible { rarity: Rarity::Epic }, 10),
    entry(LootOutcome::Fragments { count: 2 }, 8),
    entry(LootOutcome::Points { amount: 80 }, 6),
    entry(LootOutcome::StreakFreeze, 4),
];

pub const EPIC_BOX_POOL: &[LootEntry] = &[
    entry(LootOutcome::Collectible { rarity: Rarity::Rare }, 40),
    entry(LootOutcome::Collectible { rarity: Rarity::Epic }, 35),
    entry(LootOutcome::Collectible { rarity: Rarity::Legendary }, 6),
    entry(LootOutcome::Fragments { count: 3 }, 8),
    entry(LootOutcome::Boost, 5),
    entry(LootOutcome::Points { amount: 200 }, 6),
];

pub const LEGENDARY_BOX_POOL: &[LootEntry] = &[
    entry(LootOutcome::Collectible { rarity: Rarity::Epic }, 45),
    entry(LootOutcome::Collectible { rarity: Rarity::Legendary }, 25),
    entry(LootOutcome::Fragments { count: 5 }, 10),
    entry(LootOutcome::StreakFreeze, 6),
    entry(LootOutcome::Points { amount: 500 }, 8),
];

/// Legendary pool with the pity bonus folded in: every collectible entry
/// gains `pity * PITY_WEIGHT_BONUS` weight, so the chance of the top tier
/// grows monotonically with consecutive non-top pulls.
#[must_use]
pub fn legendary_pool_with_pity(pity: u32) -> Vec<LootEntry> {
    LEGENDARY_BOX_POOL
        .iter()
        .map(|e| {
            let bonus = match e.outcome {
                LootOutcome::Collectible { .. } => pity.saturating_mul(PITY_WEIGHT_BONUS),
                _ => 0,
            };
            LootEntry {
                outcome: e.outcome,
                weight: e.weight.saturating_add(bonus),
            }
        })
        .collect()
}

/// Pick one entry by cumulative weight: draw `r` uniformly over the weight
/// sum and return the first entry whose running total reaches `r`. Returns
/// `None` for an empty pool or a zero weight sum.
pub fn pick_weighted<'a>(rng: &mut LootRng, entries: &'a [LootEntry]) -> Option<&'a LootEntry> {
    let total: f64 = entries.iter().map(|e| f64::from(e.weight)).sum();
    if total <= 0.0 {
        return None;
    }
    let roll = rng.next_unit() * total;
    let mut acc = 0.0_f64;
    for e in entries {
        acc += f64::from(e.weight);
        if acc >= roll {
            return Some(e);
        }
    }
    // Guards against accumulated float error on the final comparison.
    entries.last()
}

/// Draw an outcome from a pool. All pools shipped by this crate are
/// non-empty with positive weights; a degenerate pool falls back to a
/// zero-point grant rather than panicking.
pub fn draw(rng: &mut LootRng, entries: &[LootEntry]) -> LootOutcome {
    pick_weighted(rng, entries).map_or(LootOutcome::Points { amount: 0 }, |e| e.outcome)
}
