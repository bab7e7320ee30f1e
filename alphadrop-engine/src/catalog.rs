//! Box definitions and the fixed collectible catalog.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::loot::{self, LootEntry, Rarity};

/// The four purchasable box tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxTier {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl BoxTier {
    pub const ALL: [Self; 4] = [Self::Common, Self::Rare, Self::Epic, Self::Legendary];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }

    /// Price in Alpha Points.
    #[must_use]
    pub const fn cost(self) -> u64 {
        match self {
            Self::Common => 50,
            Self::Rare => 150,
            Self::Epic => 400,
            Self::Legendary => 1000,
        }
    }

    /// Static loot pool for this tier. The legendary tier's effective pool
    /// also depends on the pity counter; see
    /// [`loot::legendary_pool_with_pity`].
    #[must_use]
    pub const fn pool(self) -> &'static [LootEntry] {
        match self {
            Self::Common => loot::COMMON_BOX_POOL,
            Self::Rare => loot::RARE_BOX_POOL,
            Self::Epic => loot::EPIC_BOX_POOL,
            Self::Legendary => loot::LEGENDARY_BOX_POOL,
        }
    }
}

impl fmt::Display for BoxTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoxTier {
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

/// One entry of the fixed collectible catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectibleVariant {
    pub id: &'static str,
    pub name: &'static str,
    pub desc: &'static str,
    pub image: &'static str,
}

const fn variant(
    id: &'static str,
    name: &'static str,
    desc: &'static str,
    image: &'static str,
) -> CollectibleVariant {
    CollectibleVariant {
        id,
        name,
        desc,
        image,
    }
}

const COMMON_VARIANTS: &[CollectibleVariant] = &[
    variant("pixel-badge", "Pixel Badge", "A humble badge for showing up.", "collectibles/pixel_badge.svg"),
    variant("copper-coin", "Copper Coin", "Worth more in sentiment than in points.", "collectibles/copper_coin.svg"),
    variant("paper-chart", "Paper Chart", "A hand-drawn candle chart, slightly smudged.", "collectibles/paper_chart.svg"),
    variant("lucky-clover", "Lucky Clover", "Three leaves and an apology.", "collectibles/lucky_clover.svg"),
];

const RARE_VARIANTS: &[CollectibleVariant] = &[
    variant("silver-bull", "Silver Bull", "Charges at the slightest uptick.", "collectibles/silver_bull.svg"),
    variant("neon-key", "Neon Key", "Opens nothing, glows beautifully.", "collectibles/neon_key.svg"),
    variant("glass-rocket", "Glass Rocket", "Handle with care during launches.", "collectibles/glass_rocket.svg"),
];

const EPIC_VARIANTS: &[CollectibleVariant] = &[
    variant("obsidian-whale", "Obsidian Whale", "Moves markets when it turns.", "collectibles/obsidian_whale.svg"),
    variant("aurora-prism", "Aurora Prism", "Splits one green candle into seven.", "collectibles/aurora_prism.svg"),
    variant("midnight-ledger", "Midnight Ledger", "Every entry balances, somehow.", "collectibles/midnight_ledger.svg"),
];

const LEGENDARY_VARIANTS: &[CollectibleVariant] = &[
    variant("genesis-crown", "Genesis Crown", "Struck from the very first block.", "collectibles/genesis_crown.svg"),
    variant("alpha-dragon", "Alpha Dragon", "Hoards points instead of gold.", "collectibles/alpha_dragon.svg"),
];

/// Fixed catalog for a rarity tier.
#[must_use]
pub const fn variants_for(rarity: Rarity) -> &'static [CollectibleVariant] {
    match rarity {
        Rarity::Common => COMMON_VARIANTS,
        Rarity::Rare => RARE_VARIANTS,
        Rarity::Epic => EPIC_VARIANTS,
        Rarity::Legendary => LEGENDARY_VARIANTS,
    }
}

/// Choose a variant from the rarity's catalog using the caller's seeded
/// stream, keeping collectible identity reproducible.
pub fn pick_variant<R: Rng>(rng: &mut R, rarity: Rarity) -> &'static CollectibleVariant {
    let variants = variants_for(rarity);
    &variants[rng.gen_range(0..variants.len())]
}
