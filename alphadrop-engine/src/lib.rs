//! Alphadrop Reward Engine
//!
//! Deterministic, gamified reward distribution: daily claims with a 7-day
//! login streak, weighted loot boxes with a pity ramp, ticket-fragment
//! aggregation and month-scoped seasons. All randomness derives from string
//! seed keys, so every reward is reproducible from (user, day, action) and
//! auditable after the fact.
//!
//! The crate is transport-agnostic: a façade (HTTP handler, RPC method, UI
//! binding) plugs a [`ProfileStore`] implementation into [`RewardEngine`]
//! and presents the returned events however it likes.

pub mod apply;
pub mod catalog;
pub mod engine;
pub mod loot;
pub mod profile;
pub mod rng;
pub mod season;
pub mod store;
pub mod streak;

// Re-export commonly used types
pub use apply::{
    ApplyContext, BOOST_HOURS, EventBurst, FRAGMENTS_PER_TICKET, HISTORY_CAP, apply_outcome,
    grant_points,
};
pub use catalog::{BoxTier, CollectibleVariant, pick_variant, variants_for};
pub use engine::{BoxOpening, DailyClaim, RewardEngine, RewardError, RewardSummary};
pub use loot::{
    DAILY_BONUS_POOL, LootEntry, LootOutcome, PITY_WEIGHT_BONUS, Rarity, legendary_pool_with_pity,
    outcome_rarity, pick_weighted,
};
pub use profile::{
    CollectibleItem, RewardEvent, RewardProfile, RewardSource, migrate_profile_value,
    reputation_for,
};
pub use rng::{LootRng, box_seed_key, daily_seed_key, mix_seed};
pub use season::{day_key, roll_season, season_key};
pub use store::{MemoryProfileStore, ProfileStore, StoreError, VersionedProfile};
pub use streak::{
    DAILY_POINTS_BY_STREAK, STREAK_CAP, StreakAdjustment, claim_eligible, cooldown_remaining_secs,
    daily_points_for_streak, enforce_streak_integrity, record_claim, update_pity,
};
