//! Persisted reward profile, event records and the load-time migration.
//!
//! The profile is a flat JSON document with camelCase keys. Every field is
//! serde-defaulted so partial records from older clients deserialize, and
//! unknown keys ride along in a flattened map instead of being rejected.
//! [`migrate_profile_value`] is the sole schema-evolution gate: it runs on
//! the raw JSON value before deserialization and is idempotent.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::loot::Rarity;

/// Season-point thresholds for reputation stars 2..=5.
const REPUTATION_THRESHOLDS: [u64; 4] = [250, 750, 1500, 3000];

/// Numeric profile fields repaired to zero when absent or malformed.
const NUMERIC_FIELDS: [&str; 6] = [
    "points",
    "streakDays",
    "ticketFragments",
    "streakFreezeCount",
    "pityCounter",
    "seasonPointsEarned",
];

/// Timestamp-ish optional fields; a malformed value is dropped, not kept.
const OPTIONAL_STRING_FIELDS: [&str; 3] = ["lastClaimAt", "streakAnchorDay", "activeBoostUntil"];

/// Where a reward event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardSource {
    Daily,
    Box,
}

impl RewardSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Box => "box",
        }
    }
}

impl fmt::Display for RewardSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of one granted reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardEvent {
    pub id: String,
    pub at: DateTime<Utc>,
    pub source: RewardSource,
    pub label: String,
    pub rarity: Rarity,
    /// Points actually credited, when the reward was a point grant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
    /// Fragment count granted, when the reward was fragments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragments: Option<u32>,
    /// Collectible reference, when the reward was a collectible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collectible_id: Option<String>,
}

/// A permanently owned collectible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectibleItem {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub rarity: Rarity,
    pub image: String,
    pub acquired_at: DateTime<Utc>,
    pub box_id: String,
}

/// The aggregate persisted record, one per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RewardProfile {
    pub points: u64,
    /// Consecutive daily claims, pinned to the 0..=7 weekly cycle.
    pub streak_days: u8,
    pub last_claim_at: Option<DateTime<Utc>>,
    pub streak_anchor_day: Option<NaiveDate>,
    pub boxes_opened: HashMap<String, u64>,
    /// Newest first, capped at [`crate::apply::HISTORY_CAP`].
    pub history: Vec<RewardEvent>,
    /// Append-only collection.
    pub collectibles: Vec<CollectibleItem>,
    /// Always `< 10` at rest; overflow converts into tickets eagerly.
    pub ticket_fragments: u32,
    pub active_boost_until: Option<DateTime<Utc>>,
    pub streak_freeze_count: u32,
    pub pity_counter: u32,
    pub season_id: String,
    pub season_points_earned: u64,
    /// Derived from season points; never mutated independently.
    pub reputation_stars: u8,
    /// Unknown fields from newer or older schema versions, preserved as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RewardProfile {
    /// Defaulted profile for a user seen for the first time.
    #[must_use]
    pub fn new(season_id: &str) -> Self {
        Self {
            season_id: season_id.to_string(),
            reputation_stars: 1,
            ..Self::default()
        }
    }

    /// Whether the double-points boost is running at `now`.
    #[must_use]
    pub fn boost_active(&self, now: DateTime<Utc>) -> bool {
        self.active_boost_until.is_some_and(|until| until > now)
    }

    /// Total boxes opened across all tiers.
    #[must_use]
    pub fn opened_total(&self) -> u64 {
        self.boxes_opened.values().sum()
    }

    /// Re-derive reputation stars from season points.
    pub fn recompute_reputation(&mut self) {
        self.reputation_stars = reputation_for(self.season_points_earned);
    }
}

/// Stars in 1..=5 for a season-point total.
#[must_use]
pub fn reputation_for(season_points: u64) -> u8 {
    let above = REPUTATION_THRESHOLDS
        .iter()
        .filter(|t| season_points >= **t)
        .count();
    1 + u8::try_from(above).unwrap_or(4)
}

fn repair_number(obj: &mut Map<String, Value>, key: &str) -> bool {
    if obj.get(key).is_some_and(Value::is_u64) {
        return false;
    }
    obj.insert(key.to_string(), Value::from(0u64));
    true
}

/// Normalize a raw persisted document in place. Applied on every load,
/// before any other component sees the record; running it twice is the same
/// as running it once. Returns whether anything had to be repaired.
pub fn migrate_profile_value(doc: &mut Value, current_season: &str) -> bool {
    let Some(obj) = doc.as_object_mut() else {
        return false;
    };
    let mut changed = false;

    // Legacy schema stored the balance under `alphaPoints`.
    if !obj.contains_key("points")
        && let Some(legacy) = obj.remove("alphaPoints")
    {
        obj.insert("points".to_string(), legacy);
        changed = true;
    }

    for key in NUMERIC_FIELDS {
        changed |= repair_number(obj, key);
    }

    if let Some(days) = obj.get("streakDays").and_then(Value::as_u64)
        && days > 7
    {
        obj.insert("streakDays".to_string(), Value::from(7u64));
        changed = true;
    }

    let stars_ok = obj
        .get("reputationStars")
        .and_then(Value::as_u64)
        .is_some_and(|s| (1..=5).contains(&s));
    if !stars_ok {
        obj.insert("reputationStars".to_string(), Value::from(1u64));
        changed = true;
    }

    if !obj.get("boxesOpened").is_some_and(Value::is_object) {
        obj.insert("boxesOpened".to_string(), Value::Object(Map::new()));
        changed = true;
    }
    for key in ["history", "collectibles"] {
        if !obj.get(key).is_some_and(Value::is_array) {
            obj.insert(key.to_string(), Value::Array(Vec::new()));
            changed = true;
        }
    }

    for key in OPTIONAL_STRING_FIELDS {
        if obj.get(key).is_some_and(|v| !v.is_string() && !v.is_null()) {
            obj.remove(key);
            changed = true;
        }
    }

    if !obj.get("seasonId").is_some_and(Value::is_string) {
        obj.insert(
            "seasonId".to_string(),
            Value::String(current_season.to_string()),
        );
        changed = true;
    }

    changed
}
