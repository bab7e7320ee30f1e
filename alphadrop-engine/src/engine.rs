//! Public reward operations: daily claim, box open, summary.
//!
//! Each mutating operation is one serializable transaction over a single
//! user's profile: load at a version, run the season and streak
//! preconditions, validate, draw from the seeded stream, apply, commit with
//! compare-and-swap. Validation failures return before any draw or
//! mutation, so either the whole transaction commits or none of it does.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::apply::{ApplyContext, apply_outcome};
use crate::catalog::BoxTier;
use crate::loot::{self, LootOutcome, outcome_rarity};
use crate::profile::{RewardEvent, RewardSource};
use crate::rng::{LootRng, box_seed_key, daily_seed_key};
use crate::season::{day_key, roll_season, season_key};
use crate::store::{ProfileStore, StoreError};
use crate::streak::{
    StreakAdjustment, claim_eligible, cooldown_remaining_secs, daily_points_for_streak,
    enforce_streak_integrity, record_claim, update_pity,
};

/// Errors surfaced by the public operations. All variants are recoverable
/// and leave the stored profile untouched.
#[derive(Debug, Error)]
pub enum RewardError {
    #[error("daily claim on cooldown ({remaining_secs}s remaining)")]
    OnCooldown { remaining_secs: i64 },
    #[error("insufficient points: need {required}, have {available}")]
    InsufficientPoints { required: u64, available: u64 },
    #[error("unknown box id {id:?}")]
    InvalidBox { id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a successful daily claim.
#[derive(Debug, Clone)]
pub struct DailyClaim {
    pub granted_points: u64,
    pub new_streak_day: u8,
    /// The point-grant event for the claim itself.
    pub reward_event: RewardEvent,
    /// Bonus-pool draw plus any ticket unlocks it triggered.
    pub bonus_events: Vec<RewardEvent>,
    /// What the integrity check did to a stale streak, if anything.
    pub streak_adjustment: Option<StreakAdjustment>,
}

/// Result of a successful box opening.
#[derive(Debug, Clone)]
pub struct BoxOpening {
    pub cost: u64,
    pub reward_event: RewardEvent,
    /// Ticket unlocks triggered by a fragment reward.
    pub extra_events: Vec<RewardEvent>,
    pub updated_collectible_count: usize,
}

/// Read-only view of the reward state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardSummary {
    pub points: u64,
    pub streak_days: u8,
    pub cooldown_secs_remaining: i64,
    pub fragments: u32,
    pub boost_active: bool,
    pub opened_total: u64,
}

/// The reward engine: one record per user behind a transactional store.
pub struct RewardEngine<S: ProfileStore> {
    store: S,
}

impl<S: ProfileStore> RewardEngine<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Claim the daily reward: streak-scaled base points plus one draw from
    /// the daily bonus pool.
    ///
    /// # Errors
    ///
    /// [`RewardError::OnCooldown`] before 24h have elapsed since the last
    /// claim; store errors on backend failure or write conflict.
    pub fn claim_daily(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<DailyClaim, RewardError> {
        let today = now.date_naive();
        let season = season_key(today);
        let loaded = self.store.load(user_id, &season)?;
        let mut profile = loaded.profile;

        roll_season(&mut profile, today);
        let streak_adjustment = enforce_streak_integrity(&mut profile, today);

        if !claim_eligible(&profile, now) {
            return Err(RewardError::OnCooldown {
                remaining_secs: cooldown_remaining_secs(&profile, now),
            });
        }

        record_claim(&mut profile, now);
        let base = daily_points_for_streak(profile.streak_days);

        let seed_key = daily_seed_key(&day_key(today), user_id);
        let mut rng = LootRng::from_key(&seed_key);
        let mut ctx = ApplyContext::new(now, RewardSource::Daily, None, &seed_key, &mut rng);

        let claim_events =
            apply_outcome(&mut profile, LootOutcome::Points { amount: base }, &mut ctx);
        let reward_event = claim_events[0].clone();
        let granted_points = reward_event.points.unwrap_or(base);

        let bonus = loot::draw(&mut *ctx.rng, loot::DAILY_BONUS_POOL);
        let bonus_events = apply_outcome(&mut profile, bonus, &mut ctx).into_vec();

        let new_streak_day = profile.streak_days;
        self.store.commit(user_id, &profile, loaded.version)?;
        log::debug!(
            "daily claim for {user_id}: +{granted_points} AP, streak day {new_streak_day}"
        );

        Ok(DailyClaim {
            granted_points,
            new_streak_day,
            reward_event,
            bonus_events,
            streak_adjustment,
        })
    }

    /// Open a loot box, spending points and drawing one outcome from the
    /// tier's pool (pity-adjusted for the legendary tier).
    ///
    /// # Errors
    ///
    /// [`RewardError::InvalidBox`] for an unknown id,
    /// [`RewardError::InsufficientPoints`] when the balance cannot cover the
    /// cost; store errors on backend failure or write conflict.
    pub fn open_box(
        &self,
        user_id: &str,
        box_id: &str,
        now: DateTime<Utc>,
    ) -> Result<BoxOpening, RewardError> {
        let tier: BoxTier = box_id.parse().map_err(|()| RewardError::InvalidBox {
            id: box_id.to_string(),
        })?;
        let today = now.date_naive();
        let season = season_key(today);
        let loaded = self.store.load(user_id, &season)?;
        let mut profile = loaded.profile;

        roll_season(&mut profile, today);
        enforce_streak_integrity(&mut profile, today);

        let cost = tier.cost();
        if profile.points < cost {
            return Err(RewardError::InsufficientPoints {
                required: cost,
                available: profile.points,
            });
        }
        profile.points -= cost;

        let open_count = profile.boxes_opened.get(tier.as_str()).copied().unwrap_or(0);
        let seed_key = box_seed_key(tier.as_str(), &day_key(today), user_id, open_count);
        let mut rng = LootRng::from_key(&seed_key);

        let outcome = match tier {
            BoxTier::Legendary => {
                let pool = loot::legendary_pool_with_pity(profile.pity_counter);
                loot::draw(&mut rng, &pool)
            }
            _ => loot::draw(&mut rng, tier.pool()),
        };

        let mut ctx = ApplyContext::new(
            now,
            RewardSource::Box,
            Some(tier.as_str()),
            &seed_key,
            &mut rng,
        );
        let mut events = apply_outcome(&mut profile, outcome, &mut ctx).into_vec();
        let reward_event = events.remove(0);

        update_pity(&mut profile, outcome_rarity(outcome));
        *profile
            .boxes_opened
            .entry(tier.as_str().to_string())
            .or_insert(0) += 1;

        let updated_collectible_count = profile.collectibles.len();
        self.store.commit(user_id, &profile, loaded.version)?;
        log::debug!(
            "box open for {user_id}: {tier} #{open_count} -> {}",
            reward_event.label
        );

        Ok(BoxOpening {
            cost,
            reward_event,
            extra_events: events,
            updated_collectible_count,
        })
    }

    /// Side-effect-free snapshot of the user's reward state.
    ///
    /// # Errors
    ///
    /// Store errors on backend failure only.
    pub fn summary(&self, user_id: &str, now: DateTime<Utc>) -> Result<RewardSummary, RewardError> {
        let season = season_key(now.date_naive());
        let loaded = self.store.load(user_id, &season)?;
        let profile = loaded.profile;
        Ok(RewardSummary {
            points: profile.points,
            streak_days: profile.streak_days,
            cooldown_secs_remaining: cooldown_remaining_secs(&profile, now),
            fragments: profile.ticket_fragments,
            boost_active: profile.boost_active(now),
            opened_total: profile.opened_total(),
        })
    }

    /// [`Self::claim_daily`] at the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Same as [`Self::claim_daily`].
    pub fn claim_daily_now(&self, user_id: &str) -> Result<DailyClaim, RewardError> {
        self.claim_daily(user_id, Utc::now())
    }

    /// [`Self::open_box`] at the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Same as [`Self::open_box`].
    pub fn open_box_now(&self, user_id: &str, box_id: &str) -> Result<BoxOpening, RewardError> {
        self.open_box(user_id, box_id, Utc::now())
    }

    /// [`Self::summary`] at the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Same as [`Self::summary`].
    pub fn summary_now(&self, user_id: &str) -> Result<RewardSummary, RewardError> {
        self.summary(user_id, Utc::now())
    }
}
