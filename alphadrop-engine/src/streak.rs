//! Login-streak continuity, claim cooldown and the pity counter.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::loot::Rarity;
use crate::profile::RewardProfile;

/// Streak length is pinned to a 7-day cycle.
pub const STREAK_CAP: u8 = 7;

/// Hours between successful daily claims.
pub const CLAIM_COOLDOWN_HOURS: i64 = 24;

/// Base Alpha Points for streak days 1..=7. Day 7 pays 10x day 1 to reward
/// a full week.
pub const DAILY_POINTS_BY_STREAK: [u64; 7] = [10, 15, 20, 30, 40, 60, 100];

/// A missed-day gap of this many days or more breaks continuity.
const STREAK_BREAK_GAP_DAYS: i64 = 2;

/// What the integrity check did to a stale streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakAdjustment {
    /// A freeze token absorbed the gap; the streak is untouched.
    FreezeConsumed,
    /// No freeze available: the streak was halved, not zeroed.
    Softened { from: u8, to: u8 },
}

/// Base point grant for a streak day (1-based; out-of-range days clamp).
#[must_use]
pub fn daily_points_for_streak(streak_day: u8) -> u64 {
    let day = streak_day.clamp(1, STREAK_CAP);
    DAILY_POINTS_BY_STREAK[usize::from(day) - 1]
}

/// A daily claim is allowed when no claim was ever made, or the cooldown
/// fully elapsed.
#[must_use]
pub fn claim_eligible(profile: &RewardProfile, now: DateTime<Utc>) -> bool {
    match profile.last_claim_at {
        None => true,
        Some(last) => now - last >= Duration::hours(CLAIM_COOLDOWN_HOURS),
    }
}

/// Seconds until the next claim becomes available (0 when eligible).
/// Read-side computation only; nothing schedules this.
#[must_use]
pub fn cooldown_remaining_secs(profile: &RewardProfile, now: DateTime<Utc>) -> i64 {
    profile.last_claim_at.map_or(0, |last| {
        (last + Duration::hours(CLAIM_COOLDOWN_HOURS) - now)
            .num_seconds()
            .max(0)
    })
}

/// Enforce streak continuity against the anchor day. Runs as a precondition
/// of every mutating operation. A gap of two or more calendar days either
/// consumes a freeze token (streak saved, anchor snaps to today) or halves
/// the streak with floor division and clears the anchor. Halving instead of
/// zeroing is a deliberate leniency policy.
pub fn enforce_streak_integrity(
    profile: &mut RewardProfile,
    today: NaiveDate,
) -> Option<StreakAdjustment> {
    let anchor = profile.streak_anchor_day?;
    let gap_days = (today - anchor).num_days();
    if gap_days < STREAK_BREAK_GAP_DAYS {
        return None;
    }

    if profile.streak_freeze_count > 0 {
        profile.streak_freeze_count -= 1;
        profile.streak_anchor_day = Some(today);
        log::debug!("streak freeze consumed after {gap_days}-day gap");
        return Some(StreakAdjustment::FreezeConsumed);
    }

    let from = profile.streak_days;
    profile.streak_days = from / 2;
    profile.streak_anchor_day = None;
    log::debug!(
        "streak softened {from} -> {} after {gap_days}-day gap",
        profile.streak_days
    );
    Some(StreakAdjustment::Softened {
        from,
        to: profile.streak_days,
    })
}

/// Record a successful claim: advance the streak (pinned at the cap) and
/// stamp the claim time and anchor day.
pub fn record_claim(profile: &mut RewardProfile, now: DateTime<Utc>) {
    profile.streak_days = (profile.streak_days + 1).min(STREAK_CAP);
    profile.last_claim_at = Some(now);
    profile.streak_anchor_day = Some(now.date_naive());
}

/// Pity bookkeeping after a box outcome: a top-tier hit hard-resets the
/// counter, anything else increments it.
pub fn update_pity(profile: &mut RewardProfile, outcome_rarity: Rarity) {
    if outcome_rarity.is_top_tier() {
        profile.pity_counter = 0;
    } else {
        profile.pity_counter = profile.pity_counter.saturating_add(1);
    }
}
